// stagecoach_service/src/web/handlers/metrics_handlers.rs

use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::state::AppState;

pub async fn metrics_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let body = app_state.metrics.render()?;
  Ok(
    HttpResponse::Ok()
      .content_type(app_state.metrics.content_type())
      .body(body),
  )
}
