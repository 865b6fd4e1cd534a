// stagecoach_service/src/web/routes.rs

use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(health_check_handler))
    .route(
      "/metrics",
      web::get().to(crate::web::handlers::metrics_handlers::metrics_handler),
    )
    .service(web::scope("/webhooks").route(
      "/github",
      web::post().to(crate::web::handlers::webhook_handlers::github_webhook_handler),
    ));
}
