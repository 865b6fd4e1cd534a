// stagecoach_service/src/web/handlers/webhook_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::github::event::EVENT_HEADER;
use crate::github::signature::{self, SIGNATURE_HEADER};
use crate::github::PullRequestEvent;
use crate::state::AppState;
use crate::trigger::{self, PullRequestRun};

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
  req.headers().get(name).and_then(|value| value.to_str().ok())
}

/// Receives GitHub deliveries. Accepted pull-request events start a pipeline
/// run in the background; the response never waits for it.
#[instrument(
    name = "handler::github_webhook",
    skip(app_state, req, body),
    fields(
        github_event = header(&req, EVENT_HEADER).unwrap_or_default(),
        delivery = header(&req, "X-GitHub-Delivery").unwrap_or_default(),
        payload_len = body.len(),
    )
)]
pub async fn github_webhook_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  signature::verify(
    app_state.config.github_webhook_secret.as_bytes(),
    &body,
    header(&req, SIGNATURE_HEADER),
  )?;

  match header(&req, EVENT_HEADER).unwrap_or_default() {
    "ping" => return Ok(HttpResponse::Ok().json(json!({ "status": "pong" }))),
    "pull_request" => {}
    other => {
      return Err(AppError::UnsupportedEvent(format!(
        "expecting pull request event but got '{}'",
        other
      )))
    }
  }

  let event = PullRequestEvent::from_slice(&body)?;
  if !event.is_triggering() {
    info!(action = %event.action, "Ignoring pull request action.");
    return Ok(HttpResponse::Ok().json(json!({ "status": "ignored", "action": event.action })));
  }

  if let Err(e) = event.check_permissions(&app_state.config.settings) {
    warn!(repository = %event.repository.full_name, error = %e, "Rejected pull request event.");
    return Err(e);
  }

  let run = PullRequestRun::from(&event);
  let run_id = run.run_id;
  trigger::spawn(app_state.get_ref().clone(), run);
  info!(
    %run_id,
    repository = %event.repository.full_name,
    head_ref = %event.pull_request.head.ref_name,
    sha = %event.head_sha(),
    "Triggered pipeline run."
  );

  Ok(HttpResponse::Accepted().json(json!({ "status": "accepted", "run_id": run_id })))
}
