// stagecoach_service/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use stagecoach::StagecoachError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Signature Error: {0}")]
  Signature(String),

  #[error("Unsupported Event: {0}")]
  UnsupportedEvent(String),

  #[error("Permission Denied: {0}")]
  Permission(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("GitHub API Error: {0}")]
  GitHub(String),

  #[error("Pipeline Error: {source}")]
  Pipeline {
    #[from]
    source: StagecoachError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    AppError::Internal(err.to_string())
  }
}

impl From<prometheus::Error> for AppError {
  fn from(err: prometheus::Error) -> Self {
    AppError::Internal(format!("rendering metrics: {}", err))
  }
}

impl From<reqwest::Error> for AppError {
  fn from(err: reqwest::Error) -> Self {
    AppError::GitHub(err.to_string())
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      // GitHub only looks at the status code; every rejected delivery is a 400.
      AppError::Validation(m)
      | AppError::Signature(m)
      | AppError::UnsupportedEvent(m)
      | AppError::Permission(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::GitHub(m) => HttpResponse::BadGateway().json(json!({"error": "GitHub API error", "detail": m})),
      AppError::Pipeline { source } => HttpResponse::InternalServerError()
        .json(json!({"error": "Pipeline execution error", "detail": source.to_string()})),
      AppError::Internal(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
