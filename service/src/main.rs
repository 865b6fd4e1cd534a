// stagecoach_service/src/main.rs

mod config;
mod errors;
mod github;
mod metrics;
mod state;
mod trigger;
mod web;

#[cfg(test)]
mod test_support;

use crate::config::AppConfig;
use crate::github::GithubClient;
use crate::metrics::Metrics;
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use stagecoach::{KubernetesScheduler, Orchestrator};
use std::io;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting stagecoach server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(io::Error::other(e.to_string()));
    }
  };

  let client = match stagecoach::connect().await {
    Ok(client) => {
      tracing::info!(namespace = %app_config.settings.namespace, "Connected to the cluster.");
      client
    }
    Err(e) => {
      tracing::error!(error = %e, "Failed to connect to the cluster.");
      return Err(io::Error::other(e.to_string()));
    }
  };
  let scheduler = KubernetesScheduler::new(client, app_config.settings.namespace.clone());

  let github = match GithubClient::new(&app_config.github_api_url, &app_config.github_api_token) {
    Ok(github) => Arc::new(github),
    Err(e) => {
      tracing::error!(error = %e, "Failed to build the GitHub client.");
      return Err(io::Error::other(e.to_string()));
    }
  };

  let metrics = match Metrics::new() {
    Ok(metrics) => Arc::new(metrics),
    Err(e) => {
      tracing::error!(error = %e, "Failed to register metrics.");
      return Err(io::Error::other(e.to_string()));
    }
  };

  let app_state = AppState {
    orchestrator: Orchestrator::new(Arc::new(scheduler)),
    github,
    config: app_config.clone(),
    metrics,
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
