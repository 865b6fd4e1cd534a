// stagecoach_service/src/state.rs
use crate::config::AppConfig;
use crate::github::GithubClient;
use crate::metrics::Metrics;
use stagecoach::Orchestrator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub orchestrator: Orchestrator,
  pub github: Arc<GithubClient>,
  pub config: Arc<AppConfig>,
  pub metrics: Arc<Metrics>,
}
