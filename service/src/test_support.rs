// stagecoach_service/src/test_support.rs

use crate::config::{AppConfig, AutomationSettings};
use crate::github::GithubClient;
use crate::metrics::Metrics;
use crate::state::AppState;
use async_trait::async_trait;
use stagecoach::{
  ContainerResult, JobHandle, JobScheduler, Orchestrator, StagecoachError, StagecoachResult, StepConfiguration,
  StepResult,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const WEBHOOK_SECRET: &str = "webhook-secret";

/// Scheduler whose jobs finish at once, every container with the same exit code.
pub struct ScriptedScheduler {
  exit_code: i32,
  reject_submissions: bool,
  next_id: AtomicUsize,
  submitted: Mutex<Vec<StepConfiguration>>,
}

impl ScriptedScheduler {
  pub fn exiting_with(exit_code: i32) -> Self {
    Self {
      exit_code,
      reject_submissions: false,
      next_id: AtomicUsize::new(0),
      submitted: Mutex::new(Vec::new()),
    }
  }

  pub fn rejecting_submissions() -> Self {
    Self {
      reject_submissions: true,
      ..Self::exiting_with(0)
    }
  }

  pub fn submitted(&self) -> Vec<StepConfiguration> {
    self.submitted.lock().clone()
  }
}

#[async_trait]
impl JobScheduler for ScriptedScheduler {
  async fn submit(&self, step: &StepConfiguration) -> StagecoachResult<JobHandle> {
    let job_name = format!("job-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
    self.submitted.lock().push(step.clone());
    if self.reject_submissions {
      return Err(StagecoachError::Submission {
        job_name,
        source: anyhow::anyhow!("forbidden"),
      });
    }
    Ok(JobHandle::new(job_name))
  }

  async fn wait(&self, _job: &JobHandle) -> StagecoachResult<()> {
    Ok(())
  }

  async fn collect(&self, job: &JobHandle) -> StagecoachResult<StepResult> {
    Ok(StepResult {
      containers: vec![ContainerResult::exited(job.name.clone(), self.exit_code)],
      output: format!("{} done\n", job.name),
      ..Default::default()
    })
  }
}

pub fn test_config(github_api_url: &str) -> AppConfig {
  AppConfig {
    server_host: "127.0.0.1".to_string(),
    server_port: 0,
    github_api_url: github_api_url.to_string(),
    github_api_token: "t0ken".to_string(),
    github_webhook_secret: WEBHOOK_SECRET.to_string(),
    pipeline_file: "automation-config.yaml".to_string(),
    settings: AutomationSettings {
      repositories: vec!["github.com/acme/widgets".to_string()],
      namespace: "automation".to_string(),
    },
  }
}

pub fn test_state(github_api_url: &str, scheduler: Arc<dyn JobScheduler>) -> AppState {
  let config = test_config(github_api_url);
  AppState {
    orchestrator: Orchestrator::new(scheduler),
    github: Arc::new(GithubClient::new(&config.github_api_url, &config.github_api_token).unwrap()),
    config: Arc::new(config),
    metrics: Arc::new(Metrics::new().unwrap()),
  }
}
