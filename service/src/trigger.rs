// stagecoach_service/src/trigger.rs

//! Runs the pipeline of a pull request and reports the outcome back to GitHub.

use crate::github::report::{commit_state, format_report};
use crate::github::{CommitState, PullRequestEvent};
use crate::state::AppState;
use anyhow::Context;
use k8s_openapi::api::core::v1::EnvVar;
use stagecoach::PipelineConfiguration;
use tokio::task::JoinHandle;
use tracing::{event, instrument, span, Instrument, Level};
use uuid::Uuid;

/// Everything a run needs from the triggering event.
#[derive(Debug, Clone)]
pub struct PullRequestRun {
  pub run_id: Uuid,
  pub owner: String,
  pub repo: String,
  pub number: u64,
  pub sha: String,
  pub clone_url: String,
}

impl From<&PullRequestEvent> for PullRequestRun {
  fn from(event: &PullRequestEvent) -> Self {
    Self {
      run_id: Uuid::new_v4(),
      owner: event.repository.owner.login.clone(),
      repo: event.repository.name.clone(),
      number: event.number,
      sha: event.head_sha().to_string(),
      clone_url: event.repository.clone_url.clone(),
    }
  }
}

impl PullRequestRun {
  /// Variables every container of the pipeline receives.
  fn injected_env(&self) -> [EnvVar; 2] {
    [
      EnvVar {
        name: "GIT_REPOSITORY_URL".to_string(),
        value: Some(self.clone_url.clone()),
        ..Default::default()
      },
      EnvVar {
        name: "GIT_REF".to_string(),
        value: Some(self.sha.clone()),
        ..Default::default()
      },
    ]
  }
}

/// Starts the run in the background. Failures are logged, never returned.
pub fn spawn(state: AppState, run: PullRequestRun) -> JoinHandle<()> {
  let run_span = span!(
    Level::INFO,
    "pull_request_run",
    run_id = %run.run_id,
    repository = %format!("{}/{}", run.owner, run.repo),
    sha = %run.sha,
  );
  tokio::spawn(
    async move {
      match execute_run(&state, &run).await {
        Ok(reported) => event!(Level::INFO, state = %reported, "Run reported."),
        Err(e) => event!(Level::ERROR, error = format!("{:#}", e), "Run failed."),
      }
    }
    .instrument(run_span),
  )
}

/// pending -> fetch pipeline -> execute -> comment + final status.
///
/// Returns the commit state that was reported last.
#[instrument(name = "trigger::execute_run", skip_all, fields(number = run.number))]
pub async fn execute_run(state: &AppState, run: &PullRequestRun) -> anyhow::Result<CommitState> {
  let github = &state.github;
  let pipeline_file = &state.config.pipeline_file;

  github
    .create_status(&run.owner, &run.repo, &run.sha, CommitState::Pending, "Pipeline run started")
    .await
    .context("setting pending status")?;

  let document = match github.fetch_file(&run.owner, &run.repo, pipeline_file, &run.sha).await {
    Ok(document) => document,
    Err(e) => {
      report_error(state, run, &format!("Cannot fetch {}", pipeline_file)).await;
      return Err(e).context(format!("fetching {}", pipeline_file));
    }
  };

  let config = match PipelineConfiguration::decode(document.as_slice()) {
    Ok(config) => config.with_env(&run.injected_env()),
    Err(e) => {
      report_error(state, run, &format!("Invalid {}: {}", pipeline_file, e)).await;
      return Err(e).context("decoding pipeline configuration");
    }
  };
  event!(
    Level::INFO,
    stages = config.stages.len(),
    steps = config.step_count(),
    "Pipeline configuration loaded."
  );

  match state.orchestrator.execute(&config).await {
    Ok(result) => {
      state.metrics.observe_steps(&result);
      let final_state = commit_state(&result);
      github
        .create_comment(&run.owner, &run.repo, run.number, &format_report(&run.sha, &result))
        .await
        .context("posting result comment")?;
      let description = match result.failed_stage() {
        Some(stage_idx) => format!("Stage {} failed", stage_idx + 1),
        None => "All stages passed".to_string(),
      };
      github
        .create_status(&run.owner, &run.repo, &run.sha, final_state, &description)
        .await
        .context("setting final status")?;
      state.metrics.record_run(final_state);
      Ok(final_state)
    }
    Err(aborted) => {
      state.metrics.observe_steps(&aborted.partial);
      report_error(state, run, &aborted.error.to_string()).await;
      Err(aborted).context("executing pipeline")
    }
  }
}

async fn report_error(state: &AppState, run: &PullRequestRun, description: &str) {
  state.metrics.record_run(CommitState::Error);
  if let Err(e) = state
    .github
    .create_status(&run.owner, &run.repo, &run.sha, CommitState::Error, description)
    .await
  {
    event!(Level::WARN, error = %e, "Could not set error status.");
  }
}
