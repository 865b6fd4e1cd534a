// stagecoach/src/kubernetes/watch.rs

//! Polls a submitted job until it is finished.

use crate::error::WatchError;
use k8s_openapi::api::batch::v1::Job;
use std::future::Future;
use std::time::Duration;
use tracing::{event, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSettings {
  pub poll_interval: Duration,
  /// Upper bound on how long one job may run.
  pub deadline: Duration,
}

impl Default for WatchSettings {
  fn default() -> Self {
    Self {
      poll_interval: Duration::from_secs(1),
      deadline: Duration::from_secs(30 * 60),
    }
  }
}

/// A job is terminal once it carries a `Complete` or `Failed` condition with status `True`.
pub fn is_terminal(job: &Job) -> bool {
  job
    .status
    .as_ref()
    .and_then(|status| status.conditions.as_ref())
    .is_some_and(|conditions| {
      conditions
        .iter()
        .any(|c| (c.type_ == "Complete" || c.type_ == "Failed") && c.status == "True")
    })
}

/// Calls `fetch` every `poll_interval` until the returned job is terminal.
///
/// Returning `Ok(())` says nothing about whether the job passed. A failing
/// `fetch` ends the wait immediately; there are no retries.
pub async fn wait_for_terminal<F, Fut>(job_name: &str, settings: WatchSettings, fetch: F) -> Result<(), WatchError>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = anyhow::Result<Job>>,
{
  match tokio::time::timeout(settings.deadline, poll_until_terminal(job_name, settings.poll_interval, fetch)).await {
    Ok(outcome) => outcome,
    Err(_elapsed) => {
      event!(Level::WARN, job = job_name, deadline = ?settings.deadline, "Job exceeded its deadline.");
      Err(WatchError::DeadlineExceeded {
        job_name: job_name.to_string(),
        waited: settings.deadline,
      })
    }
  }
}

async fn poll_until_terminal<F, Fut>(job_name: &str, poll_interval: Duration, mut fetch: F) -> Result<(), WatchError>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = anyhow::Result<Job>>,
{
  let mut polls: u64 = 0;
  loop {
    tokio::time::sleep(poll_interval).await;
    polls += 1;

    let job = fetch().await.map_err(|source| WatchError::Query {
      job_name: job_name.to_string(),
      source,
    })?;

    if is_terminal(&job) {
      event!(Level::DEBUG, job = job_name, polls, "Job reached a terminal state.");
      return Ok(());
    }
    event!(Level::TRACE, job = job_name, polls, "Job still running.");
  }
}
