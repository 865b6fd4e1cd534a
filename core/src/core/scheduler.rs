// stagecoach/src/core/scheduler.rs

//! Defines the `JobScheduler` trait: the narrow capability set the orchestrator
//! needs from a cluster job scheduler.

use crate::error::StagecoachResult;
use crate::model::{StepConfiguration, StepResult};
use async_trait::async_trait;
use std::fmt;

/// Reference to a job accepted by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle {
  pub name: String,
  /// Scheduler-assigned identity, when the scheduler has one.
  pub uid: Option<String>,
}

impl JobHandle {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      uid: None,
    }
  }
}

impl fmt::Display for JobHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.name)
  }
}

/// Submits, observes and collects one job per step.
///
/// Implementations report operational failures through `StagecoachError`.
/// A command exiting non-zero is NOT an error: it is reported in the
/// `StepResult` returned by `collect`.
#[async_trait]
pub trait JobScheduler: Send + Sync {
  /// Creates exactly one job for `step`.
  async fn submit(&self, step: &StepConfiguration) -> StagecoachResult<JobHandle>;

  /// Returns once the job reached a terminal state, successful or not.
  async fn wait(&self, job: &JobHandle) -> StagecoachResult<()>;

  /// Reads exit codes, logs and timing of a finished job.
  async fn collect(&self, job: &JobHandle) -> StagecoachResult<StepResult>;
}
