// stagecoach/src/model/result.rs

//! Results of a pipeline run, shaped like the configuration tree.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Results of every stage that ran. A run that stopped early holds fewer stages than its configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
  pub stages: Vec<StageResult>,
}

impl ExecutionResult {
  pub fn did_succeed(&self) -> bool {
    self.stages.iter().all(StageResult::did_succeed)
  }

  /// Zero-based index of the first unsuccessful stage, if any.
  pub fn failed_stage(&self) -> Option<usize> {
    self.stages.iter().position(|stage| !stage.did_succeed())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
  pub steps: Vec<StepResult>,
}

impl StageResult {
  /// True iff every container and init-container of every step exited with 0.
  pub fn did_succeed(&self) -> bool {
    self.steps.iter().all(StepResult::did_succeed)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
  pub init_containers: Vec<ContainerResult>,
  pub containers: Vec<ContainerResult>,
  /// Logs of all containers of the step, init-containers first.
  pub output: String,
  pub start_time: Option<DateTime<Utc>>,
  pub completion_time: Option<DateTime<Utc>>,
}

impl StepResult {
  pub fn did_succeed(&self) -> bool {
    self
      .init_containers
      .iter()
      .chain(self.containers.iter())
      .all(ContainerResult::succeeded)
  }

  pub fn duration(&self) -> Option<Duration> {
    match (self.start_time, self.completion_time) {
      (Some(start), Some(end)) => Some(end - start),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerResult {
  pub name: String,
  /// `None` when the container never reported a terminated state.
  pub exit_code: Option<i32>,
}

impl ContainerResult {
  pub fn exited(name: impl Into<String>, exit_code: i32) -> Self {
    Self {
      name: name.into(),
      exit_code: Some(exit_code),
    }
  }

  /// An unknown exit state counts as a failure.
  pub fn succeeded(&self) -> bool {
    self.exit_code == Some(0)
  }
}
