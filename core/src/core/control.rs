// stagecoach/src/core/control.rs

//! Signals controlling pipeline flow and the state of a pipeline run.

use crate::model::StageResult;
use std::fmt;

/// Decision taken after a stage has fully resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageGate {
  /// Every container of the stage exited with 0; submit the next stage.
  Continue,
  /// A container exited non-zero; record the stage and stop the run without error.
  Stop,
}

impl StageGate {
  /// Gating is derived from exit codes only.
  pub fn for_stage(stage: &StageResult) -> Self {
    if stage.did_succeed() {
      StageGate::Continue
    } else {
      StageGate::Stop
    }
  }
}

/// Lifecycle of one pipeline run:
/// `NotStarted -> RunningStage(i) -> {RunningStage(i + 1) | Aborted | Completed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
  NotStarted,
  /// Zero-based index of the stage whose steps are in flight.
  RunningStage(usize),
  /// An operational error stopped the run.
  Aborted,
  /// All stages ran, or a stage was gated by a test failure.
  Completed,
}

impl RunState {
  pub fn is_terminal(self) -> bool {
    matches!(self, RunState::Aborted | RunState::Completed)
  }
}

impl fmt::Display for RunState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RunState::NotStarted => write!(f, "not started"),
      RunState::RunningStage(idx) => write!(f, "running stage {idx}"),
      RunState::Aborted => write!(f, "aborted"),
      RunState::Completed => write!(f, "completed"),
    }
  }
}
