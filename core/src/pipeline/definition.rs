// stagecoach/src/pipeline/definition.rs

//! Contains the `Orchestrator` struct definition and its construction.

use crate::core::scheduler::JobScheduler;
use std::fmt;
use std::sync::Arc;

/// Runs pipelines against one scheduler.
///
/// The orchestrator holds no per-run state, so a single instance can execute
/// several pipelines at the same time.
#[derive(Clone)]
pub struct Orchestrator {
  pub(crate) scheduler: Arc<dyn JobScheduler>,
}

impl Orchestrator {
  pub fn new(scheduler: Arc<dyn JobScheduler>) -> Self {
    Self { scheduler }
  }

  pub fn scheduler(&self) -> &Arc<dyn JobScheduler> {
    &self.scheduler
  }
}

impl fmt::Debug for Orchestrator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Orchestrator").finish_non_exhaustive()
  }
}
