// stagecoach/src/pipeline/execution.rs

//! Contains `Orchestrator::execute()`: sequential stages, concurrent steps,
//! fail-fast gating.

use crate::core::control::{RunState, StageGate};
use crate::core::scheduler::JobScheduler;
use crate::error::{Aborted, StagecoachError, StagecoachResult};
use crate::model::{ExecutionResult, PipelineConfiguration, StageConfiguration, StageResult, StepConfiguration, StepResult};
use crate::pipeline::definition::Orchestrator;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{event, instrument, span, Instrument, Level};

impl Orchestrator {
  /// Executes every stage of `config` in order.
  ///
  /// - `Ok(result)` when the run completed, including runs stopped by a failing
  ///   container: inspect `result.did_succeed()` to tell them apart.
  /// - `Err(Aborted)` when a step hit an operational error. `Aborted::partial`
  ///   holds the stages that completed before the failing one.
  #[instrument(
        name = "Orchestrator::execute",
        skip_all,
        fields(
            num_stages = config.stages.len(),
            num_steps = config.step_count(),
        )
    )]
  pub async fn execute(&self, config: &PipelineConfiguration) -> Result<ExecutionResult, Aborted> {
    let mut result = ExecutionResult::default();
    let mut state = RunState::NotStarted;
    event!(Level::DEBUG, %state, "Pipeline execution starting.");

    for (stage_idx, stage) in config.stages.iter().enumerate() {
      state = RunState::RunningStage(stage_idx);
      event!(Level::DEBUG, %state, num_steps = stage.steps.len(), "Submitting stage.");

      let stage_span = span!(Level::INFO, "pipeline_stage_execution", stage_index = stage_idx);
      let stage_result = match self.execute_stage(stage_idx, stage).instrument(stage_span).await {
        Ok(stage_result) => stage_result,
        Err(error) => {
          state = RunState::Aborted;
          event!(Level::ERROR, %state, stage_index = stage_idx, error = %error, "Stage hit operational errors, aborting pipeline.");
          return Err(Aborted { partial: result, error });
        }
      };

      let gate = StageGate::for_stage(&stage_result);
      result.stages.push(stage_result);

      if gate == StageGate::Stop {
        state = RunState::Completed;
        event!(Level::INFO, %state, stage_index = stage_idx, "Stage did not succeed, remaining stages are skipped.");
        return Ok(result);
      }
    }

    state = RunState::Completed;
    event!(Level::DEBUG, %state, "Pipeline execution completed successfully.");
    Ok(result)
  }

  /// Runs every step of the stage as its own task and waits for all of them.
  ///
  /// Steps still running when a sibling fails are not cancelled; the stage only
  /// resolves once every task has finished.
  async fn execute_stage(&self, stage_idx: usize, stage: &StageConfiguration) -> StagecoachResult<StageResult> {
    let tasks: Vec<_> = stage
      .steps
      .iter()
      .enumerate()
      .map(|(step_idx, step)| {
        let scheduler = Arc::clone(&self.scheduler);
        let step = step.clone();
        let step_span = span!(Level::INFO, "pipeline_step_execution", stage_index = stage_idx, step_index = step_idx);
        tokio::spawn(async move { run_step(scheduler.as_ref(), &step).await }.instrument(step_span))
      })
      .collect();

    let mut steps = Vec::with_capacity(tasks.len());
    let mut errors = Vec::new();
    for (step_idx, outcome) in join_all(tasks).await.into_iter().enumerate() {
      match outcome {
        Ok(Ok(step_result)) => steps.push(step_result),
        Ok(Err(err)) => {
          event!(Level::WARN, step_index = step_idx, error = %err, "Step failed.");
          errors.push(err);
        }
        Err(join_err) => {
          event!(Level::ERROR, step_index = step_idx, error = %join_err, "Step task panicked or was cancelled.");
          errors.push(StagecoachError::StepTask {
            message: format!("step {step_idx}: {join_err}"),
          });
        }
      }
    }

    if !errors.is_empty() {
      return Err(StagecoachError::Stage {
        stage_index: stage_idx,
        errors,
      });
    }

    Ok(StageResult { steps })
  }
}

/// submit -> wait -> collect for one step.
async fn run_step(scheduler: &dyn JobScheduler, step: &StepConfiguration) -> StagecoachResult<StepResult> {
  let job = scheduler.submit(step).await?;
  event!(Level::DEBUG, job = %job, "Job submitted, waiting for a terminal state.");

  scheduler.wait(&job).await?;

  let step_result = scheduler.collect(&job).await?;
  event!(
    Level::INFO,
    job = %job,
    succeeded = step_result.did_succeed(),
    "Step finished."
  );
  Ok(step_result)
}
