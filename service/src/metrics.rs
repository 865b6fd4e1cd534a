// stagecoach_service/src/metrics.rs

//! Prometheus metrics of pipeline runs, served at `GET /metrics`.

use crate::github::CommitState;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use stagecoach::ExecutionResult;

const STEP_DURATION_BUCKETS: &[f64] = &[1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1200.0, 1800.0];

pub struct Metrics {
  registry: Registry,
  runs: IntCounterVec,
  step_durations: HistogramVec,
}

impl Metrics {
  pub fn new() -> prometheus::Result<Self> {
    let registry = Registry::new();

    let runs = IntCounterVec::new(
      Opts::new("stagecoach_pipeline_runs_total", "Pipeline runs by the commit state reported last."),
      &["state"],
    )?;
    let step_durations = HistogramVec::new(
      HistogramOpts::new("stagecoach_step_duration_seconds", "Duration of finished steps.")
        .buckets(STEP_DURATION_BUCKETS.to_vec()),
      &["outcome"],
    )?;

    registry.register(Box::new(runs.clone()))?;
    registry.register(Box::new(step_durations.clone()))?;

    Ok(Self {
      registry,
      runs,
      step_durations,
    })
  }

  pub fn record_run(&self, state: CommitState) {
    let state = state.to_string();
    self.runs.with_label_values(&[state.as_str()]).inc();
  }

  /// Observes every step that carries both timestamps.
  pub fn observe_steps(&self, result: &ExecutionResult) {
    for step in result.stages.iter().flat_map(|stage| stage.steps.iter()) {
      let Some(duration) = step.duration() else {
        continue;
      };
      let outcome = if step.did_succeed() { "passed" } else { "failed" };
      self
        .step_durations
        .with_label_values(&[outcome])
        .observe(duration.num_milliseconds() as f64 / 1000.0);
    }
  }

  pub fn content_type(&self) -> String {
    TextEncoder::new().format_type().to_string()
  }

  /// Text exposition format of everything recorded so far.
  pub fn render(&self) -> prometheus::Result<String> {
    TextEncoder::new().encode_to_string(&self.registry.gather())
  }
}
