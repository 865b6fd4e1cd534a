// stagecoach/src/error.rs

//! Error types of the execution engine.
//!
//! A container exiting non-zero is never an error: it is data in the result tree.
//! Everything here describes the engine failing to submit, observe or collect work.

use crate::model::result::ExecutionResult;
use anyhow::Error as AnyhowError;
use std::time::Duration;
use thiserror::Error;

/// Failure of the completion watcher for one job.
#[derive(Debug, Error)]
pub enum WatchError {
  #[error("job '{job_name}' did not reach a terminal state within {waited:?}")]
  DeadlineExceeded { job_name: String, waited: Duration },

  #[error("failed to query status of job '{job_name}'. Source: {source}")]
  Query {
    job_name: String,
    #[source]
    source: AnyhowError,
  },
}

/// Failure of the result collector for one job. Each variant names the
/// read operation that failed.
#[derive(Debug, Error)]
pub enum CollectError {
  #[error("failed to re-fetch job '{job_name}' for its timestamps. Source: {source}")]
  FetchJob {
    job_name: String,
    #[source]
    source: AnyhowError,
  },

  #[error("job '{job_name}' has no uid, cannot resolve its pods")]
  MissingUid { job_name: String },

  #[error("failed to list pods of job '{job_name}'. Source: {source}")]
  ListPods {
    job_name: String,
    #[source]
    source: AnyhowError,
  },

  #[error("retrieving result of job '{job_name}': expected 1 pod, but got {count}")]
  UnexpectedPodCount { job_name: String, count: usize },

  #[error("failed to retrieve logs of container '{container_name}' in pod '{pod_name}'. Source: {source}")]
  FetchLogs {
    pod_name: String,
    container_name: String,
    #[source]
    source: AnyhowError,
  },
}

#[derive(Debug, Error)]
pub enum StagecoachError {
  #[error("Invalid pipeline configuration: {source}")]
  Configuration {
    #[source]
    source: serde_yaml::Error,
  },

  #[error("Failed to connect to the cluster. Source: {source}")]
  ClusterConnection {
    #[source]
    source: AnyhowError,
  },

  #[error("Failed to create job '{job_name}'. Source: {source}")]
  Submission {
    job_name: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Failed to wait for job '{job_name}' to finish: {source}")]
  Watch {
    job_name: String,
    #[source]
    source: WatchError,
  },

  #[error("Failed to collect result of job '{job_name}': {source}")]
  Collection {
    job_name: String,
    #[source]
    source: CollectError,
  },

  #[error("Step task did not complete: {message}")]
  StepTask { message: String },

  /// Every operational error raised by the steps of one stage. `stage_index`
  /// is zero-based; the message numbers stages from 1.
  #[error("Stage {} failed with {} operational error(s):\n{}", .stage_index + 1, .errors.len(), join_errors(.errors))]
  Stage {
    stage_index: usize,
    errors: Vec<StagecoachError>,
  },
}

impl StagecoachError {
  /// True for errors that happened before any cluster interaction.
  pub fn is_configuration_error(&self) -> bool {
    matches!(self, StagecoachError::Configuration { .. })
  }
}

fn join_errors(errors: &[StagecoachError]) -> String {
  errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

/// A pipeline run that stopped because of an operational error.
///
/// `partial` holds the results of every stage that completed before the failing one.
#[derive(Debug, Error)]
#[error("Pipeline aborted after {} completed stage(s): {error}", .partial.stages.len())]
pub struct Aborted {
  pub partial: ExecutionResult,
  #[source]
  pub error: StagecoachError,
}

pub type StagecoachResult<T, E = StagecoachError> = std::result::Result<T, E>;
