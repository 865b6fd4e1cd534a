// src/lib.rs

//! Stagecoach: a pipeline execution engine for containerized CI on Kubernetes.
//!
//! A pipeline is a sequence of stages; a stage is a set of steps that run
//! concurrently; a step is one cluster job made of init-containers and
//! containers. Stagecoach:
//!  - Runs stages strictly one after the other.
//!  - Runs every step of a stage at the same time and waits for all of them.
//!  - Stops after the first stage in which a container exits non-zero.
//!  - Aborts on operational errors (a job could not be created, observed or
//!    collected) and reports every such error of the failing stage.
//!  - Returns exit codes, combined logs and timing for every step that ran.

pub mod core;
pub mod error;
pub mod kubernetes;
pub mod model;
pub mod pipeline;

// --- Re-exports for the Public API ---

pub use crate::core::control::{RunState, StageGate};
pub use crate::core::scheduler::{JobHandle, JobScheduler};

pub use crate::model::{
  ContainerConfiguration, ContainerResult, ExecutionResult, PipelineConfiguration, StageConfiguration, StageResult,
  StepConfiguration, StepResult, VolumeMount,
};

pub use crate::pipeline::definition::Orchestrator;

pub use crate::kubernetes::{connect, translate, KubernetesScheduler, WatchSettings};

pub use crate::error::{Aborted, CollectError, StagecoachError, StagecoachResult, WatchError};

/*
    Typical use:
    1. Obtain a client with `stagecoach::connect().await?`.
    2. Build `KubernetesScheduler::new(client, namespace)` and wrap it in
       `Orchestrator::new(Arc::new(scheduler))`.
    3. Decode a `PipelineConfiguration` from YAML or JSON.
    4. `orchestrator.execute(&config).await`:
       - `Ok(result)` -> check `result.did_succeed()`.
       - `Err(Aborted { partial, error })` -> the engine itself failed.
*/
