// stagecoach/src/pipeline/mod.rs

//! Defines the `Orchestrator`, which drives a `PipelineConfiguration` stage by
//! stage against a `JobScheduler`.

pub mod definition;
pub mod execution;

// Re-export the main Orchestrator struct
pub use definition::Orchestrator;
