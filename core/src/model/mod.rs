// stagecoach/src/model/mod.rs

//! The pipeline configuration schema and the result tree that mirrors it.

pub mod configuration;
pub mod result;

pub use configuration::{
  ContainerConfiguration, PipelineConfiguration, StageConfiguration, StepConfiguration, VolumeMount,
};
pub use result::{ContainerResult, ExecutionResult, StageResult, StepResult};
