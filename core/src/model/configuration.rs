// stagecoach/src/model/configuration.rs

//! Declarative description of a pipeline: stages of concurrently running steps,
//! each step being one cluster job made of init-containers and containers.
//!
//! Documents are written in YAML or JSON with camelCase keys, e.g.
//!
//! ```yaml
//! stages:
//!   - steps:
//!       - volumes:
//!           - name: workspace
//!             emptyDir: {}
//!         initContainers:
//!           - image: alpine/git
//!             command: git clone $GIT_REPOSITORY_URL /workspace
//!             volumeMounts:
//!               - name: workspace
//!                 mountPath: /workspace
//!         containers:
//!           - image: rust:1
//!             workingDir: /workspace
//!             command: cargo test
//!             volumeMounts:
//!               - name: workspace
//!                 mountPath: /workspace
//! ```

use crate::error::{StagecoachError, StagecoachResult};
use k8s_openapi::api::core::v1::{EnvVar, SecurityContext, Volume};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::str::FromStr;

/// The full automation run for one commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfiguration {
  pub stages: Vec<StageConfiguration>,
}

/// A set of independent steps. Order only matters for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfiguration {
  pub steps: Vec<StepConfiguration>,
}

/// One schedulable unit of work, mapped 1:1 to a cluster job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StepConfiguration {
  /// Run to completion, in order, before `containers` start. The scheduler enforces this.
  pub init_containers: Vec<ContainerConfiguration>,
  pub containers: Vec<ContainerConfiguration>,
  /// Shared by name with every container of the step.
  pub volumes: Vec<Volume>,
  pub service_account_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContainerConfiguration {
  /// Shell script, run as `/bin/sh -c <command>`.
  pub command: String,
  pub image: String,
  pub env: Vec<EnvVar>,
  /// Names must match a step-level volume; the scheduler rejects unknown names.
  pub volume_mounts: Vec<VolumeMount>,
  pub working_dir: Option<String>,
  pub security_context: Option<SecurityContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VolumeMount {
  pub name: String,
  pub mount_path: String,
}

impl PipelineConfiguration {
  /// Decodes a YAML or JSON pipeline document. Unknown fields are ignored.
  pub fn decode<R: Read>(reader: R) -> StagecoachResult<Self> {
    serde_yaml::from_reader(reader).map_err(|source| StagecoachError::Configuration { source })
  }

  /// Appends `vars` to the environment of every container and init-container.
  ///
  /// Entries already present keep their value and position; the new ones go last.
  pub fn with_env(mut self, vars: &[EnvVar]) -> Self {
    for step in self.stages.iter_mut().flat_map(|stage| stage.steps.iter_mut()) {
      for container in step.init_containers.iter_mut().chain(step.containers.iter_mut()) {
        container.env.extend(vars.iter().cloned());
      }
    }
    self
  }

  pub fn step_count(&self) -> usize {
    self.stages.iter().map(|stage| stage.steps.len()).sum()
  }
}

impl FromStr for PipelineConfiguration {
  type Err = StagecoachError;

  fn from_str(document: &str) -> Result<Self, Self::Err> {
    serde_yaml::from_str(document).map_err(|source| StagecoachError::Configuration { source })
  }
}
