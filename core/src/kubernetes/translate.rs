// stagecoach/src/kubernetes/translate.rs

//! Converts a `StepConfiguration` into a `batch/v1` `Job`.
//!
//! The translation is a pure mapping apart from name generation. Mount names,
//! images and security settings are not validated here; the API server rejects
//! invalid jobs at submission time.

use crate::kubernetes::names::random_name;
use crate::model::{ContainerConfiguration, StepConfiguration};
use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec, VolumeMount};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Every command is interpreted as a shell script.
pub const SHELL_ENTRYPOINT: [&str; 2] = ["/bin/sh", "-c"];

pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const MANAGED_BY_VALUE: &str = "stagecoach";

/// Builds the job for one step: pods never restart and the job never retries,
/// so a failing container is reported exactly once.
pub fn translate(step: &StepConfiguration) -> Job {
  let labels = BTreeMap::from([(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string())]);

  let pod_spec = PodSpec {
    service_account_name: step.service_account_name.clone(),
    restart_policy: Some("Never".to_string()),
    init_containers: non_empty(to_containers(&step.init_containers)),
    containers: to_containers(&step.containers),
    volumes: non_empty(step.volumes.clone()),
    ..Default::default()
  };

  Job {
    metadata: ObjectMeta {
      name: Some(random_name()),
      labels: Some(labels.clone()),
      ..Default::default()
    },
    spec: Some(JobSpec {
      backoff_limit: Some(0),
      template: PodTemplateSpec {
        metadata: Some(ObjectMeta {
          labels: Some(labels),
          ..Default::default()
        }),
        spec: Some(pod_spec),
      },
      ..Default::default()
    }),
    ..Default::default()
  }
}

fn to_containers(configs: &[ContainerConfiguration]) -> Vec<Container> {
  configs.iter().map(to_container).collect()
}

fn to_container(config: &ContainerConfiguration) -> Container {
  let volume_mounts = config
    .volume_mounts
    .iter()
    .map(|mount| VolumeMount {
      name: mount.name.clone(),
      mount_path: mount.mount_path.clone(),
      ..Default::default()
    })
    .collect();

  Container {
    name: random_name(),
    image: Some(config.image.clone()),
    command: Some(SHELL_ENTRYPOINT.iter().map(ToString::to_string).collect()),
    args: Some(vec![config.command.clone()]),
    env: non_empty(config.env.clone()),
    volume_mounts: non_empty(volume_mounts),
    working_dir: config.working_dir.clone(),
    security_context: config.security_context.clone(),
    ..Default::default()
  }
}

// The API server treats an empty list and an absent one alike; omit empties.
fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
  if items.is_empty() {
    None
  } else {
    Some(items)
  }
}
