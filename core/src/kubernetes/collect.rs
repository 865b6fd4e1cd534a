// stagecoach/src/kubernetes/collect.rs

//! Reads the outcome of a finished job: timestamps from the job, exit codes
//! and logs from its single pod.

use crate::core::scheduler::JobHandle;
use crate::error::CollectError;
use crate::kubernetes::KubernetesScheduler;
use crate::model::{ContainerResult, StepResult};
use futures::AsyncReadExt;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{ContainerStatus, Pod};
use kube::api::{ListParams, LogParams};
use tracing::{event, instrument, Level};

impl KubernetesScheduler {
  #[instrument(name = "KubernetesScheduler::collect_step", skip_all, fields(job = %handle.name), err(Display))]
  pub(crate) async fn collect_step(&self, handle: &JobHandle) -> Result<StepResult, CollectError> {
    let job = self
      .jobs()
      .get(&handle.name)
      .await
      .map_err(|e| CollectError::FetchJob {
        job_name: handle.name.clone(),
        source: e.into(),
      })?;

    let job_uid = job
      .metadata
      .uid
      .clone()
      .or_else(|| handle.uid.clone())
      .ok_or_else(|| CollectError::MissingUid {
        job_name: handle.name.clone(),
      })?;

    let pod_list = self
      .pods()
      .list(&ListParams::default().labels(&format!("job-name={}", handle.name)))
      .await
      .map_err(|e| CollectError::ListPods {
        job_name: handle.name.clone(),
        source: e.into(),
      })?;

    let pod = owned_pod(&handle.name, &job_uid, pod_list.items)?;
    let pod_name = pod.metadata.name.clone().unwrap_or_default();
    event!(Level::DEBUG, pod = %pod_name, "Resolved pod of job.");

    let (init_names, main_names) = declared_names(&pod);
    let mut output = String::new();
    for container_name in init_names.iter().chain(main_names.iter()) {
      let logs = self
        .container_logs(&pod_name, container_name)
        .await
        .map_err(|source| CollectError::FetchLogs {
          pod_name: pod_name.clone(),
          container_name: container_name.clone(),
          source,
        })?;
      append_log(&mut output, &String::from_utf8_lossy(&logs));
    }

    Ok(assemble_step_result(&job, &pod, output))
  }

  /// Raw log bytes of one container. Output is not required to be UTF-8.
  async fn container_logs(&self, pod_name: &str, container_name: &str) -> anyhow::Result<Vec<u8>> {
    let params = LogParams {
      container: Some(container_name.to_string()),
      ..Default::default()
    };
    let mut stream = Box::pin(self.pods().log_stream(pod_name, &params).await?);
    let mut logs = Vec::new();
    stream.read_to_end(&mut logs).await?;
    Ok(logs)
  }
}

/// Picks the single pod owned by the job with `job_uid`.
///
/// Ownership is decided by owner references of kind `Job`; anything other than
/// exactly one owned pod is an error.
pub fn owned_pod(job_name: &str, job_uid: &str, pods: Vec<Pod>) -> Result<Pod, CollectError> {
  let mut owned: Vec<Pod> = pods.into_iter().filter(|pod| is_owned_by_job(pod, job_uid)).collect();
  if owned.len() != 1 {
    return Err(CollectError::UnexpectedPodCount {
      job_name: job_name.to_string(),
      count: owned.len(),
    });
  }
  Ok(owned.remove(0))
}

fn is_owned_by_job(pod: &Pod, job_uid: &str) -> bool {
  pod
    .metadata
    .owner_references
    .as_ref()
    .is_some_and(|refs| refs.iter().any(|r| r.kind == "Job" && r.uid == job_uid))
}

/// Builds the step result from the finished job, its pod and the collected logs.
pub fn assemble_step_result(job: &Job, pod: &Pod, output: String) -> StepResult {
  let job_status = job.status.as_ref();
  let pod_status = pod.status.as_ref();
  let (init_names, main_names) = declared_names(pod);

  StepResult {
    init_containers: container_results(
      &init_names,
      pod_status.and_then(|s| s.init_container_statuses.as_deref()).unwrap_or_default(),
    ),
    containers: container_results(
      &main_names,
      pod_status.and_then(|s| s.container_statuses.as_deref()).unwrap_or_default(),
    ),
    output,
    start_time: job_status.and_then(|s| s.start_time.as_ref()).map(|t| t.0),
    completion_time: job_status.and_then(|s| s.completion_time.as_ref()).map(|t| t.0),
  }
}

/// Init-container and container names, in the order the pod declares them.
fn declared_names(pod: &Pod) -> (Vec<String>, Vec<String>) {
  let Some(spec) = pod.spec.as_ref() else {
    return (Vec::new(), Vec::new());
  };
  let init = spec
    .init_containers
    .iter()
    .flatten()
    .map(|c| c.name.clone())
    .collect();
  let main = spec.containers.iter().map(|c| c.name.clone()).collect();
  (init, main)
}

fn container_results(names: &[String], statuses: &[ContainerStatus]) -> Vec<ContainerResult> {
  names
    .iter()
    .map(|name| ContainerResult {
      name: name.clone(),
      exit_code: statuses.iter().find(|s| &s.name == name).and_then(terminated_exit_code),
    })
    .collect()
}

// No terminated state (e.g. evicted before reporting) means the exit code is unknown.
fn terminated_exit_code(status: &ContainerStatus) -> Option<i32> {
  status.state.as_ref()?.terminated.as_ref().map(|t| t.exit_code)
}

fn append_log(output: &mut String, logs: &str) {
  if !output.is_empty() && !output.ends_with('\n') {
    output.push('\n');
  }
  output.push_str(logs);
}
