// stagecoach/src/kubernetes/mod.rs

//! `JobScheduler` backed by the Kubernetes `batch/v1` Job API.
//!
//! Every step becomes one Job in a fixed namespace. Jobs are created, polled
//! and read; they are never updated or deleted by the engine.

pub mod collect;
pub mod names;
pub mod translate;
pub mod watch;

pub use translate::translate;
pub use watch::WatchSettings;

use crate::core::scheduler::{JobHandle, JobScheduler};
use crate::error::{StagecoachError, StagecoachResult};
use crate::model::{StepConfiguration, StepResult};
use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use kube::api::PostParams;
use kube::config::KubeConfigOptions;
use kube::{Api, Client, Config};
use tracing::{event, instrument, Level};

/// Resolves a cluster client: in-cluster service account credentials first,
/// then the kubeconfig file (`KUBECONFIG` or `~/.kube/config`).
pub async fn connect() -> StagecoachResult<Client> {
  let config = match Config::incluster() {
    Ok(config) => config,
    Err(in_cluster_err) => {
      event!(
        Level::INFO,
        error = %in_cluster_err,
        "In-cluster configuration unavailable, trying kubeconfig next."
      );
      Config::from_kubeconfig(&KubeConfigOptions::default())
        .await
        .map_err(|e| StagecoachError::ClusterConnection { source: e.into() })?
    }
  };

  Client::try_from(config).map_err(|e| StagecoachError::ClusterConnection { source: e.into() })
}

#[derive(Clone)]
pub struct KubernetesScheduler {
  client: Client,
  namespace: String,
  watch: WatchSettings,
}

impl KubernetesScheduler {
  pub fn new(client: Client, namespace: impl Into<String>) -> Self {
    Self {
      client,
      namespace: namespace.into(),
      watch: WatchSettings::default(),
    }
  }

  pub fn with_watch_settings(mut self, watch: WatchSettings) -> Self {
    self.watch = watch;
    self
  }

  pub fn namespace(&self) -> &str {
    &self.namespace
  }

  pub(crate) fn jobs(&self) -> Api<Job> {
    Api::namespaced(self.client.clone(), &self.namespace)
  }

  pub(crate) fn pods(&self) -> Api<Pod> {
    Api::namespaced(self.client.clone(), &self.namespace)
  }
}

#[async_trait]
impl JobScheduler for KubernetesScheduler {
  #[instrument(name = "KubernetesScheduler::submit", skip_all, fields(namespace = %self.namespace), err(Display))]
  async fn submit(&self, step: &StepConfiguration) -> StagecoachResult<JobHandle> {
    let job = translate(step);
    let job_name = job.metadata.name.clone().unwrap_or_default();

    let created = self
      .jobs()
      .create(&PostParams::default(), &job)
      .await
      .map_err(|e| StagecoachError::Submission {
        job_name: job_name.clone(),
        source: e.into(),
      })?;

    event!(Level::INFO, job = %job_name, "Created job.");
    Ok(JobHandle {
      name: created.metadata.name.unwrap_or(job_name),
      uid: created.metadata.uid,
    })
  }

  #[instrument(name = "KubernetesScheduler::wait", skip_all, fields(job = %job.name), err(Display))]
  async fn wait(&self, job: &JobHandle) -> StagecoachResult<()> {
    let jobs = self.jobs();
    watch::wait_for_terminal(&job.name, self.watch, || {
      let jobs = jobs.clone();
      let name = job.name.clone();
      async move { jobs.get(&name).await.map_err(anyhow::Error::from) }
    })
    .await
    .map_err(|source| StagecoachError::Watch {
      job_name: job.name.clone(),
      source,
    })
  }

  async fn collect(&self, job: &JobHandle) -> StagecoachResult<StepResult> {
    self
      .collect_step(job)
      .await
      .map_err(|source| StagecoachError::Collection {
        job_name: job.name.clone(),
        source,
      })
  }
}
