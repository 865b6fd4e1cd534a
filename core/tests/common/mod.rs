// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use parking_lot::Mutex;
use stagecoach::{
  CollectError, ContainerConfiguration, ContainerResult, JobHandle, JobScheduler, PipelineConfiguration,
  StageConfiguration, StagecoachError, StagecoachResult, StepConfiguration, StepResult, WatchError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::Level;

// --- Fake scheduler ---
//
// Interprets each container command instead of running it:
//   "echo <text>"   -> prints "<text>\n", exits 0
//   "false"         -> exits 1
//   "exit <code>"   -> exits <code>
//   "sleep <ms>"    -> the job takes <ms> milliseconds to finish, exits 0
//   "fail-submit"   -> the job is rejected at submission
//   "fail-watch"    -> polling the job fails
//   "fail-collect"  -> the job has no pod at collection time
//   "panic"         -> the step task panics during collection
#[derive(Default)]
pub struct FakeScheduler {
  jobs: Mutex<HashMap<String, StepConfiguration>>,
  submitted: Mutex<Vec<StepConfiguration>>,
  collected: Mutex<Vec<String>>,
  next_id: AtomicUsize,
  in_flight: AtomicUsize,
  max_in_flight: AtomicUsize,
}

impl FakeScheduler {
  pub fn new() -> Self {
    Self::default()
  }

  /// Steps in submission order.
  pub fn submitted(&self) -> Vec<StepConfiguration> {
    self.submitted.lock().clone()
  }

  pub fn submitted_commands(&self) -> Vec<String> {
    self
      .submitted()
      .iter()
      .flat_map(|step| step.containers.iter().map(|c| c.command.clone()))
      .collect()
  }

  /// Names of jobs whose results were collected.
  pub fn collected(&self) -> Vec<String> {
    self.collected.lock().clone()
  }

  pub fn max_in_flight(&self) -> usize {
    self.max_in_flight.load(Ordering::SeqCst)
  }

  fn step(&self, job: &JobHandle) -> StepConfiguration {
    self.jobs.lock().get(&job.name).cloned().unwrap_or_default()
  }
}

fn commands(step: &StepConfiguration) -> impl Iterator<Item = &str> {
  step
    .init_containers
    .iter()
    .chain(step.containers.iter())
    .map(|c| c.command.as_str())
}

fn exit_code(command: &str) -> i32 {
  if command == "false" {
    1
  } else if let Some(code) = command.strip_prefix("exit ") {
    code.trim().parse().unwrap_or(1)
  } else {
    0
  }
}

#[async_trait]
impl JobScheduler for FakeScheduler {
  async fn submit(&self, step: &StepConfiguration) -> StagecoachResult<JobHandle> {
    let job_name = format!("job-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
    self.submitted.lock().push(step.clone());

    if commands(step).any(|c| c == "fail-submit") {
      return Err(StagecoachError::Submission {
        job_name,
        source: anyhow::anyhow!("admission webhook denied the request"),
      });
    }

    self.jobs.lock().insert(job_name.clone(), step.clone());
    Ok(JobHandle::new(job_name))
  }

  async fn wait(&self, job: &JobHandle) -> StagecoachResult<()> {
    let step = self.step(job);

    let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    self.max_in_flight.fetch_max(now, Ordering::SeqCst);

    let mut outcome = Ok(());
    for command in commands(&step) {
      if let Some(millis) = command.strip_prefix("sleep ") {
        tokio::time::sleep(Duration::from_millis(millis.trim().parse().unwrap_or(0))).await;
      } else if command == "fail-watch" {
        outcome = Err(WatchError::Query {
          job_name: job.name.clone(),
          source: anyhow::anyhow!("the server is currently unable to handle the request"),
        });
      }
    }
    // Give sibling tasks a chance to start before this one leaves.
    tokio::task::yield_now().await;

    self.in_flight.fetch_sub(1, Ordering::SeqCst);
    outcome.map_err(|source| StagecoachError::Watch {
      job_name: job.name.clone(),
      source,
    })
  }

  async fn collect(&self, job: &JobHandle) -> StagecoachResult<StepResult> {
    let step = self.step(job);

    if commands(&step).any(|c| c == "panic") {
      panic!("collector crashed on {}", job.name);
    }
    if commands(&step).any(|c| c == "fail-collect") {
      return Err(StagecoachError::Collection {
        job_name: job.name.clone(),
        source: CollectError::UnexpectedPodCount {
          job_name: job.name.clone(),
          count: 0,
        },
      });
    }

    let results = |containers: &[ContainerConfiguration]| -> Vec<ContainerResult> {
      containers
        .iter()
        .enumerate()
        .map(|(idx, c)| ContainerResult::exited(format!("{}-{idx}", job.name), exit_code(&c.command)))
        .collect()
    };

    let output = commands(&step)
      .filter_map(|c| c.strip_prefix("echo "))
      .map(|text| format!("{text}\n"))
      .collect::<String>();

    self.collected.lock().push(job.name.clone());
    Ok(StepResult {
      init_containers: results(&step.init_containers),
      containers: results(&step.containers),
      output,
      start_time: None,
      completion_time: None,
    })
  }
}

// --- Pipeline builders ---

pub fn container(command: &str) -> ContainerConfiguration {
  ContainerConfiguration {
    command: command.to_string(),
    image: "debian".to_string(),
    ..Default::default()
  }
}

pub fn step(commands: &[&str]) -> StepConfiguration {
  StepConfiguration {
    containers: commands.iter().map(|c| container(c)).collect(),
    ..Default::default()
  }
}

/// One single-container step per command, all in one stage.
pub fn stage(commands: &[&str]) -> StageConfiguration {
  StageConfiguration {
    steps: commands.iter().map(|c| step(&[*c])).collect(),
  }
}

pub fn pipeline(stages: Vec<StageConfiguration>) -> PipelineConfiguration {
  PipelineConfiguration { stages }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
