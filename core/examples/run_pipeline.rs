// stagecoach/examples/run_pipeline.rs
//
// Runs a pipeline file against the current cluster and prints the result.
//
//   cargo run --example run_pipeline -- pipeline.yaml [namespace]

use stagecoach::{connect, Aborted, ExecutionResult, KubernetesScheduler, Orchestrator, PipelineConfiguration};
use std::fs::File;
use std::sync::Arc;
use tracing::{error, info};

fn print_result(result: &ExecutionResult) {
  for (stage_idx, stage) in result.stages.iter().enumerate() {
    println!("Stage {} ({})", stage_idx + 1, if stage.did_succeed() { "passed" } else { "failed" });
    for (step_idx, step) in stage.steps.iter().enumerate() {
      let exit_codes: Vec<String> = step
        .init_containers
        .iter()
        .chain(step.containers.iter())
        .map(|c| match c.exit_code {
          Some(code) => format!("{}={}", c.name, code),
          None => format!("{}=unknown", c.name),
        })
        .collect();
      println!("  Step {}: {}", step_idx + 1, exit_codes.join(", "));
      if let Some(duration) = step.duration() {
        println!("    took {}s", duration.num_seconds());
      }
      for line in step.output.lines() {
        println!("    | {line}");
      }
    }
  }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  let mut args = std::env::args().skip(1);
  let path = args.next().ok_or("usage: run_pipeline <pipeline.yaml> [namespace]")?;
  let namespace = args.next().unwrap_or_else(|| "automation".to_string());

  let config = PipelineConfiguration::decode(File::open(&path)?)?;
  info!(stages = config.stages.len(), steps = config.step_count(), "Loaded pipeline from {}", path);

  let client = connect().await?;
  let orchestrator = Orchestrator::new(Arc::new(KubernetesScheduler::new(client, namespace)));

  match orchestrator.execute(&config).await {
    Ok(result) => {
      print_result(&result);
      info!(succeeded = result.did_succeed(), "Pipeline finished.");
    }
    Err(Aborted { partial, error }) => {
      print_result(&partial);
      error!("{}", error);
      return Err(error.into());
    }
  }

  Ok(())
}
