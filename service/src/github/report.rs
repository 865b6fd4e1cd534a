// stagecoach_service/src/github/report.rs

//! Markdown rendering of an execution result for a pull-request comment.

use crate::github::client::CommitState;
use stagecoach::{ContainerResult, ExecutionResult, StepResult};

pub fn commit_state(result: &ExecutionResult) -> CommitState {
  if result.did_succeed() {
    CommitState::Success
  } else {
    CommitState::Failure
  }
}

/// `Result for <sha>: <status>` followed by one section per stage and one
/// collapsible block per step.
pub fn format_report(sha: &str, result: &ExecutionResult) -> String {
  let mut body = format!("Result for {}: {}\n", sha, commit_state(result));

  for (stage_idx, stage) in result.stages.iter().enumerate() {
    body.push_str(&format!("\n### Stage {}\n", stage_idx + 1));
    for (step_idx, step) in stage.steps.iter().enumerate() {
      body.push_str(&format_step(step_idx, step));
    }
  }
  body
}

fn format_step(step_idx: usize, step: &StepResult) -> String {
  let outcome = if step.did_succeed() { "passed" } else { "failed" };
  let mut block = format!("\n<details><summary>Step {} ({})</summary>\n\n", step_idx + 1, outcome);

  for container in &step.init_containers {
    block.push_str(&format!("- init container `{}`: exit code {}\n", container.name, exit_code(container)));
  }
  for container in &step.containers {
    block.push_str(&format!("- container `{}`: exit code {}\n", container.name, exit_code(container)));
  }
  if let Some(duration) = step.duration() {
    block.push_str(&format!("- duration: {}s\n", duration.num_seconds()));
  }

  let fence = if step.output.contains("```") { "````" } else { "```" };
  block.push_str(&format!("\n{fence}\n{}", step.output));
  if !step.output.is_empty() && !step.output.ends_with('\n') {
    block.push('\n');
  }
  block.push_str(&format!("{fence}\n\n</details>\n"));
  block
}

fn exit_code(container: &ContainerResult) -> String {
  container
    .exit_code
    .map(|code| code.to_string())
    .unwrap_or_else(|| "unknown".to_string())
}
