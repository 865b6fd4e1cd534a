// stagecoach_service/src/github/client.rs

//! Minimal GitHub REST client: repository contents, commit statuses and
//! pull-request comments.

use crate::errors::{AppError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use tracing::{event, instrument, Level};

/// Context under which every commit status is reported.
pub const STATUS_CONTEXT: &str = "Automation";

/// GitHub limits status descriptions to 140 characters.
const MAX_DESCRIPTION_CHARS: usize = 140;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitState {
  Pending,
  Success,
  Failure,
  Error,
}

impl fmt::Display for CommitState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = match self {
      CommitState::Pending => "pending",
      CommitState::Success => "success",
      CommitState::Failure => "failure",
      CommitState::Error => "error",
    };
    f.write_str(state)
  }
}

#[derive(Deserialize)]
struct ContentResponse {
  content: String,
  #[serde(default)]
  encoding: String,
}

pub struct GithubClient {
  http: reqwest::Client,
  api_url: String,
  token: String,
}

impl GithubClient {
  pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
    let http = reqwest::Client::builder()
      .user_agent(concat!("stagecoach/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self {
      http,
      api_url: api_url.into().trim_end_matches('/').to_string(),
      token: token.into(),
    })
  }

  fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
    self
      .http
      .request(method, format!("{}{}", self.api_url, path))
      .bearer_auth(&self.token)
      .header(reqwest::header::ACCEPT, "application/vnd.github+json")
  }

  /// Raw contents of `path` at `git_ref`.
  #[instrument(name = "GithubClient::fetch_file", skip(self), err(Display))]
  pub async fn fetch_file(&self, owner: &str, repo: &str, path: &str, git_ref: &str) -> Result<Vec<u8>> {
    let response = self
      .request(reqwest::Method::GET, &format!("/repos/{owner}/{repo}/contents/{path}"))
      .query(&[("ref", git_ref)])
      .send()
      .await?
      .error_for_status()?;

    let content: ContentResponse = response.json().await?;
    if content.encoding != "base64" {
      return Err(AppError::GitHub(format!(
        "unexpected encoding '{}' for {}",
        content.encoding, path
      )));
    }
    // GitHub wraps the base64 payload at 60 columns.
    let compact: String = content.content.split_whitespace().collect();
    STANDARD
      .decode(compact)
      .map_err(|e| AppError::GitHub(format!("cannot decode contents of {}: {}", path, e)))
  }

  #[instrument(name = "GithubClient::create_status", skip(self, description), err(Display))]
  pub async fn create_status(
    &self,
    owner: &str,
    repo: &str,
    sha: &str,
    state: CommitState,
    description: &str,
  ) -> Result<()> {
    let description: String = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
    self
      .request(reqwest::Method::POST, &format!("/repos/{owner}/{repo}/statuses/{sha}"))
      .json(&json!({
        "state": state,
        "context": STATUS_CONTEXT,
        "description": description,
      }))
      .send()
      .await?
      .error_for_status()?;
    event!(Level::DEBUG, %state, "Commit status updated.");
    Ok(())
  }

  #[instrument(name = "GithubClient::create_comment", skip(self, body), fields(body_len = body.len()), err(Display))]
  pub async fn create_comment(&self, owner: &str, repo: &str, number: u64, body: &str) -> Result<()> {
    self
      .request(reqwest::Method::POST, &format!("/repos/{owner}/{repo}/issues/{number}/comments"))
      .json(&json!({ "body": body }))
      .send()
      .await?
      .error_for_status()?;
    Ok(())
  }
}
