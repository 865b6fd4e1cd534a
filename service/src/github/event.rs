// stagecoach_service/src/github/event.rs

//! The subset of the `pull_request` webhook payload needed to start a run.

use crate::config::AutomationSettings;
use crate::errors::{AppError, Result};
use serde::Deserialize;

pub const EVENT_HEADER: &str = "X-GitHub-Event";

/// Author associations allowed to trigger a run.
pub const TRUSTED_ASSOCIATIONS: [&str; 3] = ["OWNER", "MEMBER", "COLLABORATOR"];

/// Actions that put new code on the pull request.
const TRIGGERING_ACTIONS: [&str; 3] = ["opened", "synchronize", "reopened"];

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
  pub action: String,
  pub number: u64,
  pub pull_request: PullRequest,
  pub repository: Repository,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
  pub head: Head,
  pub author_association: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Head {
  pub sha: String,
  #[serde(rename = "ref")]
  pub ref_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
  pub name: String,
  pub full_name: String,
  pub clone_url: String,
  pub owner: Owner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
  pub login: String,
}

impl PullRequestEvent {
  pub fn from_slice(body: &[u8]) -> Result<Self> {
    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("cannot decode pull request event: {}", e)))
  }

  pub fn is_triggering(&self) -> bool {
    TRIGGERING_ACTIONS.contains(&self.action.as_str())
  }

  /// `github.com/<owner>/<name>`, the form used in the allowed repository list.
  pub fn repository_url(&self) -> String {
    format!("github.com/{}", self.repository.full_name)
  }

  pub fn head_sha(&self) -> &str {
    &self.pull_request.head.sha
  }

  /// The author must be trusted and the repository must be configured.
  pub fn check_permissions(&self, settings: &AutomationSettings) -> Result<()> {
    if !TRUSTED_ASSOCIATIONS.contains(&self.pull_request.author_association.as_str()) {
      return Err(AppError::Permission(format!(
        "event author not one of {}",
        TRUSTED_ASSOCIATIONS.join(", ")
      )));
    }
    if !settings.contains_repository(&self.repository_url()) {
      return Err(AppError::Permission(format!(
        "{} is not a configured repository",
        self.repository.full_name
      )));
    }
    Ok(())
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use serde_json::json;

  pub(crate) fn payload(action: &str, association: &str, full_name: &str) -> serde_json::Value {
    let (owner, name) = full_name.split_once('/').unwrap_or((full_name, full_name));
    json!({
      "action": action,
      "number": 42,
      "sender": { "login": "octocat" },
      "pull_request": {
        "number": 42,
        "author_association": association,
        "head": { "ref": "feature", "sha": "0a1b2c3d4e5f" }
      },
      "repository": {
        "name": name,
        "full_name": full_name,
        "clone_url": format!("https://github.com/{full_name}.git"),
        "owner": { "login": owner }
      }
    })
  }

  fn settings() -> AutomationSettings {
    AutomationSettings {
      repositories: vec!["github.com/acme/widgets".to_string()],
      namespace: "automation".to_string(),
    }
  }

  fn event(action: &str, association: &str, full_name: &str) -> PullRequestEvent {
    PullRequestEvent::from_slice(payload(action, association, full_name).to_string().as_bytes()).unwrap()
  }

  #[test]
  fn decodes_the_fields_needed_for_a_run() {
    let event = event("opened", "MEMBER", "acme/widgets");
    assert_eq!(event.number, 42);
    assert_eq!(event.head_sha(), "0a1b2c3d4e5f");
    assert_eq!(event.pull_request.head.ref_name, "feature");
    assert_eq!(event.repository.owner.login, "acme");
    assert_eq!(event.repository.name, "widgets");
    assert_eq!(event.repository.clone_url, "https://github.com/acme/widgets.git");
    assert_eq!(event.repository_url(), "github.com/acme/widgets");
  }

  #[test]
  fn only_code_changing_actions_trigger() {
    assert!(event("opened", "OWNER", "acme/widgets").is_triggering());
    assert!(event("synchronize", "OWNER", "acme/widgets").is_triggering());
    assert!(event("reopened", "OWNER", "acme/widgets").is_triggering());
    assert!(!event("closed", "OWNER", "acme/widgets").is_triggering());
    assert!(!event("labeled", "OWNER", "acme/widgets").is_triggering());
  }

  #[test]
  fn trusted_authors_of_configured_repositories_pass() {
    for association in TRUSTED_ASSOCIATIONS {
      assert!(event("opened", association, "acme/widgets").check_permissions(&settings()).is_ok());
    }
  }

  #[test]
  fn untrusted_author_is_rejected() {
    let err = event("opened", "CONTRIBUTOR", "acme/widgets")
      .check_permissions(&settings())
      .unwrap_err();
    assert!(matches!(err, AppError::Permission(ref m) if m.contains("OWNER, MEMBER, COLLABORATOR")));
  }

  #[test]
  fn unconfigured_repository_is_rejected() {
    let err = event("opened", "OWNER", "acme/gadgets")
      .check_permissions(&settings())
      .unwrap_err();
    assert!(matches!(err, AppError::Permission(ref m) if m == "acme/gadgets is not a configured repository"));
  }

  #[test]
  fn undecodable_payload_is_a_validation_error() {
    let err = PullRequestEvent::from_slice(b"{\"action\": \"opened\"}").unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
  }
}
