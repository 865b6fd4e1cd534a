// stagecoach_service/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::path::Path;

/// Contents of the automation settings file (`STAGECOACH_CONFIG`).
///
/// ```yaml
/// repositories:
///   - github.com/acme/widgets
/// namespace: automation
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AutomationSettings {
  /// Repositories allowed to trigger runs, as `github.com/<owner>/<name>`.
  #[serde(default)]
  pub repositories: Vec<String>,
  /// Namespace every pipeline job is created in.
  #[serde(default = "default_namespace")]
  pub namespace: String,
}

fn default_namespace() -> String {
  "automation".to_string()
}

impl AutomationSettings {
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
      .map_err(|e| AppError::Config(format!("Cannot read settings file '{}': {}", path.display(), e)))?;
    raw.parse()
  }

  pub fn contains_repository(&self, url: &str) -> bool {
    self.repositories.iter().any(|allowed| allowed == url)
  }
}

impl std::str::FromStr for AutomationSettings {
  type Err = AppError;

  fn from_str(raw: &str) -> Result<Self> {
    serde_yaml::from_str(raw).map_err(|e| AppError::Config(format!("Invalid settings file: {}", e)))
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  pub github_api_url: String,
  pub github_api_token: String,
  pub github_webhook_secret: String,

  /// Path of the pipeline document inside the triggering repository.
  pub pipeline_file: String,

  pub settings: AutomationSettings,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let github_api_url = get_env("GITHUB_API_URL")
      .unwrap_or_else(|_| "https://api.github.com".to_string())
      .trim_end_matches('/')
      .to_string();
    let github_api_token = get_env("GITHUB_API_TOKEN")?;
    let github_webhook_secret = get_env("GITHUB_WEBHOOK_SECRET")?;
    let pipeline_file = get_env("PIPELINE_FILE").unwrap_or_else(|_| "automation-config.yaml".to_string());

    let settings_path = get_env("STAGECOACH_CONFIG").unwrap_or_else(|_| "configuration.yaml".to_string());
    let settings = AutomationSettings::load(&settings_path)?;

    tracing::info!(
      settings_path = %settings_path,
      namespace = %settings.namespace,
      repositories = settings.repositories.len(),
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      github_api_url,
      github_api_token,
      github_webhook_secret,
      pipeline_file,
      settings,
    })
  }
}
