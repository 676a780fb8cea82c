use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Endpoint used when no config file overrides it
pub const DEFAULT_URL: &str =
  "https://api.myjson.online/v1/records/6dc50a82-6d2d-4ddd-ac22-709d2c0cb7b5";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  /// Custom title for header (defaults to the endpoint host if not set)
  pub title: Option<String>,
  #[serde(default)]
  pub remote: RemoteConfig,
  #[serde(default)]
  pub database: DatabaseConfig,
  #[serde(default)]
  pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
  #[serde(default = "default_url")]
  pub url: String,
  #[serde(default = "default_timeout_secs")]
  pub connect_timeout_secs: u64,
  #[serde(default = "default_timeout_secs")]
  pub read_timeout_secs: u64,
}

impl Default for RemoteConfig {
  fn default() -> Self {
    Self {
      url: default_url(),
      connect_timeout_secs: default_timeout_secs(),
      read_timeout_secs: default_timeout_secs(),
    }
  }
}

impl RemoteConfig {
  pub fn connect_timeout(&self) -> Duration {
    Duration::from_secs(self.connect_timeout_secs)
  }

  pub fn read_timeout(&self) -> Duration {
    Duration::from_secs(self.read_timeout_secs)
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
  /// Database file (defaults to $XDG_DATA_HOME/roster/persons.db)
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
  #[serde(default = "default_tick_rate_ms")]
  pub tick_rate_ms: u64,
  /// How long a notification stays in the footer
  #[serde(default = "default_notification_secs")]
  pub notification_secs: u64,
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      tick_rate_ms: default_tick_rate_ms(),
      notification_secs: default_notification_secs(),
    }
  }
}

fn default_url() -> String {
  DEFAULT_URL.to_string()
}

fn default_timeout_secs() -> u64 {
  15
}

fn default_tick_rate_ms() -> u64 {
  250
}

fn default_notification_secs() -> u64 {
  3
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./roster.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/roster/config.yaml
  ///
  /// Without any file the built-in defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("roster.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("roster").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    // An empty file is valid and means "all defaults"
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str(contents)?)
  }

  /// Get the optional bearer token from the environment.
  ///
  /// Checks ROSTER_API_TOKEN; an empty value counts as unset.
  pub fn api_token() -> Option<String> {
    std::env::var("ROSTER_API_TOKEN")
      .ok()
      .filter(|token| !token.is_empty())
  }

  /// Header title: explicit title, else the endpoint host.
  pub fn display_title(&self) -> String {
    if let Some(title) = &self.title {
      return title.clone();
    }
    url::Url::parse(&self.remote.url)
      .ok()
      .and_then(|u| u.host_str().map(String::from))
      .unwrap_or_else(|| self.remote.url.clone())
  }
}
