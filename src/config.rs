// Detector configuration: stored as JSON, every field optional

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::{LcuError, Result};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 30_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_DATA_DRAGON_URL: &str = "https://ddragon.leagueoflegends.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
  /// Base polling interval while the client is running.
  pub poll_interval_ms: u64,
  /// Upper bound for the backoff interval while the client is absent.
  pub max_backoff_ms: u64,
  pub request_timeout_ms: u64,
  /// Consecutive gameflow failures tolerated while in game before the phase
  /// falls back to `None`.
  pub in_game_failure_tolerance: u32,
  /// Processes whose command line carries `--app-port` / `--remoting-auth-token`.
  pub credential_process_names: Vec<String>,
  /// Processes whose presence means the client is running.
  pub client_process_names: Vec<String>,
  /// League install directory, used for the lockfile fallback.
  pub league_path: Option<PathBuf>,
  pub data_dragon_url: String,
  pub champion_map_retry_secs: u64,
  pub log_level: String,
  pub log_file: Option<PathBuf>,
}

impl Default for DetectorConfig {
  fn default() -> Self {
    Self {
      poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
      max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
      request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
      in_game_failure_tolerance: 3,
      credential_process_names: vec!["LeagueClientUx.exe".into(), "LeagueClientUx".into()],
      client_process_names: vec![
        "LeagueClient.exe".into(),
        "LeagueClientUx.exe".into(),
        "LeagueClient".into(),
        "LeagueClientUx".into(),
      ],
      league_path: None,
      data_dragon_url: DEFAULT_DATA_DRAGON_URL.to_string(),
      champion_map_retry_secs: 60,
      log_level: "info".to_string(),
      log_file: None,
    }
  }
}

/// `<config dir>/lol-viewer/config/config.json`.
pub fn default_config_path() -> PathBuf {
  dirs::config_dir()
    .unwrap_or_else(|| PathBuf::from("."))
    .join("lol-viewer")
    .join("config")
    .join("config.json")
}

impl DetectorConfig {
  /// Load the config from `path`. A missing file yields the defaults, a
  /// malformed one is an error.
  pub fn load(path: &Path) -> Result<Self> {
    if !path.exists() {
      info!(
        "[Config] No config file at {}, using defaults",
        path.display()
      );
      return Ok(Self::default());
    }

    let data = std::fs::read_to_string(path).map_err(|source| LcuError::ConfigIo {
      path: path.to_path_buf(),
      source,
    })?;
    let config: Self = serde_json::from_str(&data).map_err(|source| LcuError::ConfigParse {
      path: path.to_path_buf(),
      source,
    })?;
    config.validate()?;

    info!("[Config] Loaded config from {}", path.display());
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    if self.poll_interval_ms == 0 {
      return Err(LcuError::InvalidConfig(
        "poll_interval_ms must be greater than 0".to_string(),
      ));
    }
    if self.request_timeout_ms == 0 {
      return Err(LcuError::InvalidConfig(
        "request_timeout_ms must be greater than 0".to_string(),
      ));
    }
    if self.max_backoff_ms < self.poll_interval_ms {
      return Err(LcuError::InvalidConfig(format!(
        "max_backoff_ms ({}) must not be below poll_interval_ms ({})",
        self.max_backoff_ms, self.poll_interval_ms
      )));
    }
    Ok(())
  }

  pub fn poll_interval(&self) -> Duration {
    Duration::from_millis(self.poll_interval_ms)
  }

  pub fn max_backoff(&self) -> Duration {
    Duration::from_millis(self.max_backoff_ms)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_millis(self.request_timeout_ms)
  }

  pub fn champion_map_retry(&self) -> Duration {
    Duration::from_secs(self.champion_map_retry_secs)
  }

  /// Where the live log goes: `log_file` when set, otherwise the per-user
  /// default from [`crate::logging::default_log_path`].
  pub fn live_log_path(&self) -> PathBuf {
    self
      .log_file
      .clone()
      .unwrap_or_else(crate::logging::default_log_path)
  }
}
