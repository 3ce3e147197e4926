use std::io;
use std::path::PathBuf;

// Error handling for LCU access, champion data and configuration

#[derive(Debug, thiserror::Error)]
pub enum LcuError {
  #[error("Process enumeration failed: {0}")]
  ProcessList(String),

  #[error("HTTP error for {url}: {source}")]
  Http {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("Failed to build HTTP client: {0}")]
  ClientBuild(#[source] reqwest::Error),

  #[error("HTTP {status} from {url}")]
  Status { status: u16, url: String },

  #[error("Invalid champion data: {0}")]
  ChampionData(String),

  #[error("Failed to read config {path}: {source}")]
  ConfigIo {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to parse config {path}: {source}")]
  ConfigParse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Configuration error: {0}")]
  InvalidConfig(String),

  #[error("IO Error: {0}")]
  Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, LcuError>;
