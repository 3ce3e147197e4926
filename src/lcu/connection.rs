// LCU connection manager: credential discovery, auth and HTTPS requests

use base64::{engine::general_purpose, Engine};
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use super::credentials::{parse_command_line, read_lockfile, LcuCredentials};
use super::process::{ProcessLister, SystemProcesses};
use super::LcuApi;
use crate::config::DetectorConfig;
use crate::error::{LcuError, Result};

pub struct LcuConnectionManager<P = SystemProcesses> {
  processes: P,
  credentials: Option<LcuCredentials>,
  client: reqwest::Client,
  credential_process_names: Vec<String>,
  client_process_names: Vec<String>,
  league_path: Option<PathBuf>,
}

impl LcuConnectionManager<SystemProcesses> {
  pub fn new(config: &DetectorConfig) -> Result<Self> {
    Self::with_processes(config, SystemProcesses)
  }
}

impl<P: ProcessLister> LcuConnectionManager<P> {
  pub fn with_processes(config: &DetectorConfig, processes: P) -> Result<Self> {
    // The client serves a self-signed certificate
    let client = reqwest::Client::builder()
      .danger_accept_invalid_certs(true)
      .timeout(config.request_timeout())
      .connect_timeout(config.request_timeout())
      .pool_max_idle_per_host(2)
      .build()
      .map_err(LcuError::ClientBuild)?;

    info!("[LCU] Connection manager initialized");
    Ok(Self {
      processes,
      credentials: None,
      client,
      credential_process_names: config.credential_process_names.clone(),
      client_process_names: config.client_process_names.clone(),
      league_path: config.league_path.clone(),
    })
  }

  /// Discover credentials and mark the connection as up. A missing client is
  /// not an error, it just returns `false`.
  pub fn connect(&mut self) -> bool {
    match self.discover_credentials() {
      Some(creds) => {
        info!("[LCU] Connected to LCU on port {}", creds.port);
        self.credentials = Some(creds);
        true
      }
      None => {
        debug!("[LCU] LoL client not found");
        self.credentials = None;
        false
      }
    }
  }

  pub fn disconnect(&mut self) {
    if self.credentials.take().is_some() {
      info!("[LCU] Disconnected from LCU");
    }
  }

  pub fn is_connected(&self) -> bool {
    self.credentials.is_some()
  }

  pub fn credentials(&self) -> Option<&LcuCredentials> {
    self.credentials.as_ref()
  }

  pub fn is_client_running(&self) -> bool {
    match self.processes.list() {
      Ok(procs) => procs
        .iter()
        .any(|p| p.matches_any(&self.client_process_names)),
      Err(e) => {
        error!("[LCU] Error checking if client is running: {}", e);
        false
      }
    }
  }

  fn discover_credentials(&self) -> Option<LcuCredentials> {
    match self.processes.list() {
      Ok(procs) => {
        let found = procs
          .iter()
          .filter(|p| p.matches_any(&self.credential_process_names))
          .find_map(|p| parse_command_line(&p.cmdline));
        if let Some(creds) = found {
          debug!("[LCU] Found LCU process with port {}", creds.port);
          return Some(creds);
        }
      }
      Err(e) => error!("[LCU] Error getting LCU credentials: {}", e),
    }

    self.league_path.as_deref().and_then(read_lockfile)
  }

  pub fn auth_header(&self) -> Option<String> {
    self.credentials.as_ref().map(|c| basic_auth(&c.token))
  }

  /// GET `endpoint` on the local API. Transport failures drop the connection;
  /// non-200 responses and unparsable bodies only yield `None`.
  pub async fn make_request(&mut self, endpoint: &str) -> Option<Value> {
    let creds = self.credentials.clone()?;
    let url = format!("https://127.0.0.1:{}{}", creds.port, endpoint);

    let resp = match self
      .client
      .get(&url)
      .header(AUTHORIZATION, basic_auth(&creds.token))
      .send()
      .await
    {
      Ok(resp) => resp,
      Err(e) => {
        debug!("[LCU] Request error for {}: {}", endpoint, e);
        self.disconnect();
        return None;
      }
    };

    if resp.status() != StatusCode::OK {
      debug!("[LCU] LCU API returned status {} for {}", resp.status(), endpoint);
      return None;
    }

    let body = match resp.bytes().await {
      Ok(body) => body,
      Err(e) => {
        debug!("[LCU] Failed to read response from {}: {}", endpoint, e);
        self.disconnect();
        return None;
      }
    };

    match serde_json::from_slice(&body) {
      Ok(json) => Some(json),
      Err(e) => {
        warn!("[LCU] Failed to parse response from {}: {}", endpoint, e);
        None
      }
    }
  }
}

impl<P: ProcessLister + Send> LcuApi for LcuConnectionManager<P> {
  fn is_connected(&self) -> bool {
    LcuConnectionManager::is_connected(self)
  }

  fn is_client_running(&self) -> bool {
    LcuConnectionManager::is_client_running(self)
  }

  fn connect(&mut self) -> bool {
    LcuConnectionManager::connect(self)
  }

  async fn get_json(&mut self, endpoint: &str) -> Option<Value> {
    self.make_request(endpoint).await
  }
}

pub fn basic_auth(token: &str) -> String {
  let encoded = general_purpose::STANDARD.encode(format!("riot:{}", token));
  format!("Basic {}", encoded)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::lcu::process::ProcessInfo;

  struct StaticProcesses(Vec<ProcessInfo>);

  impl ProcessLister for StaticProcesses {
    fn list(&self) -> Result<Vec<ProcessInfo>> {
      Ok(self.0.clone())
    }
  }

  struct BrokenProcesses;

  impl ProcessLister for BrokenProcesses {
    fn list(&self) -> Result<Vec<ProcessInfo>> {
      Err(LcuError::ProcessList("access denied".to_string()))
    }
  }

  fn ux_process() -> ProcessInfo {
    ProcessInfo::new(
      "LeagueClientUx.exe",
      "LeagueClientUx.exe --app-port=12345 --remoting-auth-token=test-token-123",
    )
  }

  fn manager<P: ProcessLister>(processes: P) -> LcuConnectionManager<P> {
    LcuConnectionManager::with_processes(&DetectorConfig::default(), processes).unwrap()
  }

  #[test]
  fn connect_reads_credentials_from_process() {
    let mut m = manager(StaticProcesses(vec![ux_process()]));

    assert!(m.connect());
    assert!(m.is_connected());
    let creds = m.credentials().unwrap();
    assert_eq!(creds.port, "12345");
    assert_eq!(creds.token, "test-token-123");
  }

  #[test]
  fn connect_without_process_is_not_an_error() {
    let mut m = manager(StaticProcesses(vec![]));
    assert!(!m.connect());
    assert!(!m.is_connected());
  }

  #[test]
  fn connect_ignores_other_processes_with_flags() {
    let mut m = manager(StaticProcesses(vec![ProcessInfo::new(
      "LeagueClientUxRender.exe",
      "--app-port=1 --remoting-auth-token=nope",
    )]));
    assert!(!m.connect());
  }

  #[test]
  fn connect_falls_back_to_lockfile() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("lockfile"), "LeagueClient:77:50000:lock-token:https").unwrap();
    let config = DetectorConfig {
      league_path: Some(dir.path().to_path_buf()),
      ..DetectorConfig::default()
    };
    let mut m = LcuConnectionManager::with_processes(&config, BrokenProcesses).unwrap();

    assert!(m.connect());
    assert_eq!(m.credentials().unwrap().port, "50000");
  }

  #[test]
  fn client_running_detection() {
    let running = manager(StaticProcesses(vec![ProcessInfo::new("LeagueClient.exe", "")]));
    assert!(running.is_client_running());

    let absent = manager(StaticProcesses(vec![ProcessInfo::new("explorer.exe", "")]));
    assert!(!absent.is_client_running());

    assert!(!manager(BrokenProcesses).is_client_running());
  }

  #[test]
  fn auth_header_encodes_riot_user() {
    assert_eq!(basic_auth("test-password"), "Basic cmlvdDp0ZXN0LXBhc3N3b3Jk");

    let mut m = manager(StaticProcesses(vec![ProcessInfo::new(
      "LeagueClientUx",
      "--app-port=1 --remoting-auth-token=abc123",
    )]));
    assert_eq!(m.auth_header(), None);
    m.connect();
    assert_eq!(m.auth_header().as_deref(), Some("Basic cmlvdDphYmMxMjM="));
  }

  #[tokio::test]
  async fn request_when_not_connected_returns_none() {
    let mut m = manager(StaticProcesses(vec![]));
    assert_eq!(m.make_request("/lol-gameflow/v1/session").await, None);
  }

  #[tokio::test]
  async fn transport_failure_disconnects() {
    let config = DetectorConfig {
      request_timeout_ms: 500,
      ..DetectorConfig::default()
    };
    // Port 1 is not served locally
    let mut m = LcuConnectionManager::with_processes(
      &config,
      StaticProcesses(vec![ProcessInfo::new(
        "LeagueClientUx",
        "--app-port=1 --remoting-auth-token=abc123",
      )]),
    )
    .unwrap();
    assert!(m.connect());

    assert_eq!(m.make_request("/lol-gameflow/v1/session").await, None);
    assert!(!m.is_connected());
  }
}
