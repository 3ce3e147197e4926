// Credential discovery: client command line first, lockfile as fallback

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

static PORT_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"--app-port=(\d+)").expect("valid port regex"));
static TOKEN_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"--remoting-auth-token=([\w-]+)").expect("valid token regex"));

pub const LOCKFILE_NAMES: [&str; 3] = ["lockfile", "LeagueClientUx.lockfile", "LeagueClient.lockfile"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcuCredentials {
  pub port: String,
  pub token: String,
}

/// Extract `--app-port` and `--remoting-auth-token`. Both must be present.
pub fn parse_command_line(cmdline: &str) -> Option<LcuCredentials> {
  let port = PORT_RE.captures(cmdline)?.get(1)?.as_str();
  let token = TOKEN_RE.captures(cmdline)?.get(1)?.as_str();
  Some(LcuCredentials {
    port: port.to_string(),
    token: token.to_string(),
  })
}

/// Lockfile format: `name:pid:port:password:protocol`.
pub fn parse_lockfile(contents: &str) -> Option<LcuCredentials> {
  let parts: Vec<&str> = contents.trim().split(':').collect();
  if parts.len() < 5 || parts[2].is_empty() || parts[3].is_empty() {
    return None;
  }
  Some(LcuCredentials {
    port: parts[2].to_string(),
    token: parts[3].to_string(),
  })
}

pub fn read_lockfile(league_dir: &Path) -> Option<LcuCredentials> {
  for name in LOCKFILE_NAMES {
    let path = league_dir.join(name);
    if let Ok(content) = std::fs::read_to_string(&path) {
      if let Some(creds) = parse_lockfile(&content) {
        debug!("[LCU] Found lockfile: {}", path.display());
        return Some(creds);
      }
    }
  }
  None
}
