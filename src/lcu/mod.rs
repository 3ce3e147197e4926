// LCU module - local client discovery and API access

mod connection;
mod credentials;
mod process;

use serde_json::Value;
use std::future::Future;

pub use connection::{basic_auth, LcuConnectionManager};
pub use credentials::{parse_command_line, parse_lockfile, read_lockfile, LcuCredentials};
pub use process::{executable_name, ProcessInfo, ProcessLister, SystemProcesses};

pub const GAMEFLOW_SESSION: &str = "/lol-gameflow/v1/session";
pub const CHAMP_SELECT_SESSION: &str = "/lol-champ-select/v1/session";
pub const CURRENT_SUMMONER: &str = "/lol-summoner/v1/current-summoner";

/// The slice of the local client the detector needs. Implemented by
/// [`LcuConnectionManager`] and by test doubles.
pub trait LcuApi {
  fn is_connected(&self) -> bool;

  fn is_client_running(&self) -> bool;

  /// Try to (re)discover credentials. `false` when the client is not found.
  fn connect(&mut self) -> bool;

  /// `None` covers every failure: not connected, non-200, transport, bad JSON.
  fn get_json(&mut self, endpoint: &str) -> impl Future<Output = Option<Value>> + Send;
}
