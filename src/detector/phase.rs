// Gameflow phase tracking

use serde_json::Value;
use tracing::{debug, info, warn};

use super::types::{GamePhase, QueueInfo};
use crate::lcu::{LcuApi, GAMEFLOW_SESSION};

/// Queue ids that are ARAM even when the game mode string is missing.
pub const ARAM_QUEUE_IDS: [i64; 3] = [100, 450, 720];

#[derive(Debug, Clone)]
pub struct GamePhaseTracker {
  current_phase: GamePhase,
  last_session: Option<Value>,
  consecutive_failures: u32,
  in_game_failure_tolerance: u32,
}

impl GamePhaseTracker {
  pub fn new(in_game_failure_tolerance: u32) -> Self {
    Self {
      current_phase: GamePhase::None,
      last_session: None,
      consecutive_failures: 0,
      in_game_failure_tolerance,
    }
  }

  /// Poll the gameflow session and return the (possibly unchanged) phase.
  ///
  /// A failed poll while in game keeps `InProgress` until the failure
  /// tolerance is exhausted; anywhere else it falls back to `None`.
  pub async fn update_phase<A: LcuApi>(&mut self, api: &mut A) -> GamePhase {
    match api.get_json(GAMEFLOW_SESSION).await {
      Some(session) => {
        self.consecutive_failures = 0;
        let new_phase = session
          .get("phase")
          .and_then(|v| v.as_str())
          .map(GamePhase::from_lcu)
          .unwrap_or(GamePhase::None);
        self.last_session = Some(session);
        self.set_phase(new_phase);
      }
      None => {
        self.consecutive_failures += 1;
        if self.current_phase == GamePhase::InProgress
          && self.consecutive_failures <= self.in_game_failure_tolerance
        {
          warn!(
            "[Phase] Could not get gameflow session while in game ({}/{}), keeping InProgress",
            self.consecutive_failures, self.in_game_failure_tolerance
          );
        } else {
          if self.current_phase != GamePhase::None {
            debug!("[Phase] Could not get gameflow session, assuming None");
          }
          self.set_phase(GamePhase::None);
        }
      }
    }
    self.current_phase
  }

  fn set_phase(&mut self, new_phase: GamePhase) {
    if new_phase != self.current_phase {
      info!(
        "[Phase] Game phase changed: {} -> {}",
        self.current_phase, new_phase
      );
      self.current_phase = new_phase;
    }
  }

  pub fn current_phase(&self) -> GamePhase {
    self.current_phase
  }

  pub fn is_in_champ_select(&self) -> bool {
    self.current_phase == GamePhase::ChampSelect
  }

  pub fn is_in_game(&self) -> bool {
    self.current_phase == GamePhase::InProgress
  }

  /// Last successfully fetched gameflow session.
  pub fn last_session(&self) -> Option<&Value> {
    self.last_session.as_ref()
  }

  pub fn queue_id(&self) -> Option<i64> {
    self
      .last_session
      .as_ref()?
      .pointer("/gameData/queue/id")
      .and_then(|v| v.as_i64())
  }

  pub fn game_mode(&self) -> Option<String> {
    let session = self.last_session.as_ref()?;
    ["/gameData/queue/gameMode", "/map/gameMode"]
      .iter()
      .filter_map(|p| session.pointer(p).and_then(|v| v.as_str()))
      .find(|s| !s.is_empty())
      .map(str::to_string)
  }

  pub fn is_aram(&self) -> bool {
    self.game_mode().as_deref() == Some("ARAM")
      || self.queue_id().map_or(false, |id| ARAM_QUEUE_IDS.contains(&id))
  }

  pub fn queue_info(&self) -> QueueInfo {
    QueueInfo {
      queue_id: self.queue_id(),
      game_mode: self.game_mode(),
      is_aram: self.is_aram(),
    }
  }

  #[cfg(test)]
  pub(crate) fn force_phase(&mut self, phase: GamePhase) {
    self.current_phase = phase;
  }

  #[cfg(test)]
  pub(crate) fn set_last_session(&mut self, session: Option<Value>) {
    self.last_session = session;
  }
}

impl Default for GamePhaseTracker {
  fn default() -> Self {
    Self::new(3)
  }
}
