// Matchup pair lock: once both teams are fully known, stop listening to the API

use tracing::info;

use super::session::TEAM_SIZE;
use super::types::MatchupPair;

#[derive(Debug, Clone, Default)]
pub struct MatchupTracker {
  locked: Option<Vec<MatchupPair>>,
}

impl MatchupTracker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Feed freshly computed pairs. Returns what should be displayed: the locked
  /// pairs if a lock is held, otherwise `pairs` (locking them first when all
  /// ten slots are filled).
  pub fn update(&mut self, pairs: Vec<MatchupPair>) -> Vec<MatchupPair> {
    if let Some(locked) = &self.locked {
      return locked.clone();
    }

    if is_complete(&pairs) {
      let locked: Vec<MatchupPair> = pairs.into_iter().take(TEAM_SIZE).collect();
      info!(
        "[Detector] Matchups complete, locking: {}",
        locked
          .iter()
          .map(|p| format!("{} vs {}", p.ally, p.enemy))
          .collect::<Vec<_>>()
          .join(", ")
      );
      self.locked = Some(locked.clone());
      return locked;
    }

    pairs
  }

  pub fn is_locked(&self) -> bool {
    self.locked.is_some()
  }

  pub fn locked_pairs(&self) -> Option<&[MatchupPair]> {
    self.locked.as_deref()
  }

  pub fn reset(&mut self) {
    if self.locked.take().is_some() {
      info!("[Detector] Matchup lock released");
    }
  }
}

/// Five ally and five enemy slots filled at the same time.
pub fn is_complete(pairs: &[MatchupPair]) -> bool {
  pairs.len() >= TEAM_SIZE && pairs[..TEAM_SIZE].iter().all(MatchupPair::is_complete)
}
