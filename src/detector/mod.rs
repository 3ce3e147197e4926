// Detector module - phase tracking, champion/enemy detection and matchup pairs

mod champion;
mod champion_map;
mod matchup;
mod phase;
pub mod session;
mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use champion::ChampionDetector;
pub use champion_map::ChampionMap;
pub use matchup::{is_complete, MatchupTracker};
pub use phase::{GamePhaseTracker, ARAM_QUEUE_IDS};
pub use session::{LocalIdentity, TEAM_SIZE};
pub use types::{
  DetectedChampion, Detection, DetectorEvent, GamePhase, Lane, MatchupPair, PhaseAction,
  QueueInfo,
};
