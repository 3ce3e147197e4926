// Live champion select and matchup detection for the League of Legends client

pub mod config;
pub mod detector;
pub mod error;
pub mod lcu;
pub mod logging;
pub mod service;

pub use config::DetectorConfig;
pub use detector::{ChampionDetector, DetectorEvent, GamePhase, MatchupPair};
pub use error::{LcuError, Result};
pub use lcu::{LcuApi, LcuConnectionManager};
pub use service::{ChampionDetectorService, DetectorHandle};
