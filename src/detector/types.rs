// Types shared by the phase tracker, champion detector and service

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gameflow phase as reported by `/lol-gameflow/v1/session`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
  None,
  Lobby,
  Matchmaking,
  CheckedIntoTournament,
  ReadyCheck,
  ChampSelect,
  GameStart,
  FailedToLaunch,
  InProgress,
  Reconnect,
  WaitingForStats,
  PreEndOfGame,
  EndOfGame,
  TerminatedInError,
  Unknown,
}

/// What the detector does with its state in a given phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAction {
  /// Out of game: drop every cached pick.
  Reset,
  /// Read the champ select session.
  ChampSelect,
  /// Read rosters from the gameflow session's `gameData`.
  InGame,
  /// Keep whatever we have.
  Hold,
}

impl GamePhase {
  pub fn from_lcu(phase: &str) -> Self {
    match phase {
      "None" => Self::None,
      "Lobby" => Self::Lobby,
      "Matchmaking" => Self::Matchmaking,
      "CheckedIntoTournament" => Self::CheckedIntoTournament,
      "ReadyCheck" => Self::ReadyCheck,
      "ChampSelect" => Self::ChampSelect,
      "GameStart" => Self::GameStart,
      "FailedToLaunch" => Self::FailedToLaunch,
      "InProgress" => Self::InProgress,
      "Reconnect" => Self::Reconnect,
      "WaitingForStats" => Self::WaitingForStats,
      "PreEndOfGame" => Self::PreEndOfGame,
      "EndOfGame" => Self::EndOfGame,
      "TerminatedInError" => Self::TerminatedInError,
      _ => Self::Unknown,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::None => "None",
      Self::Lobby => "Lobby",
      Self::Matchmaking => "Matchmaking",
      Self::CheckedIntoTournament => "CheckedIntoTournament",
      Self::ReadyCheck => "ReadyCheck",
      Self::ChampSelect => "ChampSelect",
      Self::GameStart => "GameStart",
      Self::FailedToLaunch => "FailedToLaunch",
      Self::InProgress => "InProgress",
      Self::Reconnect => "Reconnect",
      Self::WaitingForStats => "WaitingForStats",
      Self::PreEndOfGame => "PreEndOfGame",
      Self::EndOfGame => "EndOfGame",
      Self::TerminatedInError => "TerminatedInError",
      Self::Unknown => "Unknown",
    }
  }

  /// Transition table for the detector.
  pub fn action(&self) -> PhaseAction {
    match self {
      Self::None | Self::Lobby => PhaseAction::Reset,
      Self::ChampSelect => PhaseAction::ChampSelect,
      Self::GameStart | Self::InProgress | Self::Reconnect => PhaseAction::InGame,
      Self::Matchmaking
      | Self::CheckedIntoTournament
      | Self::ReadyCheck
      | Self::FailedToLaunch
      | Self::WaitingForStats
      | Self::PreEndOfGame
      | Self::EndOfGame
      | Self::TerminatedInError
      | Self::Unknown => PhaseAction::Hold,
    }
  }
}

impl Default for GamePhase {
  fn default() -> Self {
    Self::None
  }
}

impl fmt::Display for GamePhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
  Top,
  Jungle,
  Middle,
  Bottom,
  Utility,
}

impl Lane {
  /// Parse an LCU position string (`assignedPosition` / `selectedPosition`).
  pub fn from_lcu(position: &str) -> Option<Self> {
    match position.trim().to_ascii_lowercase().as_str() {
      "top" => Some(Self::Top),
      "jungle" => Some(Self::Jungle),
      "middle" | "mid" => Some(Self::Middle),
      "bottom" | "bot" | "adc" => Some(Self::Bottom),
      "utility" | "support" => Some(Self::Utility),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Top => "top",
      Self::Jungle => "jungle",
      Self::Middle => "middle",
      Self::Bottom => "bottom",
      Self::Utility => "utility",
    }
  }
}

impl fmt::Display for Lane {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Same-slot ally/enemy pairing. An empty name means the slot is not known yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupPair {
  pub ally: String,
  pub enemy: String,
}

impl MatchupPair {
  pub fn new(ally: impl Into<String>, enemy: impl Into<String>) -> Self {
    Self {
      ally: ally.into(),
      enemy: enemy.into(),
    }
  }

  pub fn is_complete(&self) -> bool {
    !self.ally.is_empty() && !self.enemy.is_empty()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedChampion {
  pub name: String,
  pub lane: Option<Lane>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueInfo {
  pub queue_id: Option<i64>,
  pub game_mode: Option<String>,
  pub is_aram: bool,
}

/// Result of one detection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detection {
  pub own: Option<DetectedChampion>,
  /// Enemy picks first seen during this pass.
  pub new_enemies: Vec<String>,
  pub pairs: Vec<MatchupPair>,
}

/// Notifications for the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DetectorEvent {
  ConnectionStatusChanged { connected: bool },
  PhaseChanged { from: GamePhase, to: GamePhase },
  ChampionDetected { name: String, lane: Option<Lane> },
  EnemyDetected { name: String },
  MatchupPairsUpdated { pairs: Vec<MatchupPair> },
  QueueDetected(QueueInfo),
}
