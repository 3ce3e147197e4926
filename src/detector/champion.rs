// Champion, enemy and matchup detection driven by the gameflow phase

use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info};

use super::champion_map::ChampionMap;
use super::matchup::MatchupTracker;
use super::phase::GamePhaseTracker;
use super::session::{
  champion_id, enemy_picks, game_data_player, lane_of, local_player, pairs_from_champ_select,
  pairs_from_game_data, LocalIdentity,
};
use super::types::{DetectedChampion, Detection, GamePhase, Lane, MatchupPair, PhaseAction};
use crate::lcu::{LcuApi, CHAMP_SELECT_SESSION, CURRENT_SUMMONER};

pub struct ChampionDetector {
  phase_tracker: GamePhaseTracker,
  champion_map: ChampionMap,
  current_champion_id: Option<i64>,
  current_champion_name: Option<String>,
  current_lane: Option<Lane>,
  local: LocalIdentity,
  seen_enemies: HashSet<String>,
  matchups: MatchupTracker,
  last_pairs: Vec<MatchupPair>,
  last_phase: GamePhase,
}

impl ChampionDetector {
  pub fn new(phase_tracker: GamePhaseTracker, champion_map: ChampionMap) -> Self {
    info!(
      "[Detector] ChampionDetector initialized with {} champions",
      champion_map.len()
    );
    Self {
      phase_tracker,
      champion_map,
      current_champion_id: None,
      current_champion_name: None,
      current_lane: None,
      local: LocalIdentity::default(),
      seen_enemies: HashSet::new(),
      matchups: MatchupTracker::new(),
      last_pairs: Vec::new(),
      last_phase: GamePhase::None,
    }
  }

  /// Name of our champion, or `None` when nothing is picked yet.
  pub async fn detect_champion<A: LcuApi>(&mut self, api: &mut A) -> Option<String> {
    self.detect_champion_and_enemies(api).await.own.map(|c| c.name)
  }

  /// One detection pass: update the phase, then act on it.
  pub async fn detect_champion_and_enemies<A: LcuApi>(&mut self, api: &mut A) -> Detection {
    let phase = self.phase_tracker.update_phase(api).await;
    let entered = phase != self.last_phase;
    self.last_phase = phase;

    match phase.action() {
      PhaseAction::Reset => {
        if self.current_champion_name.is_some() {
          info!("[Detector] Game ended, resetting champion state");
        }
        self.reset();
        Detection::default()
      }
      PhaseAction::ChampSelect => {
        if entered {
          // Fresh champ select: nothing from an earlier lobby applies
          self.matchups.reset();
          self.seen_enemies.clear();
          self.last_pairs.clear();
        }
        self.detect_in_champ_select(api).await
      }
      PhaseAction::InGame => self.detect_in_game(api).await,
      PhaseAction::Hold => self.held(),
    }
  }

  async fn detect_in_champ_select<A: LcuApi>(&mut self, api: &mut A) -> Detection {
    let Some(session) = api.get_json(CHAMP_SELECT_SESSION).await else {
      debug!("[Detector] Champ select session unavailable this tick");
      return self.held();
    };

    let own = self.read_local_pick(&session);

    let new_enemies: Vec<String> = enemy_picks(&session, &self.champion_map)
      .into_iter()
      .filter(|name| self.seen_enemies.insert(name.clone()))
      .collect();
    if !new_enemies.is_empty() {
      info!("[Detector] New enemy picks: {}", new_enemies.join(", "));
    }

    let pairs = self
      .matchups
      .update(pairs_from_champ_select(&session, &self.champion_map));
    self.last_pairs = pairs.clone();

    Detection {
      own,
      new_enemies,
      pairs,
    }
  }

  fn read_local_pick(&mut self, session: &Value) -> Option<DetectedChampion> {
    let player = local_player(session)?;

    let identity = LocalIdentity::from_player(player);
    if identity.is_known() {
      self.local = identity;
    }
    if let Some(lane) = lane_of(player) {
      self.current_lane = Some(lane);
    }

    let id = champion_id(player);
    if id <= 0 {
      // Pick withdrawn: the lane assignment still holds
      self.current_champion_id = None;
      self.current_champion_name = None;
      return None;
    }
    debug!("[Detector] Found champion ID {} in champ select", id);
    self.current_champion_id = Some(id);
    self.current_champion_name = self.champion_map.name(id).map(str::to_string);

    let own = self.own();
    if let Some(own) = &own {
      debug!("[Detector] Detected champion in champ select: {}", own.name);
    }
    own
  }

  async fn detect_in_game<A: LcuApi>(&mut self, api: &mut A) -> Detection {
    if !self.local.is_known() {
      if let Some(summoner) = api.get_json(CURRENT_SUMMONER).await {
        self.local = LocalIdentity::from_player(&summoner);
        debug!("[Detector] Resolved local summoner: {:?}", self.local);
      }
    }

    let session = self.phase_tracker.last_session();

    // Started mid-game: take our pick from the in-game roster
    if self.current_champion_name.is_none() {
      if let Some(player) = session.and_then(|s| game_data_player(s, &self.local)) {
        let id = champion_id(player);
        if id > 0 {
          self.current_champion_id = Some(id);
          self.current_champion_name = self.champion_map.name(id).map(str::to_string);
          if self.current_lane.is_none() {
            self.current_lane = lane_of(player);
          }
        }
      }
    }

    let computed = pairs_from_game_data(session, &self.champion_map, &self.local);
    let pairs = if computed.is_empty() {
      self
        .matchups
        .locked_pairs()
        .map(<[MatchupPair]>::to_vec)
        .unwrap_or_else(|| self.last_pairs.clone())
    } else {
      self.matchups.update(computed)
    };
    self.last_pairs = pairs.clone();

    Detection {
      own: self.own(),
      new_enemies: Vec::new(),
      pairs,
    }
  }

  fn held(&self) -> Detection {
    Detection {
      own: self.own(),
      new_enemies: Vec::new(),
      pairs: self.last_pairs.clone(),
    }
  }

  fn own(&self) -> Option<DetectedChampion> {
    self
      .current_champion_name
      .clone()
      .map(|name| DetectedChampion {
        name,
        lane: self.current_lane,
      })
  }

  pub fn reset(&mut self) {
    self.current_champion_id = None;
    self.current_champion_name = None;
    self.current_lane = None;
    self.local = LocalIdentity::default();
    self.seen_enemies.clear();
    self.matchups.reset();
    self.last_pairs.clear();
  }

  pub fn current_phase(&self) -> GamePhase {
    self.phase_tracker.current_phase()
  }

  pub fn phase_tracker(&self) -> &GamePhaseTracker {
    &self.phase_tracker
  }

  pub fn champion_map(&self) -> &ChampionMap {
    &self.champion_map
  }

  pub fn set_champion_map(&mut self, champion_map: ChampionMap) {
    self.champion_map = champion_map;
  }

  pub fn current_champion_id(&self) -> Option<i64> {
    self.current_champion_id
  }

  pub fn current_champion_name(&self) -> Option<&str> {
    self.current_champion_name.as_deref()
  }

  pub fn current_lane(&self) -> Option<Lane> {
    self.current_lane
  }

  pub fn local_identity(&self) -> &LocalIdentity {
    &self.local
  }

  pub fn is_matchup_locked(&self) -> bool {
    self.matchups.is_locked()
  }

  #[cfg(test)]
  pub(crate) fn set_current_champion(&mut self, name: &str, lane: Option<Lane>) {
    self.current_champion_name = Some(name.to_string());
    self.current_lane = lane;
  }

  #[cfg(test)]
  pub(crate) fn set_local_identity(&mut self, local: LocalIdentity) {
    self.local = local;
  }
}
