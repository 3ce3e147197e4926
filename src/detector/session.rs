// Session and roster extraction helpers

use serde_json::Value;

use super::champion_map::ChampionMap;
use super::types::{Lane, MatchupPair};

pub const TEAM_SIZE: usize = 5;

/// Identity of the local player, used to find our side of an in-game roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalIdentity {
  pub summoner_id: Option<i64>,
  pub puuid: Option<String>,
}

impl LocalIdentity {
  pub fn is_known(&self) -> bool {
    self.summoner_id.is_some() || self.puuid.is_some()
  }

  fn matches(&self, player: &Value) -> bool {
    let by_id = self
      .summoner_id
      .zip(player.get("summonerId").and_then(|v| v.as_i64()))
      .map_or(false, |(mine, theirs)| mine > 0 && mine == theirs);
    let by_puuid = self
      .puuid
      .as_deref()
      .zip(player.get("puuid").and_then(|v| v.as_str()))
      .map_or(false, |(mine, theirs)| !mine.is_empty() && mine == theirs);
    by_id || by_puuid
  }

  /// Identity as reported by a roster entry or `/lol-summoner/v1/current-summoner`.
  pub fn from_player(player: &Value) -> Self {
    Self {
      summoner_id: player
        .get("summonerId")
        .and_then(|v| v.as_i64())
        .filter(|id| *id > 0),
      puuid: player
        .get("puuid")
        .and_then(|v| v.as_str())
        .filter(|p| !p.is_empty())
        .map(str::to_string),
    }
  }
}

pub fn team<'a>(session: &'a Value, pointer: &str) -> Vec<&'a Value> {
  session
    .pointer(pointer)
    .and_then(|v| v.as_array())
    .map(|arr| arr.iter().collect())
    .unwrap_or_default()
}

pub fn champion_id(player: &Value) -> i64 {
  player.get("championId").and_then(|v| v.as_i64()).unwrap_or(0)
}

/// Lane from `assignedPosition` (champ select) or `selectedPosition` (in game).
pub fn lane_of(player: &Value) -> Option<Lane> {
  ["assignedPosition", "selectedPosition"]
    .iter()
    .filter_map(|key| player.get(*key).and_then(|v| v.as_str()))
    .find_map(Lane::from_lcu)
}

fn has_full_lanes(team: &[&Value]) -> bool {
  !team.is_empty() && team.iter().all(|p| lane_of(p).is_some())
}

/// Order both teams top..utility when every player on both sides has a known
/// lane. Otherwise both keep roster order, so slots still line up by index.
pub fn lane_order<'a>(
  mut allies: Vec<&'a Value>,
  mut enemies: Vec<&'a Value>,
) -> (Vec<&'a Value>, Vec<&'a Value>) {
  if has_full_lanes(&allies) && has_full_lanes(&enemies) {
    allies.sort_by_key(|p| lane_of(p));
    enemies.sort_by_key(|p| lane_of(p));
  }
  (allies, enemies)
}

/// The `myTeam` entry whose `cellId` equals `localPlayerCellId`.
pub fn local_player(session: &Value) -> Option<&Value> {
  let local_cell = session.get("localPlayerCellId").and_then(|v| v.as_i64())?;
  team(session, "/myTeam")
    .into_iter()
    .find(|p| p.get("cellId").and_then(|v| v.as_i64()) == Some(local_cell))
}

/// Named enemy picks from champ select, roster order.
pub fn enemy_picks(session: &Value, champions: &ChampionMap) -> Vec<String> {
  team(session, "/theirTeam")
    .into_iter()
    .map(|p| champions.name_or_empty(champion_id(p)))
    .filter(|name| !name.is_empty())
    .collect()
}

fn slot_name(team: &[&Value], index: usize, champions: &ChampionMap) -> String {
  team
    .get(index)
    .map(|p| champions.name_or_empty(champion_id(p)))
    .unwrap_or_default()
}

fn pair_up(
  allies: &[&Value],
  enemies: &[&Value],
  champions: &ChampionMap,
  min_len: usize,
) -> Vec<MatchupPair> {
  let len = allies.len().max(enemies.len()).max(min_len);
  (0..len)
    .map(|i| {
      MatchupPair::new(
        slot_name(allies, i, champions),
        slot_name(enemies, i, champions),
      )
    })
    .collect()
}

/// Pairs from a champ select session (`myTeam` vs `theirTeam`), as long as the
/// longer roster.
pub fn pairs_from_champ_select(session: &Value, champions: &ChampionMap) -> Vec<MatchupPair> {
  let (allies, enemies) = lane_order(team(session, "/myTeam"), team(session, "/theirTeam"));
  pair_up(&allies, &enemies, champions, 0)
}

/// Pairs from a gameflow session's `gameData.teamOne` / `teamTwo`. Our team is
/// whichever roster contains the local player. Always [`TEAM_SIZE`] pairs when
/// the local player is found, empty otherwise.
pub fn pairs_from_game_data(
  session: Option<&Value>,
  champions: &ChampionMap,
  local: &LocalIdentity,
) -> Vec<MatchupPair> {
  let Some((allies, enemies)) = session.and_then(|s| split_game_teams(s, local)) else {
    return Vec::new();
  };
  let (allies, enemies) = lane_order(allies, enemies);
  let mut pairs = pair_up(&allies, &enemies, champions, TEAM_SIZE);
  pairs.truncate(TEAM_SIZE);
  pairs
}

/// Our own roster entry in `gameData`.
pub fn game_data_player<'a>(session: &'a Value, local: &LocalIdentity) -> Option<&'a Value> {
  let (allies, _) = split_game_teams(session, local)?;
  allies.into_iter().find(|p| local.matches(p))
}

fn split_game_teams<'a>(session: &'a Value, local: &LocalIdentity) -> Option<(Vec<&'a Value>, Vec<&'a Value>)> {
  if !local.is_known() {
    return None;
  }
  let team_one = team(session, "/gameData/teamOne");
  let team_two = team(session, "/gameData/teamTwo");

  if team_one.iter().any(|p| local.matches(p)) {
    Some((team_one, team_two))
  } else if team_two.iter().any(|p| local.matches(p)) {
    Some((team_two, team_one))
  } else {
    None
  }
}
