// Tests for in-game detection from the gameflow session

use super::test_helpers::*;
use crate::detector::{GamePhase, Lane, LocalIdentity, MatchupPair, TEAM_SIZE};
use crate::lcu::{CHAMP_SELECT_SESSION, CURRENT_SUMMONER, GAMEFLOW_SESSION};
use serde_json::json;

#[cfg(test)]
mod in_game_tests {
    use super::*;

    fn ranked_game() -> serde_json::Value {
        gameflow_in_game(
            "InProgress",
            &[(101, 86), (102, 64), (103, 103), (100, 22), (104, 89)],
            &[(201, 122), (202, 254), (203, 238), (204, 51), (205, 412)],
        )
    }

    fn local_100() -> LocalIdentity {
        LocalIdentity {
            summoner_id: Some(100),
            puuid: None,
        }
    }

    /// Test: In-game pairs come from gameData
    ///
    /// Scenario: We carried our pick over from champ select and the game started.
    /// Expected: Five pairs in roster order, no enemy announcements, own kept.
    #[tokio::test]
    async fn test_in_progress_uses_game_data() {
        let mut lcu = MockLcu::online();
        lcu.respond(GAMEFLOW_SESSION, ranked_game());
        let mut detector = test_detector();
        detector.set_local_identity(local_100());
        detector.set_current_champion("Ashe", Some(Lane::Bottom));

        let detection = detector.detect_champion_and_enemies(&mut lcu).await;

        assert_eq!(detector.current_phase(), GamePhase::InProgress);
        let own = detection.own.expect("own champion");
        assert_eq!(own.name, "Ashe");
        assert_eq!(own.lane, Some(Lane::Bottom));
        assert!(detection.new_enemies.is_empty());
        assert_eq!(detection.pairs.len(), TEAM_SIZE);
        assert_eq!(detection.pairs[0], MatchupPair::new("Garen", "Darius"));
        assert_eq!(detection.pairs[3], MatchupPair::new("Ashe", "Caitlyn"));
        assert!(detector.is_matchup_locked());
        assert_eq!(lcu.request_count(CHAMP_SELECT_SESSION), 0);
        assert_eq!(lcu.request_count(CURRENT_SUMMONER), 0);
    }

    /// Test: Our side is whichever team contains the local player
    #[tokio::test]
    async fn test_local_player_on_team_two() {
        let mut lcu = MockLcu::online();
        lcu.respond(
            GAMEFLOW_SESSION,
            gameflow_in_game("InProgress", &[(200, 51)], &[(100, 22)]),
        );
        let mut detector = test_detector();
        detector.set_local_identity(local_100());

        let detection = detector.detect_champion_and_enemies(&mut lcu).await;

        assert_eq!(detection.pairs.len(), TEAM_SIZE);
        assert_eq!(detection.pairs[0], MatchupPair::new("Ashe", "Caitlyn"));
        assert_eq!(detection.pairs[1], MatchupPair::default());
        assert!(!detector.is_matchup_locked());
    }

    /// Test: Unknown local identity is resolved through current-summoner
    ///
    /// Scenario: The detector started while a game was already running.
    /// Expected: Summoner lookup happens once and our pick is read off the roster.
    #[tokio::test]
    async fn test_started_mid_game() {
        let mut lcu = MockLcu::online();
        lcu
            .respond(GAMEFLOW_SESSION, ranked_game())
            .respond(CURRENT_SUMMONER, json!({ "summonerId": 100, "puuid": "p-100" }));
        let mut detector = test_detector();

        let detection = detector.detect_champion_and_enemies(&mut lcu).await;

        assert_eq!(detector.local_identity().summoner_id, Some(100));
        assert_eq!(detector.current_champion_id(), Some(22));
        assert_eq!(detection.own.map(|c| c.name).as_deref(), Some("Ashe"));
        assert_eq!(detection.pairs[3], MatchupPair::new("Ashe", "Caitlyn"));

        detector.detect_champion_and_enemies(&mut lcu).await;
        assert_eq!(lcu.request_count(CURRENT_SUMMONER), 1);
    }

    /// Test: Without a local identity there is nothing to pair
    #[tokio::test]
    async fn test_unresolved_identity_yields_no_pairs() {
        let mut lcu = MockLcu::online();
        lcu.respond(GAMEFLOW_SESSION, ranked_game());
        let mut detector = test_detector();

        let detection = detector.detect_champion_and_enemies(&mut lcu).await;

        assert_eq!(detection.own, None);
        assert!(detection.pairs.is_empty());
        assert_eq!(lcu.request_count(CURRENT_SUMMONER), 1);
    }

    /// Test: A gameflow hiccup mid-game keeps the champion and pairs
    #[tokio::test]
    async fn test_gameflow_hiccup_keeps_state() {
        let mut lcu = MockLcu::online();
        lcu.script(
            GAMEFLOW_SESSION,
            vec![
                Some(gameflow_in_game("InProgress", &[(100, 22)], &[(200, 51)])),
                None,
            ],
        );
        let mut detector = test_detector();
        detector.set_local_identity(local_100());

        let first = detector.detect_champion_and_enemies(&mut lcu).await;
        let second = detector.detect_champion_and_enemies(&mut lcu).await;

        assert_eq!(detector.current_phase(), GamePhase::InProgress);
        assert_eq!(second.own, first.own);
        assert_eq!(second.pairs, first.pairs);
    }
}
