// Tests for the detector service loop

use std::time::Duration;

use tokio::sync::broadcast::Receiver;
use tokio_util::sync::CancellationToken;

use super::ChampionDetectorService;
use crate::config::DetectorConfig;
use crate::detector::tests::test_helpers::*;
use crate::detector::{DetectorEvent, GamePhase, Lane, MatchupPair};
use crate::lcu::{CHAMP_SELECT_SESSION, GAMEFLOW_SESSION};

fn config(poll_ms: u64, max_ms: u64) -> DetectorConfig {
    DetectorConfig {
        poll_interval_ms: poll_ms,
        max_backoff_ms: max_ms,
        ..DetectorConfig::default()
    }
}

fn service(lcu: MockLcu, config: DetectorConfig) -> ChampionDetectorService<MockLcu> {
    ChampionDetectorService::new(lcu, config)
        .unwrap()
        .with_champion_map(test_champions())
}

fn drain(rx: &mut Receiver<DetectorEvent>) -> Vec<DetectorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Test: Backoff grows while the client is absent and resets once it appears
///
/// Scenario: Three ticks without a client, then the client starts.
/// Expected: 2s, 4s, 4s (capped), then back to the 1s base interval.
#[tokio::test]
async fn test_backoff_until_client_appears() {
    let mut svc = service(MockLcu::offline(), config(1000, 4000));
    let mut rx = svc.subscribe();

    assert_eq!(svc.tick().await, Duration::from_millis(2000));
    assert_eq!(svc.tick().await, Duration::from_millis(4000));
    assert_eq!(svc.tick().await, Duration::from_millis(4000));
    assert_eq!(svc.api_mut().connect_attempts, 0);
    assert!(drain(&mut rx).is_empty());

    svc.api_mut().running = true;
    svc.api_mut().connectable = true;
    assert_eq!(svc.tick().await, Duration::from_millis(1000));
    assert!(svc.is_connected());
    assert_eq!(
        drain(&mut rx),
        vec![DetectorEvent::ConnectionStatusChanged { connected: true }]
    );
}

/// Test: A running client without credentials keeps the base interval
#[tokio::test]
async fn test_running_but_not_connectable() {
    let mut lcu = MockLcu::offline();
    lcu.running = true;
    let mut svc = service(lcu, config(1000, 8000));
    let mut rx = svc.subscribe();

    for _ in 0..3 {
        assert_eq!(svc.tick().await, Duration::from_millis(1000));
    }
    assert_eq!(svc.api_mut().connect_attempts, 3);
    assert!(svc.api_mut().requests.is_empty());
    assert!(drain(&mut rx).is_empty());
}

/// Test: Champ select produces each notification once
///
/// Scenario: Two identical polls of a full 5v5 champ select.
/// Expected: Connection, phase, queue, champion, five enemies and the pairs on
/// the first tick; nothing on the second.
#[tokio::test]
async fn test_champ_select_events_are_deduplicated() {
    let mut svc = service(mock_in_champ_select(full_champ_select()), config(1000, 4000));
    let mut rx = svc.subscribe();

    svc.tick().await;
    let events = drain(&mut rx);

    assert_eq!(
        events[0],
        DetectorEvent::ConnectionStatusChanged { connected: true }
    );
    assert_eq!(
        events[1],
        DetectorEvent::PhaseChanged {
            from: GamePhase::None,
            to: GamePhase::ChampSelect
        }
    );
    assert!(matches!(events[2], DetectorEvent::QueueDetected(_)));
    assert_eq!(
        events[3],
        DetectorEvent::ChampionDetected {
            name: "Ashe".into(),
            lane: Some(Lane::Bottom)
        }
    );
    let enemies: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            DetectorEvent::EnemyDetected { name } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(enemies, vec!["Darius", "Vi", "Zed", "Caitlyn", "Thresh"]);
    match events.last() {
        Some(DetectorEvent::MatchupPairsUpdated { pairs }) => {
            assert_eq!(pairs.len(), 5);
            assert_eq!(pairs[3], MatchupPair::new("Ashe", "Caitlyn"));
        }
        other => panic!("expected pairs update, got {:?}", other),
    }

    svc.tick().await;
    assert!(drain(&mut rx).is_empty());
}

/// Test: Clearing the champion is silent, picking it again notifies again
#[tokio::test]
async fn test_champion_cleared_silently() {
    let mut lcu = MockLcu::online();
    lcu
        .script(
            GAMEFLOW_SESSION,
            vec![
                Some(gameflow("ChampSelect")),
                Some(gameflow("Lobby")),
                Some(gameflow("ChampSelect")),
            ],
        )
        .respond(CHAMP_SELECT_SESSION, champ_select(0, &[(0, 22, "")], &[]));
    let mut svc = service(lcu, config(1000, 4000));
    let mut rx = svc.subscribe();

    svc.tick().await;
    drain(&mut rx);

    svc.tick().await;
    let lobby = drain(&mut rx);
    assert!(lobby
        .iter()
        .all(|e| !matches!(e, DetectorEvent::ChampionDetected { .. })));
    assert!(lobby.contains(&DetectorEvent::MatchupPairsUpdated { pairs: vec![] }));

    svc.tick().await;
    assert!(drain(&mut rx).contains(&DetectorEvent::ChampionDetected {
        name: "Ashe".into(),
        lane: None
    }));
}

/// Test: A withdrawn pick is not announced again when the session drops
///
/// Scenario: Ashe is picked, the pick goes back to 0, then one champ select
/// poll fails.
/// Expected: Ashe is announced once, and nothing is announced after that.
#[tokio::test]
async fn test_withdrawn_pick_stays_cleared() {
    let mut lcu = MockLcu::online();
    lcu.respond(GAMEFLOW_SESSION, gameflow("ChampSelect")).script(
        CHAMP_SELECT_SESSION,
        vec![
            Some(champ_select(0, &[(0, 22, "")], &[])),
            Some(champ_select(0, &[(0, 0, "")], &[])),
            None,
        ],
    );
    let mut svc = service(lcu, config(1000, 4000));
    let mut rx = svc.subscribe();

    svc.tick().await;
    assert!(drain(&mut rx).contains(&DetectorEvent::ChampionDetected {
        name: "Ashe".into(),
        lane: None
    }));

    svc.tick().await;
    assert_eq!(svc.detector().current_champion_name(), None);
    drain(&mut rx);

    svc.tick().await;
    let events = drain(&mut rx);
    assert!(events
        .iter()
        .all(|e| !matches!(e, DetectorEvent::ChampionDetected { .. })));
    assert_eq!(svc.detector().current_champion_name(), None);
}

/// Test: Losing the client flips the connection status once
#[tokio::test]
async fn test_disconnect_is_reported() {
    let mut svc = service(MockLcu::online(), config(1000, 4000));
    let mut rx = svc.subscribe();
    svc.tick().await;
    drain(&mut rx);

    svc.api_mut().running = false;
    svc.api_mut().connected = false;
    assert_eq!(svc.tick().await, Duration::from_millis(2000));
    assert_eq!(
        drain(&mut rx),
        vec![DetectorEvent::ConnectionStatusChanged { connected: false }]
    );

    svc.tick().await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_run_stops_on_cancel() {
    let svc = service(MockLcu::offline(), config(10, 20));
    let cancel = CancellationToken::new();
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(2), svc.run(cancel))
        .await
        .expect("run should return once cancelled");
}

/// Test: Handle controls the spawned loop
#[tokio::test]
async fn test_start_and_stop() {
    let mut lcu = MockLcu::online();
    lcu.respond(GAMEFLOW_SESSION, gameflow("Lobby"));
    let handle = service(lcu, config(10, 20)).start();
    let mut rx = handle.subscribe();

    let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("an event")
        .expect("channel open");
    assert_eq!(first, DetectorEvent::ConnectionStatusChanged { connected: true });
    let second = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("an event")
        .expect("channel open");
    assert_eq!(
        second,
        DetectorEvent::PhaseChanged {
            from: GamePhase::None,
            to: GamePhase::Lobby
        }
    );
    assert!(handle.is_running());

    handle.stop();
    let running = handle.running.clone();
    tokio::time::timeout(Duration::from_secs(2), handle.join())
        .await
        .expect("loop should stop");
    assert!(!running.load(std::sync::atomic::Ordering::SeqCst));
}
