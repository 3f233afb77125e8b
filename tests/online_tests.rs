//! Two tables playing one match through a shared `MatchHub`.

use std::sync::Arc;

use billiard_table::core::{BallId, BallSnapshot, PlayerId, Position, TableConfig};
use billiard_table::games::online::{MatchCoordinator, MatchHub, OnlineGame, OnlineSettings, OnlineStep};
use billiard_table::modes::{Cue, ModeEngine, ModeInput};

fn table(hub: &MatchHub) -> ModeEngine<OnlineGame> {
    let settings = OnlineSettings::default();
    let seat: Arc<dyn MatchCoordinator> = Arc::new(hub.seat());
    ModeEngine::from_mode(OnlineGame::with_coordinator(&settings, seat), settings).unwrap()
}

fn request(name: &str) -> ModeInput {
    ModeInput::new("submit").with_field("player", name).with_field("team", "Team")
}

fn poll() -> ModeInput {
    ModeInput::new("poll")
}

fn submit(snapshot: BallSnapshot) -> ModeInput {
    ModeInput::new("submit").with_coordinates(snapshot)
}

fn rack_without(missing: &[u8]) -> BallSnapshot {
    let mut snapshot = BallSnapshot::full_rack();
    for n in missing {
        snapshot.remove(&BallId::Numbered(*n));
    }
    snapshot
}

fn near_marker(hub: &MatchHub, offset: f64) -> BallSnapshot {
    let target = hub.game().unwrap().unwrap().shootout().target;
    [(BallId::Cue, Position::new(target.x + offset, target.y))]
        .into_iter()
        .collect()
}

/// Pair two tables and decide the break in Ada's favour.
fn paired() -> (MatchHub, ModeEngine<OnlineGame>, ModeEngine<OnlineGame>) {
    let hub = MatchHub::new(TableConfig::default());
    let (mut ada, mut bob) = (table(&hub), table(&hub));

    assert_eq!(ada.entrance(&request("Ada")).unwrap().response.signal, "wait_reply");
    assert_eq!(bob.entrance(&request("Bob")).unwrap().response.signal, "determine_break");
    assert_eq!(ada.entrance(&poll()).unwrap().response.signal, "determine_break");
    assert!(ada.scene().get("shootout").is_some());

    assert_eq!(ada.entrance(&submit(near_marker(&hub, 10.0))).unwrap().response.signal, "await_break");
    assert_eq!(ada.entrance(&poll()).unwrap().response.signal, "await_break");
    assert_eq!(bob.entrance(&submit(near_marker(&hub, 60.0))).unwrap().response.signal, "wait_for_other");
    assert_eq!(ada.entrance(&poll()).unwrap().response.signal, "play");

    (hub, ada, bob)
}

// =============================================================================
// Full match
// =============================================================================

#[test]
fn test_turns_move_between_tables() {
    let (hub, mut ada, mut bob) = paired();
    assert!(ada.scene().get("rack").is_some());
    assert!(!bob.entrance(&poll()).unwrap().changed);

    // Ada takes stripes on the break and keeps the table.
    let out = ada.entrance(&submit(rack_without(&[9, 10]))).unwrap();
    assert_eq!(out.response.signal, "play");
    assert!(ada.scene().get("balls").is_some());

    // A solid is a foul: Bob's turn.
    assert_eq!(ada.entrance(&submit(rack_without(&[9, 10, 1]))).unwrap().response.signal, "wait_for_other");

    let out = bob.entrance(&poll()).unwrap();
    assert_eq!(out.response.signal, "build_scene");
    assert!(bob.scene().get("goal").is_some());

    let layout = hub.game().unwrap().unwrap().last_snapshot().clone();
    assert_eq!(bob.entrance(&submit(layout)).unwrap().response.signal, "play");
    assert_eq!(hub.game().unwrap().unwrap().active(), PlayerId::SECOND);
}

#[test]
fn test_misplaced_ball_keeps_rebuilding() {
    let (_hub, mut ada, mut bob) = paired();
    ada.entrance(&submit(rack_without(&[3]))).unwrap();
    ada.entrance(&submit(rack_without(&[3]))).unwrap();
    bob.entrance(&poll()).unwrap();

    let mut wrong = rack_without(&[3]);
    wrong.insert(BallId::Numbered(5), Position::new(900.0, 300.0));
    let out = bob.entrance(&submit(wrong)).unwrap();

    assert_eq!(out.response.signal, "build_scene");
    assert_eq!(out.sound, Some(Cue::CorrectPositions));
    assert!(bob.scene().get("marks").is_some());
}

#[test]
fn test_abort_during_play_ends_both_tables() {
    let (hub, mut ada, mut bob) = paired();
    ada.entrance(&submit(rack_without(&[]))).unwrap();
    bob.entrance(&poll()).unwrap();
    let layout = hub.game().unwrap().unwrap().last_snapshot().clone();
    bob.entrance(&submit(layout)).unwrap();

    let out = bob.entrance(&ModeInput::new("abort")).unwrap();
    assert!(out.response.is_finished());

    let out = ada.entrance(&poll()).unwrap();
    assert!(out.response.is_finished());
    assert_eq!(out.response.notification.as_deref(), Some("You won!"));
    assert_eq!(out.sound, Some(Cue::Victory));
    assert_eq!(ada.state(), OnlineStep::Finished);
}

/// After an abort both tables can start over and pair again.
#[test]
fn test_rematch_after_abort() {
    let (hub, mut ada, mut bob) = paired();
    assert!(ada.entrance(&ModeInput::new("abort")).unwrap().response.is_finished());
    let out = bob.entrance(&poll()).unwrap();
    assert!(out.response.is_finished());
    assert_eq!(out.response.notification.as_deref(), Some("You won!"));

    ada.entrance(&ModeInput::new("next_try")).unwrap();
    bob.entrance(&ModeInput::new("next_try")).unwrap();

    assert_eq!(ada.entrance(&request("Ada")).unwrap().response.signal, "wait_reply");
    assert_eq!(bob.entrance(&request("Bob")).unwrap().response.signal, "determine_break");
    let game = hub.game().unwrap().unwrap();
    assert!(!game.is_over());
    assert!(game.rounds().is_empty());
}

/// Leaving during the shootout ends the opponent's match too.
#[test]
fn test_abort_during_shootout_finishes_opponent() {
    let hub = MatchHub::new(TableConfig::default());
    let (mut ada, mut bob) = (table(&hub), table(&hub));
    ada.entrance(&request("Ada")).unwrap();
    bob.entrance(&request("Bob")).unwrap();
    ada.entrance(&poll()).unwrap();

    assert!(ada.entrance(&ModeInput::new("abort")).unwrap().response.is_finished());
    let out = bob.entrance(&submit(near_marker(&hub, 10.0))).unwrap();

    assert!(out.response.is_finished());
    assert_eq!(out.response.notification.as_deref(), Some("The opponent left the game"));
    assert_eq!(bob.state(), OnlineStep::Finished);
}

// =============================================================================
// Waiting and failures
// =============================================================================

#[test]
fn test_abort_withdraws_open_request() {
    let hub = MatchHub::new(TableConfig::default());
    let (mut ada, mut bob) = (table(&hub), table(&hub));
    ada.entrance(&request("Ada")).unwrap();

    assert!(ada.entrance(&ModeInput::new("abort")).unwrap().response.is_finished());

    assert_eq!(bob.entrance(&request("Bob")).unwrap().response.signal, "wait_reply");
}

#[test]
fn test_third_table_is_refused() {
    let (hub, _ada, _bob) = paired();
    let mut cy = table(&hub);

    let out = cy.entrance(&request("Cy")).unwrap();

    assert_eq!(out.response.signal, "error");
    assert!(out.response.error.is_some_and(|e| e.contains("already hosts a game")));
    assert_eq!(cy.entrance(&ModeInput::new("retry")).unwrap().response.signal, "init");
}
