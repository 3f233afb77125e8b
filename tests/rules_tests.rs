//! Eight-ball adjudication scenarios.
//!
//! These drive `diff`, `RuleEvaluator` and `MatchState` through the public
//! API only, from snapshots as the camera would report them.

use billiard_table::core::{BallGroup, BallId, BallSnapshot, GameRng, PlayerId, Position, TableConfig, Token};
use billiard_table::error::RuleError;
use billiard_table::rules::{diff, MatchOutcome, MatchState, Phase, PlayerRecord, Rule, RuleEvaluator, Turn};
use proptest::prelude::*;

fn rack_without(missing: &[u8]) -> BallSnapshot {
    let mut snapshot = BallSnapshot::full_rack();
    for n in missing {
        snapshot.remove(&BallId::Numbered(*n));
    }
    snapshot
}

fn record(group: Option<BallGroup>, remaining: u8) -> PlayerRecord {
    let mut record = PlayerRecord::new("Ada", "Blue", Token::new("ada"));
    record.group = group;
    record.remaining = remaining;
    record
}

fn evaluator() -> RuleEvaluator {
    RuleEvaluator::new(&TableConfig::default())
}

// =============================================================================
// Open table
// =============================================================================

/// One solid and one stripe on an open table: no group, shooter continues.
#[test]
fn test_open_table_ambiguous() {
    let report = diff(&BallSnapshot::full_rack(), &rack_without(&[3, 12]));

    let verdict = evaluator().adjudicate(PlayerId::FIRST, &record(None, 7), report, false);

    assert_eq!(verdict.rule, Rule::OpenUndecided);
    assert_eq!(verdict.turn, Turn::Retained);
    assert_eq!(verdict.assigned, None);
}

/// Three solids against one stripe assigns solids to the shooter.
#[test]
fn test_open_table_majority_assigns_group() {
    let report = diff(&BallSnapshot::full_rack(), &rack_without(&[1, 2, 4, 10]));

    let verdict = evaluator().adjudicate(PlayerId::SECOND, &record(None, 7), report, false);

    assert_eq!(verdict.rule, Rule::OpenAssigned);
    assert_eq!(verdict.assigned, Some(BallGroup::Solid));
    assert_eq!(verdict.next_player(), PlayerId::SECOND);
}

/// The eight on an open table is re-racked, not a loss.
#[test]
fn test_open_table_eight_rebreaks() {
    let report = diff(&BallSnapshot::full_rack(), &rack_without(&[8]));

    let verdict = evaluator().adjudicate(PlayerId::FIRST, &record(None, 7), report, false);

    assert_eq!(verdict.rule, Rule::EightOnOpenTable);
    assert!(verdict.rerack);
    assert_eq!(verdict.outcome, None);
    assert_eq!(verdict.next_player(), PlayerId::SECOND);
}

// =============================================================================
// Closed table
// =============================================================================

/// Sinking the last own ball together with the eight loses: the count from
/// before the round decides.
#[test]
fn test_last_ball_and_eight_together_loses() {
    let before = rack_without(&[1, 2, 3, 4, 5, 6]);
    let after = rack_without(&[1, 2, 3, 4, 5, 6, 7, 8]);
    let report = diff(&before, &after);

    let verdict = evaluator().adjudicate(PlayerId::FIRST, &record(Some(BallGroup::Solid), 1), report, false);

    assert_eq!(verdict.rule, Rule::EightOnClosedTable);
    assert_eq!(verdict.outcome, Some(MatchOutcome::Winner(PlayerId::SECOND)));
}

/// The eight after clearing the group wins.
#[test]
fn test_eight_after_clearing_wins() {
    let before = rack_without(&[1, 2, 3, 4, 5, 6, 7]);
    let after = rack_without(&[1, 2, 3, 4, 5, 6, 7, 8]);

    let verdict =
        evaluator().adjudicate(PlayerId::FIRST, &record(Some(BallGroup::Solid), 0), diff(&before, &after), false);

    assert_eq!(verdict.outcome, Some(MatchOutcome::Winner(PlayerId::FIRST)));
}

/// A scratch on a closed table grants the placement region.
#[test]
fn test_closed_scratch_grants_placement() {
    let mut after = rack_without(&[2]);
    after.remove(&BallId::Cue);

    let verdict = evaluator().adjudicate(
        PlayerId::FIRST,
        &record(Some(BallGroup::Solid), 7),
        diff(&BallSnapshot::full_rack(), &after),
        false,
    );

    assert_eq!(verdict.rule, Rule::Scratch);
    assert_eq!(verdict.placement, Some(TableConfig::default().placement_region));
}

// =============================================================================
// Match state
// =============================================================================

fn decided_match() -> MatchState {
    let mut rng = GameRng::new(7);
    let mut game = MatchState::start(("Ada", "Blue"), ("Bob", "Red"), &TableConfig::default(), &mut rng);
    let target = game.shootout().target;
    let shot = |dx: f64| -> BallSnapshot {
        [(BallId::Cue, Position::new(target.x + dx, target.y))].into_iter().collect()
    };
    let (ada, bob) = (
        game.player(PlayerId::FIRST).token.clone(),
        game.player(PlayerId::SECOND).token.clone(),
    );
    game.submit_shootout(&ada, &shot(120.0), &mut rng).unwrap();
    game.submit_shootout(&bob, &shot(15.0), &mut rng).unwrap();
    game
}

/// Bob was closer, breaks, takes stripes, then fouls into Ada's turn.
#[test]
fn test_match_flow() {
    let mut game = decided_match();
    assert_eq!(game.phase(), Phase::OpeningBreak);
    assert_eq!(game.active(), PlayerId::SECOND);
    assert_eq!(game.message(), "Bob may break");

    let bob = game.player(PlayerId::SECOND).token.clone();
    let verdict = game.submit_round(&bob, rack_without(&[9, 10])).unwrap();
    assert_eq!(verdict.assigned, Some(BallGroup::Striped));
    assert_eq!(game.player(PlayerId::FIRST).group, Some(BallGroup::Solid));
    assert_eq!(game.player(PlayerId::SECOND).remaining, 5);

    let verdict = game.submit_round(&bob, rack_without(&[9, 10, 1])).unwrap();
    assert_eq!(verdict.rule, Rule::Foul);
    assert_eq!(game.active(), PlayerId::FIRST);
    assert_eq!(game.rounds().len(), 2);
}

/// A stale token is refused without touching the match.
#[test]
fn test_wrong_seat_is_refused() {
    let mut game = decided_match();
    let ada = game.player(PlayerId::FIRST).token.clone();
    let before = game.last_snapshot().clone();

    let err = game.submit_round(&ada, rack_without(&[1])).unwrap_err();

    assert_eq!(err, RuleError::AuthMismatch);
    assert!(!err.to_string().contains(game.player(PlayerId::SECOND).token.as_str()));
    assert_eq!(game.last_snapshot(), &before);
    assert!(game.rounds().is_empty());
}

/// After the match is over nothing else is accepted.
#[test]
fn test_over_match_refuses_rounds() {
    let mut game = decided_match();
    assert_eq!(game.forfeit(PlayerId::SECOND), MatchOutcome::Forfeit(PlayerId::FIRST));

    assert_eq!(game.play_round(rack_without(&[1])).unwrap_err(), RuleError::MatchOver);
    assert_eq!(game.message(), "Ada has won the game!");
}

// =============================================================================
// Snapshot diff properties
// =============================================================================

fn snapshot_strategy() -> impl Strategy<Value = BallSnapshot> {
    proptest::collection::btree_set(1u8..=16, 0..=16).prop_map(|numbers| {
        numbers
            .into_iter()
            .map(|n| {
                let id = BallId::number(n).unwrap_or(BallId::Cue);
                (id, Position::new(f64::from(n) * 100.0, 500.0))
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn test_diff_of_identical_snapshots_is_zero(snapshot in snapshot_strategy()) {
        let report = diff(&snapshot, &snapshot);

        prop_assert!(!report.white_sunk);
        prop_assert!(!report.eight_sunk);
        prop_assert_eq!(report.sunk_solid + report.sunk_striped, 0);
        prop_assert!(report.sunk.is_empty());
    }

    #[test]
    fn test_diff_partitions_missing_balls(prev in snapshot_strategy(), curr in snapshot_strategy()) {
        let report = diff(&prev, &curr);
        let missing = prev.ids().filter(|id| !curr.contains(id)).count();

        let counted = usize::from(report.white_sunk)
            + usize::from(report.eight_sunk)
            + report.sunk_solid
            + report.sunk_striped;
        prop_assert_eq!(counted, missing);
        prop_assert_eq!(report.sunk.len(), missing);
    }
}
