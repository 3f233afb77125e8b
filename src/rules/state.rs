//! Match state.
//!
//! `MatchState` is the only place player records change. Every submission
//! goes through it:
//!
//! 1. `submit_shootout` while the break is being decided
//! 2. `submit_round` once somebody holds the table
//!
//! Rejected submissions never mutate anything.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::evaluator::{RoundVerdict, RuleEvaluator};
use super::outcome::MatchOutcome;
use super::record::{PlayerRecord, Task};
use super::report::diff;
use super::shootout::{generate_shootout, Shootout};
use crate::core::{BallSnapshot, GameRng, PlayerId, PlayerMap, Region, TableConfig, Token};
use crate::error::RuleError;

/// Where a match currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    DecideBreak,
    OpeningBreak,
    Play,
    Over,
}

/// One accepted round.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoundLog {
    pub timestamp: DateTime<Utc>,
    pub verdict: RoundVerdict,
}

/// What is kept of a match once it is over. Tokens are not part of it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchArchive {
    pub players: Vec<PlayerRecord>,
    pub shootout: Shootout,
    pub outcome: MatchOutcome,
    pub rounds: Vec<RoundLog>,
}

/// Progress of the break decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShootoutProgress {
    /// Distance recorded, waiting for the other player.
    Recorded { distance: f64 },
    /// Both have shot; `breaker` opens.
    Decided { distance: f64, breaker: PlayerId },
}

/// A two-player eight-ball match.
#[derive(Clone, Debug, Serialize)]
pub struct MatchState {
    players: PlayerMap<PlayerRecord>,
    active: PlayerId,
    phase: Phase,
    shootout: Shootout,
    last: BallSnapshot,
    placement: Option<Region>,
    rounds: Vec<RoundLog>,
    outcome: Option<MatchOutcome>,
    #[serde(skip)]
    evaluator: RuleEvaluator,
}

impl MatchState {
    #[must_use]
    pub fn new(players: PlayerMap<PlayerRecord>, shootout: Shootout, evaluator: RuleEvaluator) -> Self {
        Self {
            players,
            active: PlayerId::FIRST,
            phase: Phase::DecideBreak,
            shootout,
            last: BallSnapshot::full_rack(),
            placement: None,
            rounds: Vec::new(),
            outcome: None,
            evaluator,
        }
    }

    /// Start a match between two `(name, team)` pairs. Tokens and shootout
    /// points come from `rng`.
    pub fn start(
        first: (impl Into<String>, impl Into<String>),
        second: (impl Into<String>, impl Into<String>),
        config: &TableConfig,
        rng: &mut GameRng,
    ) -> Self {
        let first = PlayerRecord::new(first.0, first.1, rng.token());
        let second = PlayerRecord::new(second.0, second.1, rng.token());
        log::info!("match started: {} vs {}", first.name, second.name);

        let shootout = generate_shootout(config, rng);
        Self::new(PlayerMap::from_pair(first, second), shootout, RuleEvaluator::new(config))
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> &PlayerRecord {
        &self.players[id]
    }

    #[must_use]
    pub fn players(&self) -> &PlayerMap<PlayerRecord> {
        &self.players
    }

    #[must_use]
    pub fn active(&self) -> PlayerId {
        self.active
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn shootout(&self) -> &Shootout {
        &self.shootout
    }

    /// Last accepted snapshot.
    #[must_use]
    pub fn last_snapshot(&self) -> &BallSnapshot {
        &self.last
    }

    /// Placement region granted to the active player, if any.
    #[must_use]
    pub fn placement(&self) -> Option<Region> {
        self.placement
    }

    #[must_use]
    pub fn rounds(&self) -> &[RoundLog] {
        &self.rounds
    }

    #[must_use]
    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }

    /// The match for the ledger. `None` while it is still running.
    #[must_use]
    pub fn archive(&self) -> Option<MatchArchive> {
        let outcome = self.outcome?;
        Some(MatchArchive {
            players: self.players.iter().map(|(_, record)| record.clone()).collect(),
            shootout: self.shootout.clone(),
            outcome,
            rounds: self.rounds.clone(),
        })
    }

    /// Seat owning `token`.
    #[must_use]
    pub fn seat_of(&self, token: &Token) -> Option<PlayerId> {
        self.players.find(|p| &p.token == token)
    }

    /// Record a shootout attempt from the player owning `token`.
    pub fn submit_shootout(
        &mut self,
        token: &Token,
        snapshot: &BallSnapshot,
        rng: &mut GameRng,
    ) -> Result<ShootoutProgress, RuleError> {
        if self.is_over() {
            return Err(RuleError::MatchOver);
        }
        let Some(player) = self.seat_of(token) else {
            log::warn!("shootout submission with unknown token rejected");
            return Err(RuleError::AuthMismatch);
        };
        if self.phase != Phase::DecideBreak {
            return Err(RuleError::ShootoutClosed);
        }

        let distance = self.shootout.record(player, snapshot)?;
        log::debug!("{player} shootout distance {distance} mm");

        match self.shootout.decide(rng) {
            Some(breaker) => {
                self.active = breaker;
                self.phase = Phase::OpeningBreak;
                self.refresh_tasks();
                log::info!("{} breaks", self.players[breaker].name);
                Ok(ShootoutProgress::Decided { distance, breaker })
            }
            None => Ok(ShootoutProgress::Recorded { distance }),
        }
    }

    /// Submit a round on behalf of the player owning `token`.
    pub fn submit_round(&mut self, token: &Token, snapshot: BallSnapshot) -> Result<RoundVerdict, RuleError> {
        self.check_playable()?;
        if &self.players[self.active].token != token {
            log::warn!("round submission for {} rejected: token mismatch", self.active);
            return Err(RuleError::AuthMismatch);
        }
        self.play_round(snapshot)
    }

    /// Adjudicate a round for the active player without authentication.
    ///
    /// Used where the table itself is the only client.
    pub fn play_round(&mut self, snapshot: BallSnapshot) -> Result<RoundVerdict, RuleError> {
        self.check_playable()?;

        let opening = self.phase == Phase::OpeningBreak;
        let report = diff(&self.last, &snapshot);
        if !report.appeared.is_empty() {
            log::warn!(
                "balls reappeared since the last round: {}",
                report.appeared.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
            );
        }

        let shooter = self.active;
        let verdict = self
            .evaluator
            .adjudicate(shooter, &self.players[shooter], report, opening);
        log::debug!("{}", verdict.rationale);

        self.apply(&verdict, snapshot);
        self.rounds.push(RoundLog {
            timestamp: Utc::now(),
            verdict: verdict.clone(),
        });
        Ok(verdict)
    }

    /// The player at `quitter` gives up.
    pub fn forfeit(&mut self, quitter: PlayerId) -> MatchOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        let outcome = MatchOutcome::Forfeit(quitter.other());
        log::info!("{} forfeits", self.players[quitter].name);
        self.finish(outcome);
        outcome
    }

    /// One-line score tracker. The active player's name is upper-cased.
    #[must_use]
    pub fn scoreboard(&self) -> String {
        let name = |id: PlayerId| {
            let name = &self.players[id].name;
            if id == self.active { name.to_uppercase() } else { name.clone() }
        };
        let (a, b) = (&self.players[PlayerId::FIRST], &self.players[PlayerId::SECOND]);

        match (a.group, b.group) {
            (Some(ga), Some(gb)) => format!(
                "{} ({ga}) {}:{} {} ({gb})",
                name(PlayerId::FIRST),
                a.remaining,
                b.remaining,
                name(PlayerId::SECOND)
            ),
            _ => format!("{} : (open) : {}", name(PlayerId::FIRST), name(PlayerId::SECOND)),
        }
    }

    /// Status line for the current phase.
    #[must_use]
    pub fn message(&self) -> String {
        let active = &self.players[self.active].name;
        match self.phase {
            Phase::DecideBreak => "Get as close as possible to the marker".to_string(),
            Phase::OpeningBreak => format!("{active} may break"),
            Phase::Play => self.scoreboard(),
            Phase::Over => match self.outcome {
                Some(outcome) => format!("{} has won the game!", self.players[outcome.winner()].name),
                None => "The game is over".to_string(),
            },
        }
    }

    fn check_playable(&self) -> Result<(), RuleError> {
        match self.phase {
            Phase::Over => Err(RuleError::MatchOver),
            Phase::DecideBreak => Err(RuleError::BreakUndecided),
            Phase::OpeningBreak | Phase::Play => Ok(()),
        }
    }

    fn apply(&mut self, verdict: &RoundVerdict, snapshot: BallSnapshot) {
        let shooter = verdict.shooter;

        if let Some(outcome) = verdict.outcome {
            self.last = snapshot;
            self.finish(outcome);
            return;
        }

        if let Some(group) = verdict.assigned {
            self.players[shooter].group = Some(group);
            self.players[shooter.other()].group = Some(group.other());
            log::info!(
                "{} plays {group}, {} plays {}",
                self.players[shooter].name,
                self.players[shooter.other()].name,
                group.other()
            );
        }

        self.active = verdict.next_player();
        self.placement = verdict.placement;

        if verdict.rerack {
            self.last = BallSnapshot::full_rack();
            self.phase = Phase::OpeningBreak;
        } else {
            self.last = snapshot;
            self.phase = Phase::Play;
        }
        for (_, record) in self.players.iter_mut() {
            record.refresh_remaining(&self.last);
        }
        self.refresh_tasks();
    }

    fn finish(&mut self, outcome: MatchOutcome) {
        self.outcome = Some(outcome);
        self.phase = Phase::Over;
        self.placement = None;
        self.refresh_tasks();
        log::info!("{} wins", self.players[outcome.winner()].name);
    }

    fn refresh_tasks(&mut self) {
        let active = self.active;
        let phase = self.phase;
        for (id, record) in self.players.iter_mut() {
            record.task = match phase {
                Phase::DecideBreak => Task::DecideBreak,
                Phase::Over => Task::Wait,
                _ if id != active => Task::Wait,
                Phase::OpeningBreak => Task::Break,
                Phase::Play => record.play_task(),
            };
        }
    }
}
