//! Contract between a table and whatever pairs it with a remote opponent.
//!
//! One coordinator handle serves one table. It remembers the seat and the
//! capability token it was given, so calls carry no identity. Every call is
//! synchronous and may fail with `CoordinatorError`.

use serde::{Deserialize, Serialize};

use crate::core::{BallSnapshot, Region};
use crate::error::CoordinatorError;
use crate::rules::{Assignment, Shootout};

/// Request to open or join a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRequest {
    pub player: String,
    pub team: String,
    /// Table to challenge. `None` opens a game or joins any open one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
}

/// Answer to a game request.
#[derive(Clone, Debug, PartialEq)]
pub enum GameReply {
    /// Nobody is waiting yet; poll for an opponent.
    Opened,
    /// Paired. The break is decided on this shootout.
    Found(Shootout),
}

/// Result of one poll.
#[derive(Clone, Debug, PartialEq)]
pub enum PollStatus<T> {
    /// Nothing happened yet.
    Waiting,
    Advance(T),
    /// The opponent left.
    Gone,
}

/// Who won the break decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakDecision {
    Won,
    Lost,
}

/// Answer to a shootout submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakStatus {
    /// The opponent has not shot yet.
    Pending,
    Decided(BreakDecision),
}

/// What happens after a submitted round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayDecision {
    GoOn,
    Change,
    Won,
    Lost,
}

impl PlayDecision {
    /// Decision string used by the transition table.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GoOn => "go_on",
            Self::Change => "change",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }
}

/// Adjudication of a submitted round, from the submitter's seat.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayReply {
    pub decision: PlayDecision,
    pub message: String,
    /// Balls the submitter may target next.
    pub assignment: Assignment,
}

/// Control came back to this table.
#[derive(Clone, Debug, PartialEq)]
pub enum TurnUpdate {
    /// Rebuild `layout` and play on.
    YourTurn {
        layout: BallSnapshot,
        placement: Option<Region>,
        assignment: Assignment,
        message: String,
    },
    /// The table was cleared; rack and break.
    Rebreak { message: String },
    /// The match ended on the opponent's round.
    Over { won: bool, message: String },
}

/// Remote match coordination.
pub trait MatchCoordinator: Send + Sync {
    fn request_game(&self, request: &GameRequest) -> Result<GameReply, CoordinatorError>;

    /// Wait for an opponent after `GameReply::Opened`.
    fn poll_reply(&self) -> Result<PollStatus<Shootout>, CoordinatorError>;

    fn submit_break(&self, snapshot: &BallSnapshot) -> Result<BreakStatus, CoordinatorError>;

    /// Wait for the opponent's shootout after `BreakStatus::Pending`.
    fn poll_break(&self) -> Result<PollStatus<BreakDecision>, CoordinatorError>;

    fn submit_play(&self, snapshot: &BallSnapshot) -> Result<PlayReply, CoordinatorError>;

    /// Wait for control to come back.
    fn poll_turn(&self) -> Result<PollStatus<TurnUpdate>, CoordinatorError>;

    /// Leave the game. An opponent still playing wins by forfeit.
    fn abort(&self) -> Result<(), CoordinatorError>;
}
