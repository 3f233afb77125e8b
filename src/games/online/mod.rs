//! Eight-ball against a remote table.
//!
//! The match itself lives behind a `MatchCoordinator`; this table only
//! submits its own rounds and polls while the opponent plays.
//!
//! - `init` requests a game: `wait_reply` until paired, then `determine_break`
//! - the break winner goes to `play`, the loser to `wait_for_other`
//! - `play` loops on `go_on`; `change` hands control to the opponent
//! - `wait_for_other` polls; a handed-back layout is rebuilt in `build_scene`
//! - won, lost, or an opponent who left all end in `finished`
//!
//! Every coordinator failure lands in `error`, which retries from `init`.
//! Waiting states accept `abort`, which notifies the coordinator and
//! finishes.

mod coordinator;
mod game;
mod hub;

pub use coordinator::{
    BreakDecision, BreakStatus, GameReply, GameRequest, MatchCoordinator, PlayDecision, PlayReply, PollStatus,
    TurnUpdate,
};
pub use game::{OnlineGame, OnlineSettings, OnlineStep};
pub use hub::{HubSeat, MatchHub};
