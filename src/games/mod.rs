//! Concrete table modes.
//!
//! - `local`: eight-ball for two players at one table
//! - `online`: eight-ball against a remote table through a `MatchCoordinator`
//! - `precision`: one shot at a bullseye
//! - `single_break`: sink as many balls as possible in one break
//! - `distance`: place the ball, then send it as far as possible
//! - `challenge_set`: precision and break rounds collected and handed in
//!
//! `board` holds the scene pieces the eight-ball modes share.

pub mod board;
pub mod challenge_set;
pub mod distance;
pub mod local;
pub mod online;
pub mod precision;
pub mod single_break;

pub use challenge_set::{ChallengeSet, ChallengeSettings};
pub use distance::Distance;
pub use local::{LocalGame, LocalSettings};
pub use online::{MatchCoordinator, MatchHub, OnlineGame, OnlineSettings};
pub use precision::{Precision, PrecisionSettings};
pub use single_break::SingleBreak;
