//! Core table types: balls, snapshots, seats, RNG, configuration.
//!
//! Everything here is independent of game modes and rules. The vision system
//! and the renderer only ever see these types (plus `scene`).

pub mod ball;
pub mod snapshot;
pub mod player;
pub mod rng;
pub mod config;

pub use ball::{BallGroup, BallId, BallKind, Position, Region};
pub use snapshot::{BallSnapshot, LayoutCheck, WireBall};
pub use player::{PlayerId, PlayerMap, Token};
pub use rng::GameRng;
pub use config::TableConfig;
