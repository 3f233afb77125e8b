//! # billiard-table
//!
//! Game logic for a projector-augmented pool table.
//!
//! A camera reports ball positions as `BallSnapshot`s; the crate adjudicates
//! them and answers with a `SceneDescription` for the projector. Rendering,
//! vision and transport live elsewhere.
//!
//! ## Design Principles
//!
//! 1. **Modes are data**: a mode is a transition table of handlers, decision
//!    maps, scene templates and input forms. `ModeEngine` interprets it.
//!
//! 2. **Failed requests change nothing**: an `entrance` that errors leaves the
//!    mode exactly as it was.
//!
//! 3. **Deterministic by seed**: shootout positions and tie-breaks come from
//!    a seeded `GameRng`.
//!
//! ## Modules
//!
//! - `core`: balls, snapshots, seats, RNG, table configuration
//! - `scene`: declarative overlay parts
//! - `geometry`: shot suggestions
//! - `rules`: eight-ball adjudication and match state
//! - `modes`: the transition-table engine, responses and history ledger
//! - `games`: concrete modes (local and online eight-ball, challenges)
//! - `controller`: per-table routing to modes and the scene sink

pub mod core;
pub mod error;
pub mod scene;
pub mod geometry;
pub mod rules;
pub mod modes;
pub mod games;
pub mod controller;

// Re-export commonly used types
pub use crate::core::{
    BallGroup, BallId, BallKind, BallSnapshot, Position, Region,
    PlayerId, PlayerMap, Token,
    GameRng, TableConfig,
};

pub use crate::error::{ConfigError, CoordinatorError, ModeError, RuleError};

pub use crate::scene::{PartKind, SceneDescription, SceneUpdate, ScenePart};

pub use crate::geometry::{Shot, ShotGeometry};

pub use crate::rules::{
    diff, Report,
    Assignment, PlayerRecord, MatchOutcome,
    RoundVerdict, Rule, RuleEvaluator, Turn,
    MatchState, Phase, ShootoutProgress,
};

pub use crate::modes::{
    Cue, EntranceOutcome, ForwardEffects, LocalEffects, Response, Transition,
    InputField, InputSpec, ModeInput,
    ModeState, TableEntry, TransitionTable,
    ModeContext, ModeDefinition, ModeEngine, TableMode,
    history, HistoryRow, HistoryStore, HistoryView, MemoryHistory,
};

pub use crate::games::{
    ChallengeSet, Distance, LocalGame, MatchCoordinator, MatchHub, OnlineGame, Precision, SingleBreak,
};

pub use crate::controller::{SceneSink, TableController};
