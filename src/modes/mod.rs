//! Generic game-mode engine.
//!
//! Concrete challenges implement `ModeDefinition` and supply only data:
//! states, handlers, decision maps, scene templates and input forms.
//! `ModeEngine` interprets that table and owns the response, scene and
//! reset plumbing. `history` ranks finished rounds.

pub mod effects;
pub mod input;
pub mod table;
pub mod engine;
pub mod history;

pub use effects::{Cue, EntranceOutcome, ForwardEffects, LocalEffects, Response, Transition};
pub use input::{FieldKind, InputField, InputSpec, ModeInput};
pub use table::{Handler, ModeState, SceneTemplate, TableEntry, TransitionTable};
pub use engine::{ModeContext, ModeDefinition, ModeEngine, TableMode};
pub use history::{history, HistoryRow, HistoryStore, HistoryView, MemoryHistory, TeamScore};
