//! Declarative scene descriptions for the projector overlay.
//!
//! The crate never draws anything. Modes produce a `SceneDescription` and an
//! external renderer turns it into pixels.

pub mod part;
pub mod description;

pub use part::{PartKind, ScenePart};
pub use description::{SceneDescription, SceneUpdate};
