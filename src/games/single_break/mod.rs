//! Break challenge: sink as many balls as possible with one break.
//!
//! Only solids and stripes count; the cue ball and the eight do not.

mod game;

pub use game::{BreakStep, SingleBreak};
