//! Precision challenge: one shot, as close to the bullseye as possible.
//!
//! The player starts from one of three lines; closer lines are easier and
//! cost more per millimetre. Score is `-distance * (5 * (1 + 2 * difficulty))`.

mod game;

pub use game::{Precision, PrecisionSettings, PrecisionStep, DIFFICULTIES};
