//! Shot suggestions.
//!
//! For every eligible ball, find a pocket lying behind it as seen from the
//! cue ball and the ghost-ball point the cue ball has to reach to send the
//! ball there.
//!
//! ## Pocket choice
//!
//! With `u = target - cue`, each pocket `h` gets
//! - `λ = (h - target)·u / |u|²`, the projection onto the shot line
//! - `d = |h - target - λu|`, its distance from the shot line
//!
//! Pockets are tried by increasing `d`. Pockets with `λ ≤ 0` lie in front of
//! the target and are skipped. A pocket is also skipped when another ball is
//! within one diameter of the cue→ghost or target→pocket segment.

pub mod shot;

pub use shot::{Shot, ShotGeometry};
