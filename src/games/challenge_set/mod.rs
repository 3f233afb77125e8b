//! Attestation: a set of challenges played in any order, handed in once.
//!
//! Every request names an `activity`. `precision` and `break` are forwarded
//! to the child mode of that name; the set itself stays in `init` and only
//! collects finished child scores into fixed slots (five precision shots, one
//! break). When all slots are taken, a new score replaces the lowest one.
//!
//! `hand_in` turns the collected records into an overview of bonus points and
//! finishes with a history package for the configured session.

mod game;
mod slots;

pub use game::{Activity, ChallengeSet, ChallengeSettings, ChallengeStep, Overview};
pub use slots::{ScoreSlots, SlotEntry};
