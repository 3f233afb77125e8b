//! Eight-ball for two players sharing one table.
//!
//! ```text
//! init ──start_shootout──▶ shootout ──break──▶ play ──end──▶ finished
//!                           │    ▲              │  ▲
//!                           └again┘             └continue
//! ```
//!
//! The table itself is the only client, so rounds are adjudicated for
//! whoever holds the table without token checks.

mod game;

pub use game::{LocalGame, LocalSettings, LocalStep};
