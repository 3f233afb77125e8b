//! Distance challenge: send the ball as far as possible along the table.
//!
//! The ball starts at four fifths of the table length. The player reports
//! how many cushions it hit; the final position then gives the travelled
//! distance, counting two table lengths per pair of cushions.

mod game;

pub use game::{Distance, DistanceStep};
