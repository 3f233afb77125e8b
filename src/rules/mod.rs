//! Eight-ball rules.
//!
//! - `report`: pure snapshot diff
//! - `evaluator`: the ordered adjudication policy
//! - `state`: the match that applies verdicts and guards submissions
//! - `shootout`: break decision
//!
//! Nothing here knows about modes, scenes or transport.

pub mod report;
pub mod record;
pub mod outcome;
pub mod evaluator;
pub mod shootout;
pub mod state;

pub use report::{diff, Report};
pub use record::{Assignment, PlayerRecord, Task};
pub use outcome::MatchOutcome;
pub use evaluator::{RoundVerdict, Rule, RuleEvaluator, Turn};
pub use shootout::{generate_shootout, Shootout, SHOOTOUT_MARKER};
pub use state::{MatchArchive, MatchState, Phase, RoundLog, ShootoutProgress};
