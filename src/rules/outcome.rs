//! Match outcomes.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// How a finished match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Decided on the table.
    Winner(PlayerId),
    /// The other player aborted.
    Forfeit(PlayerId),
}

impl MatchOutcome {
    #[must_use]
    pub fn winner(self) -> PlayerId {
        match self {
            Self::Winner(p) | Self::Forfeit(p) => p,
        }
    }

    #[must_use]
    pub fn is_winner(self, player: PlayerId) -> bool {
        self.winner() == player
    }
}
