//! Error types.
//!
//! - `ConfigError`: malformed table configuration
//! - `RuleError`: a submission the match refuses (wrong token, wrong phase)
//! - `CoordinatorError`: the remote match coordinator failed or refused
//! - `ModeError`: everything `ModeEngine::entrance` can report

use thiserror::Error;

/// Table configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid table configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("table dimensions must be positive, got {width} x {height}")]
    Dimensions { width: f64, height: f64 },

    #[error("ball diameter {0} mm does not fit the table")]
    BallDiameter(f64),
}

/// A match refused a submission. The match state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The presented token is not the active player's. The expected token is
    /// never part of the message.
    #[error("submission rejected: token does not belong to the active player")]
    AuthMismatch,

    #[error("the break has not been decided yet")]
    BreakUndecided,

    #[error("the shootout is already decided")]
    ShootoutClosed,

    #[error("no ball found for the shootout")]
    EmptyShootout,

    #[error("the match is already over")]
    MatchOver,
}

/// The match coordinator could not serve a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error("match coordinator unreachable: {0}")]
    Unreachable(String),

    #[error("match coordinator rejected the request: {0}")]
    Rejected(String),

    /// The match this table joined is over or was replaced.
    #[error("the match is over")]
    Ended,
}

impl From<RuleError> for CoordinatorError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::MatchOver => Self::Ended,
            err => Self::Rejected(err.to_string()),
        }
    }
}

/// Errors surfaced by the mode engine.
#[derive(Debug, Error)]
pub enum ModeError {
    /// A required input field is missing or has the wrong type.
    #[error("missing or invalid input field `{field}`")]
    Protocol { field: String },

    /// A handler returned a decision its state does not map. Programmer error.
    #[error("state `{state}` has no transition for decision `{decision}`")]
    IllegalTransition { state: String, decision: String },

    /// A transition table names a target state it does not define.
    #[error("state `{from}` targets undefined state `{to}`")]
    UnknownTarget { from: String, to: String },

    /// The current state has no table entry.
    #[error("state `{0}` is not in the transition table")]
    UnknownState(String),

    #[error(transparent)]
    Rules(#[from] RuleError),

    /// A match handler ran before a match was started.
    #[error("no match in progress")]
    NoMatch,

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("history store failed: {0}")]
    History(String),
}

impl ModeError {
    pub fn protocol(field: impl Into<String>) -> Self {
        Self::Protocol {
            field: field.into(),
        }
    }

    /// True if the request was at fault (4xx-equivalent) rather than the mode.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Protocol { .. } | Self::Rules(_) | Self::Settings(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_mismatch_message_is_generic() {
        let msg = ModeError::from(RuleError::AuthMismatch).to_string();
        assert_eq!(msg, "submission rejected: token does not belong to the active player");
    }

    #[test]
    fn test_client_errors() {
        assert!(ModeError::protocol("coordinates").is_client_error());
        assert!(ModeError::from(RuleError::MatchOver).is_client_error());
        assert!(!ModeError::IllegalTransition {
            state: "play".into(),
            decision: "bogus".into(),
        }
        .is_client_error());
    }

    #[test]
    fn test_rule_error_into_coordinator_error() {
        let err: CoordinatorError = RuleError::BreakUndecided.into();
        assert_eq!(
            err,
            CoordinatorError::Rejected("the break has not been decided yet".into())
        );
        assert_eq!(CoordinatorError::from(RuleError::MatchOver), CoordinatorError::Ended);
    }
}
