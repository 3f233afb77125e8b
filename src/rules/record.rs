//! Per-player match records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{BallGroup, BallId, BallKind, BallSnapshot, Token};

/// Balls a player is currently allowed to sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assignment {
    /// No group yet.
    Open,
    Group(BallGroup),
    /// Own group cleared; only the eight is left.
    Eight,
}

impl Assignment {
    /// Whether `id` is a legal target under this assignment.
    #[must_use]
    pub fn may_target(self, id: &BallId) -> bool {
        match (self, id.kind()) {
            (_, BallKind::Cue | BallKind::Marker) => false,
            (Self::Open, BallKind::Object(_)) => true,
            (Self::Group(g), BallKind::Object(own)) => g == own,
            (Self::Eight, BallKind::Eight) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::Group(g) => write!(f, "{g}"),
            Self::Eight => f.write_str("eight"),
        }
    }
}

/// What a player is expected to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    DecideBreak,
    Break,
    Wait,
    Play,
    Sink(BallGroup),
    SinkEight,
}

impl Task {
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::DecideBreak => "decide break".to_string(),
            Self::Break => "break".to_string(),
            Self::Wait => "wait".to_string(),
            Self::Play => "play".to_string(),
            Self::Sink(g) => format!("sink {g}"),
            Self::SinkEight => "sink eight".to_string(),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// One player's side of a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub team: String,
    /// Never serialized.
    #[serde(skip, default = "unset_token")]
    pub token: Token,
    pub group: Option<BallGroup>,
    /// Own-group balls still on the table. 7 while the game is open.
    pub remaining: u8,
    pub task: Task,
}

fn unset_token() -> Token {
    Token::new("")
}

impl PlayerRecord {
    pub fn new(name: impl Into<String>, team: impl Into<String>, token: Token) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
            token,
            group: None,
            remaining: 7,
            task: Task::DecideBreak,
        }
    }

    #[must_use]
    pub fn assignment(&self) -> Assignment {
        match self.group {
            None => Assignment::Open,
            Some(_) if self.remaining == 0 => Assignment::Eight,
            Some(g) => Assignment::Group(g),
        }
    }

    /// Recount own balls from a snapshot.
    pub fn refresh_remaining(&mut self, snapshot: &BallSnapshot) {
        self.remaining = match self.group {
            Some(g) => u8::try_from(snapshot.count_group(g)).unwrap_or(u8::MAX).min(7),
            None => 7,
        };
    }

    /// Task while holding the turn during regular play.
    #[must_use]
    pub fn play_task(&self) -> Task {
        match self.assignment() {
            Assignment::Open => Task::Play,
            Assignment::Group(g) => Task::Sink(g),
            Assignment::Eight => Task::SinkEight,
        }
    }
}
