//! Ball identifiers, ball groups and table positions.
//!
//! ## Naming
//!
//! The vision system reports balls by name. Canonical names are:
//! - `"1"`..`"7"`: solids
//! - `"8"` / `"eight"`: the eight ball
//! - `"9"`..`"15"`: stripes
//! - `"16"` / `"white"`: the cue ball
//!
//! Every other name (`"dummy"`, `"17"`, `"correct"`, ...) is a marker ball.
//! Markers are drawn but never counted by adjudication.
//!
//! ```
//! use billiard_table::core::{BallGroup, BallId, BallKind};
//!
//! let eight: BallId = "8".parse().unwrap();
//! assert_eq!(eight, BallId::EIGHT);
//! assert_eq!(eight.to_string(), "eight");
//!
//! let stripe: BallId = "12".parse().unwrap();
//! assert_eq!(stripe.kind(), BallKind::Object(BallGroup::Striped));
//! ```

use std::convert::Infallible;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// One of the two object-ball groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallGroup {
    /// Balls 1-7.
    Solid,
    /// Balls 9-15.
    Striped,
}

impl BallGroup {
    /// The complementary group.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Solid => Self::Striped,
            Self::Striped => Self::Solid,
        }
    }

    /// Ball numbers belonging to this group.
    #[must_use]
    pub const fn numbers(self) -> RangeInclusive<u8> {
        match self {
            Self::Solid => 1..=7,
            Self::Striped => 9..=15,
        }
    }

    /// Lowercase label used in messages and task names.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Striped => "striped",
        }
    }
}

impl fmt::Display for BallGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What role a ball plays in adjudication.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BallKind {
    Cue,
    Eight,
    Object(BallGroup),
    /// Not a real ball (shootout target, placement feedback).
    Marker,
}

/// Identifier of a ball on the table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BallId {
    /// Numbered object ball, 1..=15 (8 is the eight ball).
    Numbered(u8),
    /// The white cue ball.
    Cue,
    /// Any non-canonical name.
    Marker(String),
}

impl BallId {
    /// The eight ball.
    pub const EIGHT: BallId = BallId::Numbered(8);

    /// The cue ball.
    pub const CUE: BallId = BallId::Cue;

    /// Numbered ball, if `n` is in 1..=15.
    #[must_use]
    pub fn number(n: u8) -> Option<Self> {
        (1..=15).contains(&n).then_some(Self::Numbered(n))
    }

    /// Marker ball with a free-form name.
    pub fn marker(name: impl Into<String>) -> Self {
        Self::Marker(name.into())
    }

    /// The fifteen object balls plus the cue ball, as racked for a break.
    pub fn full_rack() -> impl Iterator<Item = BallId> {
        (1..=15).map(BallId::Numbered).chain(std::iter::once(BallId::Cue))
    }

    /// Adjudication role of this ball.
    #[must_use]
    pub fn kind(&self) -> BallKind {
        match self {
            Self::Cue => BallKind::Cue,
            Self::Numbered(8) => BallKind::Eight,
            Self::Numbered(n) if BallGroup::Solid.numbers().contains(n) => {
                BallKind::Object(BallGroup::Solid)
            }
            Self::Numbered(n) if BallGroup::Striped.numbers().contains(n) => {
                BallKind::Object(BallGroup::Striped)
            }
            Self::Numbered(_) | Self::Marker(_) => BallKind::Marker,
        }
    }

    /// Group of this ball, if it is a solid or a stripe.
    #[must_use]
    pub fn group(&self) -> Option<BallGroup> {
        match self.kind() {
            BallKind::Object(group) => Some(group),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_marker(&self) -> bool {
        matches!(self.kind(), BallKind::Marker)
    }
}

impl fmt::Display for BallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cue => f.write_str("white"),
            Self::Numbered(8) => f.write_str("eight"),
            Self::Numbered(n) => write!(f, "{n}"),
            Self::Marker(name) => f.write_str(name),
        }
    }
}

impl FromStr for BallId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Ok(match name {
            "white" | "16" => Self::Cue,
            "eight" | "8" => Self::EIGHT,
            _ => match name.parse::<u8>().ok().and_then(Self::number) {
                Some(id) => id,
                None => Self::Marker(name.to_string()),
            },
        })
    }
}

impl From<String> for BallId {
    fn from(name: String) -> Self {
        match name.parse() {
            Ok(id) => id,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for BallId {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<BallId> for String {
    fn from(id: BallId) -> Self {
        id.to_string()
    }
}

/// Table-relative position in millimetres, origin top-left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in millimetres.
    #[must_use]
    pub fn distance(self, other: Position) -> f64 {
        self.to_vec().distance(other.to_vec())
    }

    #[must_use]
    pub fn to_vec(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

impl From<DVec2> for Position {
    fn from(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Axis-aligned rectangle on the table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub min: Position,
    pub max: Position,
}

impl Region {
    #[must_use]
    pub const fn new(min: Position, max: Position) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, p: Position) -> bool {
        (self.min.x..=self.max.x).contains(&p.x) && (self.min.y..=self.max.y).contains(&p.y)
    }
}
