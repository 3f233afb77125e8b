//! Ball snapshots as reported by the vision system.
//!
//! A `BallSnapshot` maps each visible ball to its position. A missing ball
//! is either sunk or occluded; nothing in the crate tries to tell the two
//! apart.
//!
//! ## Wire format
//!
//! Clients send coordinates either as an array or as a keyed mapping. Both
//! are normalized here, so nothing downstream sees the difference:
//!
//! ```
//! use billiard_table::core::{BallId, BallSnapshot};
//!
//! let list: BallSnapshot = serde_json::from_str(
//!     r#"[{"name": "white", "x": 500, "y": 500}, {"name": "3", "x": 900, "y": 400}]"#,
//! ).unwrap();
//! let map: BallSnapshot = serde_json::from_str(
//!     r#"{"white": {"x": 500, "y": 500}, "3": {"name": "3", "x": 900, "y": 400}}"#,
//! ).unwrap();
//!
//! assert_eq!(list, map);
//! assert!(list.contains(&BallId::Cue));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ball::{BallGroup, BallId, Position};

/// Named positions of all balls currently detected on the table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireSnapshot", into = "Vec<WireBall>")]
pub struct BallSnapshot {
    balls: BTreeMap<BallId, Position>,
}

impl BallSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot with every ball of a fresh rack present.
    ///
    /// Positions are irrelevant for diffing; all balls sit at the origin.
    #[must_use]
    pub fn full_rack() -> Self {
        BallId::full_rack().map(|id| (id, Position::default())).collect()
    }

    /// Insert or move a ball. Returns the previous position.
    pub fn insert(&mut self, id: BallId, position: Position) -> Option<Position> {
        self.balls.insert(id, position)
    }

    pub fn remove(&mut self, id: &BallId) -> Option<Position> {
        self.balls.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &BallId) -> Option<Position> {
        self.balls.get(id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: &BallId) -> bool {
        self.balls.contains_key(id)
    }

    /// Cue ball position, if visible.
    #[must_use]
    pub fn cue(&self) -> Option<Position> {
        self.get(&BallId::Cue)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.balls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    /// Iterate over balls in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&BallId, Position)> {
        self.balls.iter().map(|(id, p)| (id, *p))
    }

    pub fn ids(&self) -> impl Iterator<Item = &BallId> {
        self.balls.keys()
    }

    /// Number of visible balls of a group.
    #[must_use]
    pub fn count_group(&self, group: BallGroup) -> usize {
        self.ids().filter(|id| id.group() == Some(group)).count()
    }

    /// Ball closest to `point` and its distance.
    #[must_use]
    pub fn closest_to(&self, point: Position) -> Option<(&BallId, f64)> {
        self.iter()
            .map(|(id, p)| (id, p.distance(point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Compare against a goal layout of named balls.
    ///
    /// Every goal ball must be visible within `tolerance` of its goal position
    /// and no extra balls may be on the table.
    #[must_use]
    pub fn check_layout(&self, goal: &BallSnapshot, tolerance: f64) -> LayoutCheck {
        if self.len() != goal.len() {
            return LayoutCheck {
                matches: false,
                message: "The number of balls is not matching.".to_string(),
                marks: Vec::new(),
            };
        }

        let mut matches = true;
        let marks = self
            .iter()
            .map(|(id, p)| {
                let correct = goal
                    .get(id)
                    .is_some_and(|target| target.distance(p) < tolerance);
                matches &= correct;
                let label = if correct { "correct" } else { "incorrect" };
                (BallId::marker(label), p)
            })
            .collect();

        let message = if matches {
            "Correct positions"
        } else {
            "Please correct the ball positions"
        };
        LayoutCheck {
            matches,
            message: message.to_string(),
            marks,
        }
    }
}

impl FromIterator<(BallId, Position)> for BallSnapshot {
    fn from_iter<I: IntoIterator<Item = (BallId, Position)>>(iter: I) -> Self {
        Self {
            balls: iter.into_iter().collect(),
        }
    }
}

/// Result of [`BallSnapshot::check_layout`].
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutCheck {
    pub matches: bool,
    pub message: String,
    /// Feedback markers (`correct` / `incorrect`) at the real positions.
    pub marks: Vec<(BallId, Position)>,
}

/// One ball in wire format.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireBall {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Deserialize)]
struct WirePoint {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireSnapshot {
    List(Vec<WireBall>),
    Map(BTreeMap<String, WirePoint>),
}

impl From<WireSnapshot> for BallSnapshot {
    fn from(wire: WireSnapshot) -> Self {
        let pairs: Vec<(String, Position)> = match wire {
            WireSnapshot::List(balls) => balls
                .into_iter()
                .map(|b| (b.name, Position::new(b.x, b.y)))
                .collect(),
            WireSnapshot::Map(balls) => balls
                .into_iter()
                .map(|(name, p)| (name, Position::new(p.x, p.y)))
                .collect(),
        };

        let mut snapshot = BallSnapshot::new();
        for (name, position) in pairs {
            let id = BallId::from(name);
            if snapshot.insert(id.clone(), position).is_some() {
                log::warn!("ball {id} reported twice in one snapshot, keeping the last position");
            }
        }
        snapshot
    }
}

impl From<BallSnapshot> for Vec<WireBall> {
    fn from(snapshot: BallSnapshot) -> Self {
        snapshot
            .balls
            .into_iter()
            .map(|(id, p)| WireBall {
                name: id.to_string(),
                x: p.x,
                y: p.y,
            })
            .collect()
    }
}
