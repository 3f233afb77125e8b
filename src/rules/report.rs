//! Snapshot diff.

use serde::{Deserialize, Serialize};

use crate::core::{BallGroup, BallId, BallKind, BallSnapshot};

/// What changed between two snapshots.
///
/// Marker balls are ignored on both sides.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub white_sunk: bool,
    pub eight_sunk: bool,
    pub sunk_solid: usize,
    pub sunk_striped: usize,
    /// Solids still visible in the current snapshot.
    pub left_solid: usize,
    /// Stripes still visible in the current snapshot.
    pub left_striped: usize,
    /// Balls present before and missing now.
    pub sunk: Vec<BallId>,
    /// Balls missing before and present now.
    pub appeared: Vec<BallId>,
}

impl Report {
    /// Sunk count for one group.
    #[must_use]
    pub fn sunk_of(&self, group: BallGroup) -> usize {
        match group {
            BallGroup::Solid => self.sunk_solid,
            BallGroup::Striped => self.sunk_striped,
        }
    }

    /// Solids plus stripes sunk.
    #[must_use]
    pub fn sunk_objects(&self) -> usize {
        self.sunk_solid + self.sunk_striped
    }

    /// Nothing disappeared.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.sunk.is_empty()
    }
}

/// Compare two snapshots by their key sets. Positions are ignored.
#[must_use]
pub fn diff(prev: &BallSnapshot, curr: &BallSnapshot) -> Report {
    let mut report = Report {
        left_solid: curr.count_group(BallGroup::Solid),
        left_striped: curr.count_group(BallGroup::Striped),
        ..Report::default()
    };

    for id in prev.ids().filter(|id| !id.is_marker() && !curr.contains(id)) {
        match id.kind() {
            BallKind::Cue => report.white_sunk = true,
            BallKind::Eight => report.eight_sunk = true,
            BallKind::Object(BallGroup::Solid) => report.sunk_solid += 1,
            BallKind::Object(BallGroup::Striped) => report.sunk_striped += 1,
            BallKind::Marker => {}
        }
        report.sunk.push(id.clone());
    }

    report.appeared = curr
        .ids()
        .filter(|id| !id.is_marker() && !prev.contains(id))
        .cloned()
        .collect();

    report
}
