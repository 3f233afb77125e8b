//! Ghost-ball shot calculator.

use glam::DVec2;
use smallvec::SmallVec;

use crate::core::{BallGroup, BallId, BallKind, BallSnapshot, Position, TableConfig};
use crate::scene::ScenePart;

/// One suggested shot.
#[derive(Clone, Debug, PartialEq)]
pub struct Shot {
    pub target: BallId,
    pub cue: Position,
    pub target_position: Position,
    pub pocket: Position,
    /// Where the cue ball's centre has to be at contact.
    pub ghost: Position,
    /// Distance of the pocket from the cue→target line.
    pub offset: f64,
}

impl Shot {
    /// Arrow cue→ghost and line target→pocket.
    #[must_use]
    pub fn scene_parts(&self) -> [ScenePart; 2] {
        [
            ScenePart::arrow(self.cue, self.ghost).with_key(format!("shot-{}-cue", self.target)),
            ScenePart::line(self.target_position, self.pocket)
                .with_key(format!("shot-{}-pocket", self.target)),
        ]
    }
}

/// Pocket geometry of one table.
#[derive(Clone, Debug)]
pub struct ShotGeometry {
    pockets: SmallVec<[Position; 6]>,
    ball_diameter: f64,
}

impl ShotGeometry {
    /// Six pockets: corners inset by half a diameter, side pockets centred on
    /// the long rails.
    #[must_use]
    pub fn new(config: &TableConfig) -> Self {
        let (w, h) = (config.width, config.height);
        let d = (config.ball_diameter / 2.0).floor();
        let pockets = [
            Position::new(d, d),
            Position::new((w / 2.0).floor(), 0.0),
            Position::new(w - d, d),
            Position::new(d, h - d),
            Position::new((w / 2.0).floor(), h),
            Position::new(w - d, h - d),
        ];

        Self {
            pockets: SmallVec::from_buf(pockets),
            ball_diameter: config.ball_diameter,
        }
    }

    /// Replace the pocket list.
    #[must_use]
    pub fn with_pockets(mut self, pockets: impl IntoIterator<Item = Position>) -> Self {
        self.pockets = pockets.into_iter().collect();
        self
    }

    #[must_use]
    pub fn pockets(&self) -> &[Position] {
        &self.pockets
    }

    /// Shots for every object ball accepted by `eligible`.
    ///
    /// Obstruction is checked against all other visible balls, markers
    /// included, eligible or not.
    /// Returns nothing when the cue ball is not visible.
    pub fn shots(&self, snapshot: &BallSnapshot, eligible: impl Fn(&BallId) -> bool) -> Vec<Shot> {
        let Some(cue) = snapshot.cue() else {
            log::debug!("no cue ball visible, no shots");
            return Vec::new();
        };

        snapshot
            .iter()
            .filter(|(id, _)| !matches!(id.kind(), BallKind::Cue | BallKind::Marker))
            .filter(|(id, _)| eligible(id))
            .filter_map(|(id, target)| {
                let shot = self.shot_for(snapshot, cue, id, target);
                if shot.is_none() {
                    log::debug!("no unobstructed pocket for ball {id}");
                }
                shot
            })
            .collect()
    }

    /// Shots restricted to a group. `None` allows every object ball.
    pub fn shots_for_group(&self, snapshot: &BallSnapshot, group: Option<BallGroup>) -> Vec<Shot> {
        self.shots(snapshot, |id| group.map_or(true, |g| id.group() == Some(g)))
    }

    /// Best shot for a single target, if any.
    pub fn shot_for(
        &self,
        snapshot: &BallSnapshot,
        cue: Position,
        target_id: &BallId,
        target: Position,
    ) -> Option<Shot> {
        let (cue_v, target_v) = (cue.to_vec(), target.to_vec());
        let u = target_v - cue_v;
        let len_sq = u.length_squared();
        if len_sq == 0.0 {
            return None;
        }

        let mut candidates: SmallVec<[(usize, f64, f64); 6]> = self
            .pockets
            .iter()
            .enumerate()
            .map(|(i, pocket)| {
                let to_pocket = pocket.to_vec() - target_v;
                let lambda = to_pocket.dot(u) / len_sq;
                (i, lambda, (to_pocket - lambda * u).length())
            })
            .collect();
        candidates.sort_by(|a, b| a.2.total_cmp(&b.2));

        for (i, lambda, offset) in candidates {
            if lambda <= 0.0 {
                continue;
            }

            let pocket = self.pockets[i].to_vec();
            let away = target_v - pocket;
            let len = away.length();
            if len == 0.0 {
                continue;
            }
            let ghost = pocket + away * (len + self.ball_diameter) / len;

            if self.obstructed(snapshot, target_id, cue_v, ghost, target_v, pocket) {
                log::debug!("shot on {target_id} via pocket {i} is obstructed");
                continue;
            }

            return Some(Shot {
                target: target_id.clone(),
                cue,
                target_position: target,
                pocket: self.pockets[i],
                ghost: ghost.into(),
                offset,
            });
        }
        None
    }

    fn obstructed(
        &self,
        snapshot: &BallSnapshot,
        target_id: &BallId,
        cue: DVec2,
        ghost: DVec2,
        target: DVec2,
        pocket: DVec2,
    ) -> bool {
        snapshot
            .iter()
            .filter(|(id, _)| *id != target_id && id.kind() != BallKind::Cue)
            .any(|(_, p)| {
                let p = p.to_vec();
                segment_distance(p, cue, ghost) < self.ball_diameter
                    || segment_distance(p, target, pocket) < self.ball_diameter
            })
    }
}

/// Distance from `p` to the segment `a`-`b`.
fn segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + t * ab)
}
