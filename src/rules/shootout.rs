//! Break decision.
//!
//! Both players shoot the cue ball from a random start point towards a random
//! marker. Whoever ends up closer breaks. An exact tie is a coin flip.

use serde::{Deserialize, Serialize};

use crate::core::{BallId, BallSnapshot, GameRng, PlayerId, PlayerMap, Position, TableConfig};
use crate::error::RuleError;
use crate::scene::ScenePart;

/// Marker name the target point is projected as.
pub const SHOOTOUT_MARKER: &str = "17";

/// Reference points and the distances reached so far.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shootout {
    pub cue: Position,
    pub target: Position,
    pub distances: PlayerMap<Option<f64>>,
}

impl Shootout {
    #[must_use]
    pub fn new(cue: Position, target: Position) -> Self {
        Self {
            cue,
            target,
            distances: PlayerMap::with_value(None),
        }
    }

    /// Whether both players have shot.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.distances.iter().all(|(_, d)| d.is_some())
    }

    /// Record a player's attempt. Returns the reached distance in whole mm.
    ///
    /// The attempt is the non-marker ball closest to the target. A player
    /// may retry until both have shot.
    pub fn record(&mut self, player: PlayerId, snapshot: &BallSnapshot) -> Result<f64, RuleError> {
        if self.is_complete() {
            return Err(RuleError::ShootoutClosed);
        }
        let distance = snapshot
            .iter()
            .filter(|(id, _)| !id.is_marker())
            .map(|(_, p)| p.distance(self.target))
            .min_by(f64::total_cmp)
            .ok_or(RuleError::EmptyShootout)?
            .floor();

        self.distances[player] = Some(distance);
        Ok(distance)
    }

    /// Who breaks, once both have shot.
    pub fn decide(&self, rng: &mut GameRng) -> Option<PlayerId> {
        let first = self.distances[PlayerId::FIRST]?;
        let second = self.distances[PlayerId::SECOND]?;

        let breaker = if first < second {
            PlayerId::FIRST
        } else if second < first {
            PlayerId::SECOND
        } else if rng.coin_flip() {
            log::info!("shootout tied at {first} mm, coin flip");
            PlayerId::FIRST
        } else {
            log::info!("shootout tied at {first} mm, coin flip");
            PlayerId::SECOND
        };
        Some(breaker)
    }

    /// Cue ball start and marker, for projection.
    #[must_use]
    pub fn scene_part(&self) -> ScenePart {
        ScenePart::balls([
            (BallId::Cue, self.cue),
            (BallId::marker(SHOOTOUT_MARKER), self.target),
        ])
        .with_key("shootout")
    }
}

/// Draw fresh shootout points from the configured regions.
pub fn generate_shootout(config: &TableConfig, rng: &mut GameRng) -> Shootout {
    let cue = rng.point_in(&config.shootout_cue);
    let target = rng.point_in(&config.shootout_target);
    log::debug!("shootout cue at ({}, {}), target at ({}, {})", cue.x, cue.y, target.x, target.y);
    Shootout::new(cue, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(x: f64, y: f64) -> BallSnapshot {
        [(BallId::Cue, Position::new(x, y))].into_iter().collect()
    }

    #[test]
    fn test_generate_is_inside_regions() {
        let config = TableConfig::default();
        let mut rng = GameRng::new(5);
        let shootout = generate_shootout(&config, &mut rng);

        assert!(config.shootout_cue.contains(shootout.cue));
        assert!(config.shootout_target.contains(shootout.target));
        assert!(!shootout.is_complete());
    }

    #[test]
    fn test_closer_player_breaks() {
        let mut shootout = Shootout::new(Position::new(300.0, 300.0), Position::new(1800.0, 500.0));
        let mut rng = GameRng::new(1);

        assert_eq!(shootout.record(PlayerId::FIRST, &attempt(1800.0, 600.0)), Ok(100.0));
        assert_eq!(shootout.decide(&mut rng), None);
        assert_eq!(shootout.record(PlayerId::SECOND, &attempt(1830.0, 540.0)), Ok(50.0));

        assert_eq!(shootout.decide(&mut rng), Some(PlayerId::SECOND));
        assert_eq!(
            shootout.record(PlayerId::FIRST, &attempt(1800.0, 500.0)),
            Err(RuleError::ShootoutClosed)
        );
    }

    #[test]
    fn test_closest_ball_counts_and_markers_ignored() {
        let mut shootout = Shootout::new(Position::new(300.0, 300.0), Position::new(1000.0, 500.0));
        let snapshot: BallSnapshot = [
            (BallId::Cue, Position::new(1000.0, 900.0)),
            (BallId::Numbered(4), Position::new(1000.0, 700.0)),
            (BallId::marker(SHOOTOUT_MARKER), Position::new(1000.0, 500.0)),
        ]
        .into_iter()
        .collect();

        assert_eq!(shootout.record(PlayerId::FIRST, &snapshot), Ok(200.0));
        assert_eq!(
            shootout.record(PlayerId::SECOND, &BallSnapshot::new()),
            Err(RuleError::EmptyShootout)
        );
    }

    #[test]
    fn test_tie_is_decided_by_seeded_coin() {
        let mut shootout = Shootout::new(Position::new(300.0, 300.0), Position::new(1000.0, 500.0));
        shootout.record(PlayerId::FIRST, &attempt(1000.0, 600.0)).unwrap();
        shootout.record(PlayerId::SECOND, &attempt(1100.0, 500.0)).unwrap();

        let a = shootout.decide(&mut GameRng::new(9));
        let b = shootout.decide(&mut GameRng::new(9));
        assert!(a.is_some());
        assert_eq!(a, b);
    }
}
