//! Table configuration.
//!
//! Physical dimensions and the fixed regions used by the match logic:
//! - where a scratched cue ball may be placed
//! - where the shootout cue and target points are drawn from
//!
//! Defaults match the instrumented 2230 × 1115 mm table. Any subset of fields
//! can be overridden from JSON:
//!
//! ```
//! use billiard_table::core::TableConfig;
//!
//! let config = TableConfig::from_json(r#"{"ball_diameter": 52.5}"#).unwrap();
//! assert_eq!(config.ball_diameter, 52.5);
//! assert_eq!(config.width, 2230.0);
//! ```

use serde::{Deserialize, Serialize};

use super::ball::{Position, Region};
use crate::error::ConfigError;

/// Configuration of one physical table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Playing surface width in mm (long rail).
    pub width: f64,

    /// Playing surface height in mm (short rail).
    pub height: f64,

    /// Ball diameter in mm.
    pub ball_diameter: f64,

    /// Where the incoming player places the cue ball after a closed-game scratch.
    pub placement_region: Region,

    /// Region the shootout cue position is drawn from.
    pub shootout_cue: Region,

    /// Region the shootout target marker is drawn from.
    pub shootout_target: Region,

    /// Max distance (mm) a ball may be off its goal position and still count as placed.
    pub placement_tolerance: f64,

    /// Seed for shootout points, coin flips and tokens.
    pub seed: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            width: 2230.0,
            height: 1115.0,
            ball_diameter: 57.0,
            placement_region: Region::new(Position::new(1500.0, 10.0), Position::new(2100.0, 1100.0)),
            shootout_cue: Region::new(Position::new(200.0, 100.0), Position::new(600.0, 1015.0)),
            shootout_target: Region::new(Position::new(1500.0, 100.0), Position::new(2130.0, 1015.0)),
            placement_tolerance: 50.0,
            seed: 42,
        }
    }
}

impl TableConfig {
    /// Parse and validate a (partial) JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that dimensions are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(ConfigError::Dimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.ball_diameter <= 0.0 || self.ball_diameter >= self.height {
            return Err(ConfigError::BallDiameter(self.ball_diameter));
        }
        Ok(())
    }

    /// Centre of the playing surface.
    #[must_use]
    pub fn center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }

    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_ball_diameter(mut self, diameter: f64) -> Self {
        self.ball_diameter = diameter;
        self
    }

    #[must_use]
    pub fn with_placement_region(mut self, region: Region) -> Self {
        self.placement_region = region;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.placement_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
