//! Scene parts shared by the match modes.

use crate::core::{Position, TableConfig};
use crate::geometry::ShotGeometry;
use crate::rules::{MatchState, Phase};
use crate::scene::{SceneDescription, ScenePart};

/// Where status lines are drawn.
pub const STATUS_POSITION: Position = Position::new(100.0, 100.0);

/// Apex of a fresh rack, on the foot spot.
#[must_use]
pub fn rack_apex(config: &TableConfig) -> Position {
    Position::new(config.width / 4.0, config.height / 2.0)
}

/// Keyed status line.
pub fn status(text: impl Into<String>) -> ScenePart {
    ScenePart::text(text, STATUS_POSITION).with_key("status")
}

/// Everything the table shows for the current phase of a match.
///
/// During play this includes the placement region after a scratch and a shot
/// hint per ball the active player may legally target.
#[must_use]
pub fn match_parts(game: &MatchState, geometry: &ShotGeometry, config: &TableConfig) -> Vec<ScenePart> {
    let mut parts = vec![status(game.message())];
    match game.phase() {
        Phase::DecideBreak => parts.push(game.shootout().scene_part()),
        Phase::OpeningBreak => parts.push(ScenePart::break_rack(rack_apex(config)).with_key("rack")),
        Phase::Play => {
            let snapshot = game.last_snapshot();
            parts.push(ScenePart::snapshot(snapshot).with_key("balls"));
            if let Some(region) = game.placement() {
                parts.push(ScenePart::rectangle(region, false).with_key("placement"));
            }
            let assignment = game.player(game.active()).assignment();
            for shot in geometry.shots(snapshot, |id| assignment.may_target(id)) {
                parts.extend(shot.scene_parts());
            }
        }
        Phase::Over => parts.push(ScenePart::snapshot(game.last_snapshot()).with_key("balls")),
    }
    parts
}

/// `match_parts` as a whole scene.
#[must_use]
pub fn match_scene(game: &MatchState, geometry: &ShotGeometry, config: &TableConfig) -> SceneDescription {
    match_parts(game, geometry, config).into_iter().collect()
}
