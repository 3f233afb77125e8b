//! Precision mode implementation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{BallId, Position, TableConfig};
use crate::error::ModeError;
use crate::games::board::status;
use crate::modes::{
    ForwardEffects, InputField, InputSpec, LocalEffects, ModeContext, ModeDefinition, ModeInput, ModeState,
    TableEntry, Transition, TransitionTable,
};
use crate::scene::{SceneDescription, ScenePart};

/// Number of start lines.
pub const DIFFICULTIES: u8 = 3;

const SELECTED_WIDTH: f64 = 7.0;
const LINE_WIDTH: f64 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrecisionStep {
    Init,
    Finished,
}

impl ModeState for PrecisionStep {
    const INIT: Self = PrecisionStep::Init;
    const FINISHED: Self = PrecisionStep::Finished;

    fn name(self) -> &'static str {
        match self {
            PrecisionStep::Init => "init",
            PrecisionStep::Finished => "finished",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecisionSettings {
    /// Start line index: 0 is the farthest line, 2 the closest.
    pub difficulty: u8,
    pub table: TableConfig,
}

impl PrecisionSettings {
    /// Points lost per millimetre off the bullseye.
    #[must_use]
    pub fn penalty_factor(&self) -> f64 {
        5.0 * (1.0 + 2.0 * f64::from(self.difficulty))
    }
}

/// Fixed geometry of the challenge.
#[derive(Clone, Debug, PartialEq)]
pub struct Precision {
    bullseye: Position,
    start_lines: [f64; DIFFICULTIES as usize],
    height: f64,
}

impl Precision {
    #[must_use]
    pub fn bullseye(&self) -> Position {
        self.bullseye
    }

    /// Where the cue ball starts for a difficulty.
    #[must_use]
    pub fn start_point(&self, difficulty: u8) -> Position {
        let x = self.start_lines[usize::from(difficulty.min(DIFFICULTIES - 1))];
        Position::new(x, (self.height / 2.0).floor())
    }

    fn line(&self, index: u8, selected: bool) -> ScenePart {
        let x = self.start_lines[usize::from(index)];
        ScenePart::line(Position::new(x, 100.0), Position::new(x, self.height - 100.0))
            .with_width(if selected { SELECTED_WIDTH } else { LINE_WIDTH })
            .with_key(format!("difficulty-{index}"))
    }

    fn start_ball(&self, difficulty: u8) -> ScenePart {
        ScenePart::balls([(BallId::Cue, self.start_point(difficulty))]).with_key("balls-start")
    }

    fn difficulty_parts(&self, difficulty: u8) -> impl Iterator<Item = ScenePart> + '_ {
        (0..DIFFICULTIES)
            .map(move |i| self.line(i, i == difficulty))
            .chain(std::iter::once(self.start_ball(difficulty)))
    }
}

impl ModeDefinition for Precision {
    type State = PrecisionStep;
    type Settings = PrecisionSettings;

    fn new(settings: &PrecisionSettings) -> Self {
        let table = &settings.table;
        Self {
            bullseye: Position::new((table.width / 4.0).floor(), (table.height / 2.0).floor()),
            start_lines: [table.width - 250.0, table.width - 500.0, table.width - 750.0],
            height: table.height,
        }
    }

    fn title() -> &'static str {
        "Precision"
    }

    fn table() -> TransitionTable<Self> {
        TransitionTable::new().with_state(
            PrecisionStep::Init,
            TableEntry::new(measure, layout)
                .on(true, PrecisionStep::Finished)
                .on(false, PrecisionStep::Init)
                .with_input(
                    InputSpec::submit("Measure")
                        .with_field(InputField::select("difficulty", ["0", "1", "2"])),
                ),
        )
    }

    fn apply_settings(
        ctx: &mut ModeContext<Self>,
        input: &ModeInput,
    ) -> Result<(LocalEffects, ForwardEffects), ModeError> {
        let difficulty = input.number("difficulty")?;
        if !(0.0..f64::from(DIFFICULTIES)).contains(&difficulty) {
            return Err(ModeError::protocol("difficulty"));
        }
        let mut settings = ctx.settings().clone();
        settings.difficulty = difficulty as u8;
        let factor = settings.penalty_factor();
        log::debug!("precision difficulty {} (x{factor})", settings.difficulty);

        let local = ctx
            .mode
            .difficulty_parts(settings.difficulty)
            .fold(LocalEffects::default(), LocalEffects::with_part);
        ctx.set_settings(settings);
        Ok((local, ForwardEffects::message(format!("x{factor}"))))
    }
}

fn layout(ctx: &ModeContext<Precision>) -> SceneDescription {
    let mut scene = SceneDescription::new()
        .with(status("Precision Challenge"))
        .with(ScenePart::bullseye(ctx.mode.bullseye, 3).with_key("bullseye"));
    scene.extend(ctx.mode.difficulty_parts(ctx.settings().difficulty));
    scene
}

fn measure(ctx: &mut ModeContext<Precision>, input: &ModeInput) -> Result<Transition, ModeError> {
    let snapshot = input.coordinates()?;
    let Some((_, distance)) = snapshot.closest_to(ctx.mode.bullseye) else {
        return Ok(Transition::neutral()
            .with_part(status("No ball found, try again!"))
            .with_message("No ball found."));
    };

    let settings = ctx.settings();
    let (difficulty, factor) = (settings.difficulty, settings.penalty_factor());
    let whole = distance.floor();

    ctx.score = -distance * factor;
    ctx.message = format!("{whole} mm");
    ctx.record = Map::from_iter([
        ("distance".to_string(), Value::from(whole as i64)),
        ("difficulty".to_string(), Value::from(difficulty)),
    ]);
    Ok(Transition::new(true).with_message(ctx.message.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BallSnapshot;
    use crate::modes::ModeEngine;

    fn shot(x: f64, y: f64) -> ModeInput {
        let snapshot: BallSnapshot = [(BallId::Cue, Position::new(x, y))].into_iter().collect();
        ModeInput::new("submit").with_coordinates(snapshot)
    }

    #[test]
    fn test_geometry() {
        let precision = Precision::new(&PrecisionSettings::default());

        assert_eq!(precision.bullseye(), Position::new(557.0, 557.0));
        assert_eq!(precision.start_point(0), Position::new(1980.0, 557.0));
        assert_eq!(precision.start_point(2), Position::new(1480.0, 557.0));
    }

    #[test]
    fn test_penalty_factor() {
        let factors: Vec<f64> = (0..DIFFICULTIES)
            .map(|difficulty| PrecisionSettings { difficulty, ..Default::default() }.penalty_factor())
            .collect();
        assert_eq!(factors, vec![5.0, 15.0, 25.0]);
    }

    #[test]
    fn test_measure_scores_distance() {
        let mut engine = ModeEngine::<Precision>::new(PrecisionSettings::default()).unwrap();

        let out = engine.entrance(&shot(557.0 + 30.0, 557.0 + 40.0)).unwrap();

        assert!(out.response.is_finished());
        assert_eq!(out.response.score, -250.0);
        assert_eq!(out.response.message.as_deref(), Some("50 mm"));
        assert_eq!(engine.context().record["distance"], 50);
        assert_eq!(engine.context().record["difficulty"], 0);
    }

    #[test]
    fn test_empty_table_stays() {
        let mut engine = ModeEngine::<Precision>::new(PrecisionSettings::default()).unwrap();

        let out = engine
            .entrance(&ModeInput::new("submit").with_coordinates(BallSnapshot::new()))
            .unwrap();

        assert_eq!(out.response.signal, "init");
        assert_eq!(
            engine.scene().get("status"),
            Some(&status("No ball found, try again!"))
        );
    }

    #[test]
    fn test_settings_move_start_and_survive_reset() {
        let mut engine = ModeEngine::<Precision>::new(PrecisionSettings::default()).unwrap();

        let out = engine
            .entrance(&ModeInput::new("settings").with_field("difficulty", "2"))
            .unwrap();
        assert_eq!(out.response.message.as_deref(), Some("x25"));
        assert_eq!(
            engine.scene().get("balls-start"),
            Some(&ScenePart::balls([(BallId::Cue, Position::new(1480.0, 557.0))]).with_key("balls-start"))
        );
        assert_eq!(
            engine.scene().get("difficulty-2"),
            Some(
                &ScenePart::line(Position::new(1480.0, 100.0), Position::new(1480.0, 1015.0))
                    .with_width(SELECTED_WIDTH)
                    .with_key("difficulty-2")
            )
        );

        engine.entrance(&shot(557.0, 567.0)).unwrap();
        let out = engine.entrance(&ModeInput::new("next_try")).unwrap();

        assert_eq!(out.response.signal, "init");
        assert_eq!(engine.context().settings().difficulty, 2);
        assert_eq!(engine.scene().get("balls-start"), Some(&engine.context().mode.start_ball(2)));
    }

    #[test]
    fn test_out_of_range_difficulty() {
        let mut engine = ModeEngine::<Precision>::new(PrecisionSettings::default()).unwrap();

        let err = engine
            .entrance(&ModeInput::new("settings").with_field("difficulty", 3))
            .unwrap_err();

        assert!(err.is_client_error());
        assert_eq!(engine.context().settings().difficulty, 0);
    }
}
