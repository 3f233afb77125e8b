//! Distance mode implementation.

use serde_json::{Map, Value};

use crate::core::{BallId, BallSnapshot, Position, TableConfig};
use crate::error::ModeError;
use crate::games::board::status;
use crate::modes::{
    Cue, InputField, InputSpec, LocalEffects, ModeContext, ModeDefinition, ModeInput, ModeState, TableEntry,
    Transition, TransitionTable,
};
use crate::scene::{SceneDescription, ScenePart};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DistanceStep {
    Init,
    Strike,
    Finished,
}

impl ModeState for DistanceStep {
    const INIT: Self = DistanceStep::Init;
    const FINISHED: Self = DistanceStep::Finished;

    fn name(self) -> &'static str {
        match self {
            DistanceStep::Init => "init",
            DistanceStep::Strike => "strike",
            DistanceStep::Finished => "finished",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Distance {
    table: TableConfig,
    start: Position,
}

impl Distance {
    #[must_use]
    pub fn start_point(&self) -> Position {
        self.start
    }

    /// Travelled distance in millimetres for a ball stopping at `x` after `collisions` cushions.
    #[must_use]
    pub fn travelled(&self, collisions: u32, x: f64) -> f64 {
        let laps = f64::from(collisions / 2) * 2.0 * self.table.width;
        let direction = if collisions % 2 == 1 { 1.0 } else { -1.0 };
        laps + direction * x + self.start.x
    }

    fn start_ball(&self) -> ScenePart {
        ScenePart::balls([(BallId::Cue, self.start)]).with_key("balls-base")
    }

    fn goal(&self) -> BallSnapshot {
        [(BallId::Cue, self.start)].into_iter().collect()
    }
}

impl ModeDefinition for Distance {
    type State = DistanceStep;
    type Settings = TableConfig;

    fn new(settings: &TableConfig) -> Self {
        Self {
            start: Position::new((settings.width * 0.8).floor(), (settings.height / 2.0).floor()),
            table: settings.clone(),
        }
    }

    fn title() -> &'static str {
        "Distance"
    }

    fn table() -> TransitionTable<Self> {
        TransitionTable::new()
            .with_state(
                DistanceStep::Init,
                TableEntry::new(place, |ctx| {
                    SceneDescription::new()
                        .with(status("Distance Challenge: Place the ball on the starting point"))
                        .with(ctx.mode.start_ball())
                })
                .on(true, DistanceStep::Strike)
                .on(false, DistanceStep::Init)
                .with_input(InputSpec::submit("Check Position")),
            )
            .with_state(
                DistanceStep::Strike,
                TableEntry::new(measure, |ctx| {
                    let start = ctx.mode.start;
                    let arrow = ScenePart::arrow(
                        Position::new(start.x - 100.0, start.y),
                        Position::new(start.x - 400.0, start.y),
                    );
                    SceneDescription::new()
                        .with(status("Distance Challenge: Strike the ball!"))
                        .with(ctx.mode.start_ball())
                        .with(arrow.with_key("arrow-tooltip"))
                })
                .on("finished", DistanceStep::Finished)
                .on(false, DistanceStep::Strike)
                .with_input(
                    InputSpec::submit("Measure").with_field(InputField::number("collisions", "Cushions hit")),
                ),
            )
    }
}

fn place(ctx: &mut ModeContext<Distance>, input: &ModeInput) -> Result<Transition, ModeError> {
    let snapshot = input.coordinates()?;
    let check = snapshot.check_layout(&ctx.mode.goal(), ctx.mode.table.placement_tolerance);
    if check.matches {
        return Ok(Transition::new(true).with_message(check.message));
    }

    let local = LocalEffects::default()
        .with_sound(Cue::CorrectPositions)
        .with_part(status(check.message.clone()))
        .with_part(ScenePart::balls(check.marks).with_key("marks"));
    Ok(Transition::new(false).with_local(local).with_message(check.message))
}

fn measure(ctx: &mut ModeContext<Distance>, input: &ModeInput) -> Result<Transition, ModeError> {
    let collisions = input.number("collisions")?;
    if collisions < 0.0 || collisions.fract() != 0.0 || collisions > f64::from(u32::MAX) {
        return Err(ModeError::protocol("collisions"));
    }
    let collisions = collisions as u32;

    let snapshot = input.coordinates()?;
    let Some(end) = snapshot.cue().or_else(|| snapshot.iter().map(|(_, p)| p).next()) else {
        return Ok(Transition::new(false)
            .with_part(status("No ball found, try again!"))
            .with_message("No ball found."));
    };

    let distance = ctx.mode.travelled(collisions, end.x);
    log::debug!("distance shot: {collisions} cushions, stopped at x={:.0}, {distance:.0} mm", end.x);

    ctx.score = distance;
    ctx.message = format!("{:.2} m", distance / 1000.0);
    ctx.record = Map::from_iter([
        ("distance".to_string(), Value::from(distance.round() as i64)),
        ("collisions".to_string(), Value::from(collisions)),
    ]);
    Ok(Transition::new("finished").with_message(ctx.message.clone()))
}
