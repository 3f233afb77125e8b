//! Break mode implementation.

use serde_json::{Map, Value};

use crate::core::{BallSnapshot, TableConfig};
use crate::error::ModeError;
use crate::games::board::{rack_apex, status};
use crate::modes::{InputSpec, ModeContext, ModeDefinition, ModeInput, ModeState, TableEntry, Transition, TransitionTable};
use crate::rules::diff;
use crate::scene::{SceneDescription, ScenePart};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BreakStep {
    Init,
    Finished,
}

impl ModeState for BreakStep {
    const INIT: Self = BreakStep::Init;
    const FINISHED: Self = BreakStep::Finished;

    fn name(self) -> &'static str {
        match self {
            BreakStep::Init => "init",
            BreakStep::Finished => "finished",
        }
    }
}

#[derive(Clone, Debug)]
pub struct SingleBreak {
    table: TableConfig,
}

impl ModeDefinition for SingleBreak {
    type State = BreakStep;
    type Settings = TableConfig;

    fn new(settings: &TableConfig) -> Self {
        Self {
            table: settings.clone(),
        }
    }

    fn title() -> &'static str {
        "Break"
    }

    fn table() -> TransitionTable<Self> {
        TransitionTable::new().with_state(
            BreakStep::Init,
            TableEntry::new(count, |ctx| {
                SceneDescription::new()
                    .with(status("Break Challenge"))
                    .with(ScenePart::break_rack(rack_apex(&ctx.mode.table)).with_key("rack"))
            })
            .on("finished", BreakStep::Finished)
            .on(false, BreakStep::Init)
            .with_input(InputSpec::submit("Count sunk balls")),
        )
    }
}

fn count(ctx: &mut ModeContext<SingleBreak>, input: &ModeInput) -> Result<Transition, ModeError> {
    let snapshot = input.coordinates()?;
    if snapshot.is_empty() {
        return Ok(Transition::neutral()
            .with_part(status("No ball found, try again!"))
            .with_message("No ball found."));
    }

    let report = diff(&BallSnapshot::full_rack(), snapshot);
    let sunk = report.sunk_objects();
    log::debug!("break sank {sunk} object balls (white sunk: {}, eight sunk: {})", report.white_sunk, report.eight_sunk);

    ctx.score = sunk as f64;
    ctx.message = format!("{sunk} balls sunk");
    ctx.record = Map::from_iter([("sunk_legal".to_string(), Value::from(sunk))]);
    Ok(Transition::new("finished").with_message(ctx.message.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BallId, Position};
    use crate::modes::ModeEngine;

    fn after_break(sunk: &[BallId]) -> ModeInput {
        let mut snapshot = BallSnapshot::full_rack();
        for id in sunk {
            snapshot.remove(id);
        }
        snapshot.insert(BallId::Cue, Position::new(400.0, 300.0));
        ModeInput::new("submit").with_coordinates(snapshot)
    }

    #[test]
    fn test_counts_only_group_balls() {
        let mut engine = ModeEngine::<SingleBreak>::new(TableConfig::default()).unwrap();

        let out = engine
            .entrance(&after_break(&[BallId::Numbered(2), BallId::Numbered(11), BallId::EIGHT]))
            .unwrap();

        assert!(out.response.is_finished());
        assert_eq!(out.response.score, 2.0);
        assert_eq!(out.response.message.as_deref(), Some("2 balls sunk"));
        assert_eq!(engine.context().record["sunk_legal"], 2);
    }

    #[test]
    fn test_scratch_does_not_count() {
        let mut engine = ModeEngine::<SingleBreak>::new(TableConfig::default()).unwrap();
        let mut input = after_break(&[BallId::Numbered(5)]);
        if let Some(snapshot) = input.coordinates.as_mut() {
            snapshot.remove(&BallId::Cue);
        }

        let out = engine.entrance(&input).unwrap();

        assert_eq!(out.response.score, 1.0);
    }

    #[test]
    fn test_empty_snapshot_is_retried() {
        let mut engine = ModeEngine::<SingleBreak>::new(TableConfig::default()).unwrap();

        let out = engine
            .entrance(&ModeInput::new("submit").with_coordinates(BallSnapshot::new()))
            .unwrap();

        assert_eq!(out.response.signal, "init");
        assert_eq!(engine.context().score, 0.0);
        assert!(engine.scene().get("rack").is_some());
    }
}
