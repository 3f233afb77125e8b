//! Attestation mode implementation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::slots::ScoreSlots;
use crate::core::Position;
use crate::error::ModeError;
use crate::games::board::status;
use crate::games::precision::{Precision, PrecisionSettings};
use crate::games::single_break::SingleBreak;
use crate::modes::{
    EntranceOutcome, ForwardEffects, HistoryRow, InputField, InputSpec, LocalEffects, ModeContext,
    ModeDefinition, ModeEngine, ModeInput, ModeState, TableEntry, Transition, TransitionTable,
};
use crate::scene::{SceneDescription, ScenePart};

const PRECISION_ROUNDS: usize = 5;
const BREAK_ROUNDS: usize = 1;

const ZONE_ONE_MM: f64 = 22.0;
const ZONE_ONE_POINTS: i64 = 50;
const BREAK_POINTS: i64 = 200;
const PASS_MM: f64 = 180.0;
const PASS_PRECISION_SHOTS: usize = 2;
const PASS_POINTS: i64 = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChallengeStep {
    Init,
    Finished,
}

impl ModeState for ChallengeStep {
    const INIT: Self = ChallengeStep::Init;
    const FINISHED: Self = ChallengeStep::Finished;

    fn name(self) -> &'static str {
        match self {
            ChallengeStep::Init => "init",
            ChallengeStep::Finished => "finished",
        }
    }
}

/// A child challenge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Activity {
    Precision,
    Break,
}

impl Activity {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "precision" => Some(Activity::Precision),
            "break" => Some(Activity::Break),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Activity::Precision => "precision",
            Activity::Break => "break",
        }
    }
}

/// Who is playing, and for which session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeSettings {
    pub player: String,
    pub team: String,
    /// Partition key of the history row, e.g. a semester.
    pub session: Option<String>,
}

/// Bonus points earned by a hand-in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    /// Per precision shot closer than 22 mm.
    #[serde(rename = "Zone 1")]
    pub zone_one: i64,
    /// Per break that sank at least one ball.
    #[serde(rename = "Break")]
    pub break_bonus: i64,
    /// Two precision shots within 180 mm and a scoring break.
    #[serde(rename = "Passed")]
    pub passed: i64,
}

impl Overview {
    pub fn from_slots(precision: &ScoreSlots, breaks: &ScoreSlots) -> Self {
        let distances: Vec<f64> = precision.records().filter_map(|r| number(r, "distance")).collect();
        let scoring_breaks = breaks
            .records()
            .filter(|r| number(r, "sunk_legal").is_some_and(|n| n >= 1.0))
            .count();

        let zone_one = distances.iter().filter(|&&d| d < ZONE_ONE_MM).count() as i64 * ZONE_ONE_POINTS;
        let close_shots = distances.iter().filter(|&&d| d <= PASS_MM).count();
        let passed = close_shots >= PASS_PRECISION_SHOTS && scoring_breaks >= 1;

        Self {
            zone_one,
            break_bonus: scoring_breaks as i64 * BREAK_POINTS,
            passed: if passed { PASS_POINTS } else { 0 },
        }
    }

    #[must_use]
    pub fn total(&self) -> i64 {
        self.zone_one + self.break_bonus + self.passed
    }
}

fn number(record: &Map<String, Value>, key: &str) -> Option<f64> {
    record.get(key).and_then(Value::as_f64)
}

/// Children and collected scores.
#[derive(Clone)]
pub struct ChallengeSet {
    precision: Option<ModeEngine<Precision>>,
    single_break: Option<ModeEngine<SingleBreak>>,
    precision_slots: ScoreSlots,
    break_slots: ScoreSlots,
}

impl ChallengeSet {
    #[must_use]
    pub fn slots(&self, activity: Activity) -> &ScoreSlots {
        match activity {
            Activity::Precision => &self.precision_slots,
            Activity::Break => &self.break_slots,
        }
    }

    fn slots_mut(&mut self, activity: Activity) -> &mut ScoreSlots {
        match activity {
            Activity::Precision => &mut self.precision_slots,
            Activity::Break => &mut self.break_slots,
        }
    }

    /// Forward `input` to a child, creating it on first use.
    fn run(&mut self, activity: Activity, input: &ModeInput) -> Result<ChildRun, ModeError> {
        match activity {
            Activity::Precision => run_child(&mut self.precision, input),
            Activity::Break => run_child(&mut self.single_break, input),
        }
    }
}

struct ChildRun {
    outcome: EntranceOutcome,
    scene: SceneDescription,
    record: Map<String, Value>,
}

fn child<M: ModeDefinition>(slot: &mut Option<ModeEngine<M>>) -> Result<&mut ModeEngine<M>, ModeError> {
    let engine = match slot.take() {
        Some(engine) => engine,
        None => ModeEngine::new(M::Settings::default())?,
    };
    Ok(slot.insert(engine))
}

fn run_child<M: ModeDefinition>(slot: &mut Option<ModeEngine<M>>, input: &ModeInput) -> Result<ChildRun, ModeError> {
    let engine = child(slot)?;
    let outcome = engine.entrance(input)?;
    Ok(ChildRun {
        outcome,
        scene: engine.scene().clone(),
        record: engine.context().record.clone(),
    })
}

/// Replace the pending scene with a child's.
fn mirror(scene: &SceneDescription) -> LocalEffects {
    scene
        .iter()
        .cloned()
        .fold(LocalEffects::default().resetting_scene(), LocalEffects::with_part)
}

impl ModeDefinition for ChallengeSet {
    type State = ChallengeStep;
    type Settings = ChallengeSettings;

    fn new(_settings: &ChallengeSettings) -> Self {
        Self {
            precision: None,
            single_break: None,
            precision_slots: ScoreSlots::new(PRECISION_ROUNDS),
            break_slots: ScoreSlots::new(BREAK_ROUNDS),
        }
    }

    fn title() -> &'static str {
        "Attestation"
    }

    fn table() -> TransitionTable<Self> {
        TransitionTable::new().with_state(
            ChallengeStep::Init,
            TableEntry::new(select, overview_scene)
                .on(false, ChallengeStep::Init)
                .on("hand_in", ChallengeStep::Finished)
                .with_input(
                    InputSpec::submit("Submit")
                        .with_field(InputField::select("activity", ["precision", "break", "init", "hand_in"])),
                ),
        )
    }

    fn apply_settings(
        ctx: &mut ModeContext<Self>,
        input: &ModeInput,
    ) -> Result<(LocalEffects, ForwardEffects), ModeError> {
        if let Some(name) = input.opt_str("activity") {
            let activity = Activity::parse(name).ok_or_else(|| ModeError::protocol("activity"))?;
            let run = ctx.mode.run(activity, input)?;
            let forward = ForwardEffects {
                message: run.outcome.response.message,
                ..ForwardEffects::default()
            };
            return Ok((mirror(&run.scene), forward));
        }

        let update = input.object("settings")?;
        let mut merged = serde_json::to_value(ctx.settings())?;
        if let Value::Object(fields) = &mut merged {
            fields.extend(update.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        let settings: ChallengeSettings = serde_json::from_value(merged)?;
        log::debug!("attestation for {} ({}), session {:?}", settings.player, settings.team, settings.session);

        let label = format!("{} ({})", settings.player, settings.team);
        ctx.set_settings(settings);
        Ok((
            LocalEffects::default().with_part(ScenePart::text(label.clone(), Position::new(100.0, 160.0)).with_key("player")),
            ForwardEffects::message(label),
        ))
    }

    fn show_child(ctx: &ModeContext<Self>, input: &ModeInput) -> Option<SceneDescription> {
        match Activity::parse(input.opt_str("activity")?)? {
            Activity::Precision => match &ctx.mode.precision {
                Some(engine) => Some(engine.show(None)),
                None => ModeEngine::<Precision>::new(PrecisionSettings::default()).ok().map(|e| e.show(None)),
            },
            Activity::Break => match &ctx.mode.single_break {
                Some(engine) => Some(engine.show(None)),
                None => ModeEngine::<SingleBreak>::new(Default::default()).ok().map(|e| e.show(None)),
            },
        }
    }
}

fn overview_scene(ctx: &ModeContext<ChallengeSet>) -> SceneDescription {
    let set = &ctx.mode;
    SceneDescription::new()
        .with(status("Choose a challenge"))
        .with(
            ScenePart::text(
                format!("Precision: {}", set.precision_slots.summary()),
                Position::new(100.0, 220.0),
            )
            .with_key("slots-precision"),
        )
        .with(
            ScenePart::text(format!("Break: {}", set.break_slots.summary()), Position::new(100.0, 280.0))
                .with_key("slots-break"),
        )
}

fn select(ctx: &mut ModeContext<ChallengeSet>, input: &ModeInput) -> Result<Transition, ModeError> {
    match input.str_field("activity")? {
        "init" => Ok(Transition::neutral()),
        "hand_in" => hand_in(ctx),
        name => {
            let activity = Activity::parse(name).ok_or_else(|| ModeError::protocol("activity"))?;
            play(ctx, activity, input)
        }
    }
}

fn play(ctx: &mut ModeContext<ChallengeSet>, activity: Activity, input: &ModeInput) -> Result<Transition, ModeError> {
    let ChildRun { outcome, scene, record } = ctx.mode.run(activity, input)?;
    let response = outcome.response;

    let mut forward = ForwardEffects {
        message: response.message,
        notification: response.notification,
        extra: response.extra,
        ..ForwardEffects::default()
    }
    .with_extra("child_signal", response.signal.clone());

    if response.signal == "finished" {
        let (index, replaced) = ctx.mode.slots_mut(activity).fill(response.score, record);
        log::info!(
            "{} round stored in slot {index} (score {}, replaced {replaced:?})",
            activity.name(),
            response.score
        );
        forward = forward.with_extra("was_round", index);
        if let Some(old) = replaced {
            forward = forward.with_extra("replaced", old);
        }
    }

    let mut local = mirror(&scene);
    if let Some(cue) = outcome.sound {
        local = local.with_sound(cue);
    }
    Ok(Transition::neutral().with_local(local).with_forward(forward))
}

fn hand_in(ctx: &mut ModeContext<ChallengeSet>) -> Result<Transition, ModeError> {
    let settings = ctx.settings().clone();
    if settings.player.is_empty() {
        return Err(ModeError::protocol("player"));
    }

    let set = &ctx.mode;
    let overview = Overview::from_slots(&set.precision_slots, &set.break_slots);
    let overview_value = serde_json::to_value(&overview)?;
    let (precision, breaks) = (set.precision_slots.to_value(), set.break_slots.to_value());
    let total = overview.total();

    ctx.score = total as f64;
    ctx.message = format!("Score: {total}");
    ctx.record = Map::from_iter([
        ("overview".to_string(), overview_value.clone()),
        (Activity::Precision.name().to_string(), precision.clone()),
        (Activity::Break.name().to_string(), breaks.clone()),
    ]);
    log::info!("{} handed in {total} points", settings.player);

    let mut row = HistoryRow::new(settings.player, settings.team, ctx.score)
        .with_extra("overview", overview_value.clone())
        .with_extra(Activity::Precision.name(), precision)
        .with_extra(Activity::Break.name(), breaks);
    if let Some(session) = settings.session {
        row = row.with_partition(session);
    }

    Ok(Transition::new("hand_in").with_forward(
        ForwardEffects::message(ctx.message.clone())
            .with_hist_package(row)
            .with_extra("overview", overview_value),
    ))
}
