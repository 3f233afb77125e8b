//! Online match mode.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::coordinator::{
    BreakDecision, BreakStatus, GameReply, GameRequest, MatchCoordinator, PollStatus, TurnUpdate,
};
use crate::core::{BallSnapshot, Position, Region, TableConfig};
use crate::error::{CoordinatorError, ModeError};
use crate::games::board::{rack_apex, status};
use crate::geometry::ShotGeometry;
use crate::modes::{
    Cue, ForwardEffects, InputField, InputSpec, LocalEffects, ModeContext, ModeDefinition, ModeInput, ModeState,
    TableEntry, Transition, TransitionTable,
};
use crate::rules::{Assignment, Shootout};
use crate::scene::{SceneDescription, ScenePart};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OnlineStep {
    Init,
    WaitReply,
    DetermineBreak,
    AwaitBreak,
    Play,
    WaitForOther,
    BuildScene,
    Error,
    Finished,
}

impl ModeState for OnlineStep {
    const INIT: Self = OnlineStep::Init;
    const FINISHED: Self = OnlineStep::Finished;

    fn name(self) -> &'static str {
        match self {
            OnlineStep::Init => "init",
            OnlineStep::WaitReply => "wait_reply",
            OnlineStep::DetermineBreak => "determine_break",
            OnlineStep::AwaitBreak => "await_break",
            OnlineStep::Play => "play",
            OnlineStep::WaitForOther => "wait_for_other",
            OnlineStep::BuildScene => "build_scene",
            OnlineStep::Error => "error",
            OnlineStep::Finished => "finished",
        }
    }
}

/// Survives a reset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OnlineSettings {
    #[serde(default)]
    pub table: TableConfig,
}

/// Mode data of an online match.
#[derive(Clone)]
pub struct OnlineGame {
    coordinator: Option<Arc<dyn MatchCoordinator>>,
    table: TableConfig,
    geometry: ShotGeometry,
    shootout: Option<Shootout>,
    /// Last layout known to this table.
    last: Option<BallSnapshot>,
    /// Layout to rebuild before play resumes.
    goal: Option<BallSnapshot>,
    placement: Option<Region>,
    assignment: Assignment,
    rack: bool,
}

impl fmt::Debug for OnlineGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnlineGame")
            .field("connected", &self.coordinator.is_some())
            .field("shootout", &self.shootout)
            .field("last", &self.last)
            .field("goal", &self.goal)
            .field("assignment", &self.assignment)
            .finish_non_exhaustive()
    }
}

impl OnlineGame {
    /// Mode data talking to `coordinator`.
    #[must_use]
    pub fn with_coordinator(settings: &OnlineSettings, coordinator: Arc<dyn MatchCoordinator>) -> Self {
        Self {
            coordinator: Some(coordinator),
            ..Self::new(settings)
        }
    }

    fn coordinator(&self) -> Result<Arc<dyn MatchCoordinator>, CoordinatorError> {
        self.coordinator
            .clone()
            .ok_or_else(|| CoordinatorError::Unreachable("no match coordinator configured".into()))
    }

    fn table_parts(&self) -> Vec<ScenePart> {
        let mut parts = Vec::new();
        if self.rack {
            parts.push(ScenePart::break_rack(rack_apex(&self.table)).with_key("rack"));
            return parts;
        }
        let Some(snapshot) = &self.last else {
            return parts;
        };
        parts.push(ScenePart::snapshot(snapshot).with_key("balls"));
        if let Some(region) = self.placement {
            parts.push(ScenePart::rectangle(region, false).with_key("placement"));
        }
        let assignment = self.assignment;
        for shot in self.geometry.shots(snapshot, |id| assignment.may_target(id)) {
            parts.extend(shot.scene_parts());
        }
        parts
    }
}

impl ModeDefinition for OnlineGame {
    type State = OnlineStep;
    type Settings = OnlineSettings;

    fn new(settings: &OnlineSettings) -> Self {
        Self {
            coordinator: None,
            table: settings.table.clone(),
            geometry: ShotGeometry::new(&settings.table),
            shootout: None,
            last: None,
            goal: None,
            placement: None,
            assignment: Assignment::Open,
            rack: false,
        }
    }

    fn rebuild(&self, settings: &OnlineSettings) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
            ..Self::new(settings)
        }
    }

    fn title() -> &'static str {
        "Online Game"
    }

    fn table() -> TransitionTable<Self> {
        let waiting = || {
            InputSpec::none().with_field(InputField::button("abort", "Waiting, click to cancel"))
        };

        TransitionTable::new()
            .with_state(
                OnlineStep::Init,
                TableEntry::new(request_game, init_scene)
                    .on("opened", OnlineStep::WaitReply)
                    .on("found", OnlineStep::DetermineBreak)
                    .on("error", OnlineStep::Error)
                    .with_input(
                        InputSpec::submit("Request Game")
                            .with_field(InputField::text("player", "Player Name"))
                            .with_field(InputField::text("team", "Team"))
                            .with_field(InputField::text("opponent_table", "Opponent Table")),
                    ),
            )
            .with_state(
                OnlineStep::WaitReply,
                TableEntry::new(reply_received, |_| SceneDescription::status("Waiting for reply..."))
                    .on("waiting", OnlineStep::WaitReply)
                    .on("found", OnlineStep::DetermineBreak)
                    .on("gone", OnlineStep::Init)
                    .on("abort", OnlineStep::Finished)
                    .on("error", OnlineStep::Error)
                    .with_input(waiting()),
            )
            .with_state(
                OnlineStep::DetermineBreak,
                TableEntry::new(evaluate_break, shootout_scene)
                    .on("won", OnlineStep::Play)
                    .on("lost", OnlineStep::WaitForOther)
                    .on("pending", OnlineStep::AwaitBreak)
                    .on("gone", OnlineStep::Finished)
                    .on("abort", OnlineStep::Finished)
                    .on("error", OnlineStep::Error)
                    .with_input(InputSpec::submit("Evaluate")),
            )
            .with_state(
                OnlineStep::AwaitBreak,
                TableEntry::new(break_decided, shootout_scene)
                    .on("waiting", OnlineStep::AwaitBreak)
                    .on("won", OnlineStep::Play)
                    .on("lost", OnlineStep::WaitForOther)
                    .on("gone", OnlineStep::Finished)
                    .on("abort", OnlineStep::Finished)
                    .on("error", OnlineStep::Error)
                    .with_input(waiting()),
            )
            .with_state(
                OnlineStep::Play,
                TableEntry::new(evaluate_play, play_scene)
                    .on("go_on", OnlineStep::Play)
                    .on("change", OnlineStep::WaitForOther)
                    .on("won", OnlineStep::Finished)
                    .on("lost", OnlineStep::Finished)
                    .on("gone", OnlineStep::Finished)
                    .on("abort", OnlineStep::Finished)
                    .on("error", OnlineStep::Error)
                    .with_input(InputSpec::submit("Evaluate")),
            )
            .with_state(
                OnlineStep::WaitForOther,
                TableEntry::new(other_played, |ctx| {
                    let mut scene = SceneDescription::status("Other player's turn");
                    scene.extend(ctx.mode.table_parts());
                    scene
                })
                .on("waiting", OnlineStep::WaitForOther)
                .on("transfer", OnlineStep::BuildScene)
                .on("rebreak", OnlineStep::Play)
                .on("over", OnlineStep::Finished)
                .on("gone", OnlineStep::Finished)
                .on("abort", OnlineStep::Finished)
                .on("error", OnlineStep::Error)
                .with_input(waiting()),
            )
            .with_state(
                OnlineStep::BuildScene,
                TableEntry::new(check_layout, build_scene)
                    .on(true, OnlineStep::Play)
                    .on(false, OnlineStep::BuildScene)
                    .on("abort", OnlineStep::Finished)
                    .with_input(InputSpec::submit("Check Positions")),
            )
            .with_state(
                OnlineStep::Error,
                TableEntry::new(retry, |ctx| {
                    SceneDescription::status(format!("Connection problem: {}", ctx.message))
                })
                .on("retry", OnlineStep::Init)
                .with_input(InputSpec::submit("Retry")),
            )
    }
}

fn init_scene(ctx: &ModeContext<OnlineGame>) -> SceneDescription {
    let center = ctx.mode.table.center();
    let logo = Region::new(
        Position::new(center.x - 250.0, center.y - 250.0),
        Position::new(center.x + 250.0, center.y + 250.0),
    );
    SceneDescription::status("Start an Online Game").with(ScenePart::image("logo", logo).with_key("logo"))
}

fn shootout_scene(ctx: &ModeContext<OnlineGame>) -> SceneDescription {
    let mut scene = SceneDescription::status("Get as close as possible to win the break!");
    if let Some(shootout) = &ctx.mode.shootout {
        scene.push(shootout.scene_part());
    }
    scene
}

fn play_scene(ctx: &ModeContext<OnlineGame>) -> SceneDescription {
    let mut scene = SceneDescription::new().with(status(ctx.message.clone()));
    scene.extend(ctx.mode.table_parts());
    scene
}

fn build_scene(ctx: &ModeContext<OnlineGame>) -> SceneDescription {
    let mut scene = SceneDescription::status("Rebuild the table as shown");
    if let Some(goal) = &ctx.mode.goal {
        scene.push(ScenePart::snapshot(goal).with_key("goal"));
    }
    scene
}

/// Coordinator failures end in the `error` state.
fn failed(ctx: &mut ModeContext<OnlineGame>, err: CoordinatorError) -> Transition {
    log::warn!("{}: {err}", OnlineGame::title());
    ctx.message = err.to_string();
    Transition::new("error").with_forward(ForwardEffects::default().with_error(err.to_string()))
}

fn abort(ctx: &mut ModeContext<OnlineGame>) -> Transition {
    if let Some(coordinator) = &ctx.mode.coordinator {
        if let Err(err) = coordinator.abort() {
            log::warn!("abort not delivered: {err}");
        }
    }
    ctx.message = "Game aborted".to_string();
    Transition::new("abort").with_message("Game aborted")
}

fn retry(_ctx: &mut ModeContext<OnlineGame>, _input: &ModeInput) -> Result<Transition, ModeError> {
    Ok(Transition::new("retry"))
}

fn request_game(ctx: &mut ModeContext<OnlineGame>, input: &ModeInput) -> Result<Transition, ModeError> {
    let request = GameRequest {
        player: input.str_field("player")?.to_string(),
        team: input.opt_str("team").unwrap_or_default().to_string(),
        opponent: input.opt_str("opponent_table").filter(|s| !s.is_empty()).map(str::to_string),
    };

    let reply = ctx
        .mode
        .coordinator()
        .and_then(|coordinator| coordinator.request_game(&request));
    match reply {
        Ok(GameReply::Opened) => Ok(Transition::new("opened").with_message("Waiting for an opponent")),
        Ok(GameReply::Found(shootout)) => {
            ctx.mode.shootout = Some(shootout);
            Ok(Transition::new("found").with_message("Game found and started"))
        }
        Err(err) => Ok(failed(ctx, err)),
    }
}

fn reply_received(ctx: &mut ModeContext<OnlineGame>, input: &ModeInput) -> Result<Transition, ModeError> {
    if input.is("abort") {
        return Ok(abort(ctx));
    }
    match ctx.mode.coordinator().and_then(|c| c.poll_reply()) {
        Ok(PollStatus::Waiting) => Ok(Transition::new("waiting")),
        Ok(PollStatus::Advance(shootout)) => {
            ctx.mode.shootout = Some(shootout);
            Ok(Transition::new("found").with_message("Game found and started"))
        }
        Ok(PollStatus::Gone) => Ok(Transition::new("gone").with_message("Interrupted")),
        Err(err) => Ok(failed(ctx, err)),
    }
}

fn evaluate_break(ctx: &mut ModeContext<OnlineGame>, input: &ModeInput) -> Result<Transition, ModeError> {
    if input.is("abort") {
        return Ok(abort(ctx));
    }
    let snapshot = input.coordinates()?;
    match ctx.mode.coordinator().and_then(|c| c.submit_break(snapshot)) {
        Ok(BreakStatus::Pending) => {
            Ok(Transition::new("pending").with_message("Waiting for the opponent's shot"))
        }
        Ok(BreakStatus::Decided(decision)) => Ok(break_transition(ctx, decision)),
        Err(CoordinatorError::Ended) => Ok(opponent_gone(ctx)),
        Err(err) => Ok(failed(ctx, err)),
    }
}

fn break_decided(ctx: &mut ModeContext<OnlineGame>, input: &ModeInput) -> Result<Transition, ModeError> {
    if input.is("abort") {
        return Ok(abort(ctx));
    }
    match ctx.mode.coordinator().and_then(|c| c.poll_break()) {
        Ok(PollStatus::Waiting) => Ok(Transition::new("waiting")),
        Ok(PollStatus::Advance(decision)) => Ok(break_transition(ctx, decision)),
        Ok(PollStatus::Gone) | Err(CoordinatorError::Ended) => Ok(opponent_gone(ctx)),
        Err(err) => Ok(failed(ctx, err)),
    }
}

fn break_transition(ctx: &mut ModeContext<OnlineGame>, decision: BreakDecision) -> Transition {
    match decision {
        BreakDecision::Won => {
            ctx.mode.rack = true;
            ctx.message = "Won decision, play the break".to_string();
            Transition::new("won").with_message(ctx.message.clone())
        }
        BreakDecision::Lost => {
            ctx.message = "Lost decision, wait for opponent to break".to_string();
            Transition::new("lost").with_message(ctx.message.clone())
        }
    }
}

fn opponent_gone(ctx: &mut ModeContext<OnlineGame>) -> Transition {
    ctx.message = "The opponent left the game".to_string();
    let forward = ForwardEffects::message(ctx.message.clone()).with_notification(ctx.message.clone());
    Transition::new("gone").with_forward(forward)
}

fn evaluate_play(ctx: &mut ModeContext<OnlineGame>, input: &ModeInput) -> Result<Transition, ModeError> {
    if input.is("abort") {
        return Ok(abort(ctx));
    }
    let snapshot = input.coordinates()?;
    let reply = match ctx.mode.coordinator().and_then(|c| c.submit_play(snapshot)) {
        Ok(reply) => reply,
        Err(CoordinatorError::Ended) => return Ok(opponent_gone(ctx)),
        Err(err) => return Ok(failed(ctx, err)),
    };

    let mode = &mut ctx.mode;
    mode.last = Some(snapshot.clone());
    mode.assignment = reply.assignment;
    mode.placement = None;
    mode.rack = false;
    ctx.message = reply.message.clone();

    let decision = reply.decision.as_str();
    let transition = Transition::new(decision).with_message(reply.message);
    Ok(match decision {
        "go_on" => {
            let base = LocalEffects::default()
                .resetting_scene()
                .with_part(status(ctx.message.clone()));
            let local = ctx.mode.table_parts().into_iter().fold(base, LocalEffects::with_part);
            transition.with_local(local)
        }
        "won" => {
            ctx.message = "You won!".to_string();
            transition.with_sound(Cue::Victory)
        }
        "lost" => {
            ctx.message = "You lost!".to_string();
            transition.with_sound(Cue::Foul)
        }
        _ => transition,
    })
}

fn other_played(ctx: &mut ModeContext<OnlineGame>, input: &ModeInput) -> Result<Transition, ModeError> {
    if input.is("abort") {
        return Ok(abort(ctx));
    }
    let update = match ctx.mode.coordinator().and_then(|c| c.poll_turn()) {
        Ok(PollStatus::Waiting) => return Ok(Transition::new("waiting")),
        Ok(PollStatus::Gone) | Err(CoordinatorError::Ended) => return Ok(opponent_gone(ctx)),
        Ok(PollStatus::Advance(update)) => update,
        Err(err) => return Ok(failed(ctx, err)),
    };

    Ok(match update {
        TurnUpdate::YourTurn {
            layout,
            placement,
            assignment,
            message,
        } => {
            let mode = &mut ctx.mode;
            mode.goal = Some(layout);
            mode.placement = placement;
            mode.assignment = assignment;
            mode.rack = false;
            ctx.message = message;
            Transition::new("transfer").with_message("Your turn: rebuild the table")
        }
        TurnUpdate::Rebreak { message } => {
            ctx.mode.rack = true;
            ctx.mode.last = None;
            ctx.message = message;
            Transition::new("rebreak").with_message("Your turn: rack and break")
        }
        TurnUpdate::Over { won, message } => {
            let (text, cue) = if won { ("You won!", Cue::Victory) } else { ("You lost!", Cue::Foul) };
            ctx.message = text.to_string();
            Transition::new("over")
                .with_sound(cue)
                .with_forward(ForwardEffects::message(message).with_notification(text))
        }
    })
}

fn check_layout(ctx: &mut ModeContext<OnlineGame>, input: &ModeInput) -> Result<Transition, ModeError> {
    if input.is("abort") {
        return Ok(abort(ctx));
    }
    let snapshot = input.coordinates()?;
    let Some(goal) = ctx.mode.goal.clone() else {
        return Ok(Transition::new(true));
    };

    let check = snapshot.check_layout(&goal, ctx.mode.table.placement_tolerance);
    if check.matches {
        ctx.mode.last = Some(goal);
        ctx.mode.goal = None;
        return Ok(Transition::new(true).with_message(check.message));
    }

    let local = LocalEffects::default()
        .with_sound(Cue::CorrectPositions)
        .with_part(status(check.message.clone()))
        .with_part(ScenePart::balls(check.marks).with_key("marks"));
    Ok(Transition::new(false).with_local(local).with_message(check.message))
}
