//! Local match implementation.

use serde::{Deserialize, Serialize};

use crate::core::{GameRng, PlayerId, TableConfig};
use crate::error::{ModeError, RuleError};
use crate::games::board::{match_parts, match_scene, status};
use crate::geometry::ShotGeometry;
use crate::modes::{
    Cue, ForwardEffects, HistoryRow, InputField, InputSpec, LocalEffects, ModeContext, ModeDefinition, ModeInput,
    ModeState, TableEntry, Transition, TransitionTable,
};
use crate::rules::{MatchState, Rule, ShootoutProgress};
use crate::scene::SceneDescription;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocalStep {
    Init,
    Shootout,
    Play,
    Finished,
}

impl ModeState for LocalStep {
    const INIT: Self = LocalStep::Init;
    const FINISHED: Self = LocalStep::Finished;

    fn name(self) -> &'static str {
        match self {
            LocalStep::Init => "init",
            LocalStep::Shootout => "shootout",
            LocalStep::Play => "play",
            LocalStep::Finished => "finished",
        }
    }
}

/// Survives a reset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalSettings {
    #[serde(default)]
    pub table: TableConfig,
}

/// Mode data of a local match.
#[derive(Clone, Debug)]
pub struct LocalGame {
    rng: GameRng,
    geometry: ShotGeometry,
    table: TableConfig,
    game: Option<MatchState>,
}

impl LocalGame {
    /// The running match, once names are in.
    #[must_use]
    pub fn game(&self) -> Option<&MatchState> {
        self.game.as_ref()
    }

    fn scene(&self) -> SceneDescription {
        match &self.game {
            Some(game) => match_scene(game, &self.geometry, &self.table),
            None => SceneDescription::status("No match in progress"),
        }
    }
}

impl ModeDefinition for LocalGame {
    type State = LocalStep;
    type Settings = LocalSettings;

    fn new(settings: &LocalSettings) -> Self {
        Self {
            rng: GameRng::new(settings.table.seed),
            geometry: ShotGeometry::new(&settings.table),
            table: settings.table.clone(),
            game: None,
        }
    }

    /// Keep drawing from the same generator so consecutive matches differ.
    fn rebuild(&self, settings: &LocalSettings) -> Self {
        Self {
            rng: self.rng.clone(),
            ..Self::new(settings)
        }
    }

    fn title() -> &'static str {
        "Local Game"
    }

    fn table() -> TransitionTable<Self> {
        TransitionTable::new()
            .with_state(
                LocalStep::Init,
                TableEntry::new(start, |_| SceneDescription::status("Start a local game"))
                    .on("start_shootout", LocalStep::Shootout)
                    .with_input(
                        InputSpec::submit("Start Game")
                            .with_field(InputField::text("player1", "Player 1"))
                            .with_field(InputField::text("team1", "Team 1"))
                            .with_field(InputField::text("player2", "Player 2"))
                            .with_field(InputField::text("team2", "Team 2")),
                    ),
            )
            .with_state(
                LocalStep::Shootout,
                TableEntry::new(shootout, |ctx| ctx.mode.scene())
                    .on("again", LocalStep::Shootout)
                    .on("break", LocalStep::Play)
                    .with_input(InputSpec::submit("Evaluate")),
            )
            .with_state(
                LocalStep::Play,
                TableEntry::new(play, |ctx| ctx.mode.scene())
                    .on("continue", LocalStep::Play)
                    .on("end", LocalStep::Finished)
                    .with_input(InputSpec::submit("Evaluate")),
            )
    }
}

fn start(ctx: &mut ModeContext<LocalGame>, input: &ModeInput) -> Result<Transition, ModeError> {
    let first = (input.str_field("player1")?, input.opt_str("team1").unwrap_or_default());
    let second = (input.str_field("player2")?, input.opt_str("team2").unwrap_or_default());

    let LocalGame { rng, table, game, .. } = &mut ctx.mode;
    let started = MatchState::start(first, second, table, rng);
    let message = format!("{} shoots first: {}", started.player(PlayerId::FIRST).name, started.message());
    *game = Some(started);

    ctx.message.clone_from(&message);
    Ok(Transition::new("start_shootout").with_message(message))
}

fn shootout(ctx: &mut ModeContext<LocalGame>, input: &ModeInput) -> Result<Transition, ModeError> {
    let snapshot = input.coordinates()?;
    let LocalGame { rng, game, .. } = &mut ctx.mode;
    let game = game.as_mut().ok_or(ModeError::NoMatch)?;

    let shooter = PlayerId::both()
        .find(|id| game.shootout().distances[*id].is_none())
        .ok_or(RuleError::ShootoutClosed)?;
    let token = game.player(shooter).token.clone();
    let name = game.player(shooter).name.clone();

    let transition = match game.submit_shootout(&token, snapshot, rng)? {
        ShootoutProgress::Recorded { distance } => {
            let next = &game.player(shooter.other()).name;
            let text = format!("{name}: {distance} mm. {next}, your turn");
            Transition::new("again").with_part(status(text.clone())).with_message(text)
        }
        ShootoutProgress::Decided { distance, breaker } => {
            let text = format!("{name}: {distance} mm. {} breaks", game.player(breaker).name);
            Transition::new("break").with_message(text)
        }
    };
    ctx.message = game.message();
    Ok(transition)
}

fn play(ctx: &mut ModeContext<LocalGame>, input: &ModeInput) -> Result<Transition, ModeError> {
    let snapshot = input.coordinates()?.clone();
    let LocalGame {
        geometry, table, game, ..
    } = &mut ctx.mode;
    let game = game.as_mut().ok_or(ModeError::NoMatch)?;

    let verdict = game.play_round(snapshot)?;
    ctx.message = game.message();

    if let Some(outcome) = verdict.outcome {
        let winner = game.player(outcome.winner());
        let notification = format!("{} has won the game!", winner.name);
        let row = ledger_row(game)?;
        ctx.score = row.score;
        return Ok(Transition::new("end").with_sound(Cue::Victory).with_forward(
            ForwardEffects::message(verdict.rationale)
                .with_notification(notification)
                .with_hist_package(row),
        ));
    }

    let mut local = match_parts(game, geometry, table)
        .into_iter()
        .fold(LocalEffects::default().resetting_scene(), LocalEffects::with_part);
    if matches!(verdict.rule, Rule::EightOnOpenTable | Rule::Scratch | Rule::Foul) {
        local = local.with_sound(Cue::Foul);
    }
    Ok(Transition::new("continue")
        .with_local(local)
        .with_message(verdict.rationale))
}

/// Winner's row with the whole match attached. The score is the number of
/// own-group balls the winner cleared.
fn ledger_row(game: &MatchState) -> Result<HistoryRow, ModeError> {
    let archive = game.archive().ok_or(ModeError::NoMatch)?;
    let winner = game.player(archive.outcome.winner());
    let loser = game.player(archive.outcome.winner().other());
    let record = serde_json::to_value(&archive).map_err(|err| ModeError::History(err.to_string()))?;

    Ok(HistoryRow::new(&winner.name, &winner.team, f64::from(7 - winner.remaining.min(7)))
        .with_extra("opponent", loser.name.clone())
        .with_extra("match", record))
}
