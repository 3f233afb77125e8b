//! Table controller.
//!
//! Hosts the registered modes of one table, routes each request to the named
//! mode, ranks finished rounds in that mode's ledger and pushes the pending
//! scene to a `SceneSink`. Engine errors are logged here, once, and returned
//! to the caller unchanged.

use rustc_hash::FxHashMap;

use crate::error::ModeError;
use crate::modes::{history, Cue, HistoryRow, HistoryStore, MemoryHistory, ModeInput, Response, TableMode};
use crate::scene::SceneDescription;

/// Where rendered scenes and sounds go.
pub trait SceneSink: Send {
    fn push(&mut self, mode: &str, scene: &SceneDescription);

    fn play(&mut self, _cue: Cue) {}
}

struct Hosted {
    mode: Box<dyn TableMode>,
    ledger: Box<dyn HistoryStore>,
}

/// Modes of one table and the sink that draws them.
pub struct TableController<S: SceneSink> {
    modes: FxHashMap<String, Hosted>,
    active: Option<String>,
    sink: S,
}

impl<S: SceneSink> TableController<S> {
    pub fn new(sink: S) -> Self {
        Self {
            modes: FxHashMap::default(),
            active: None,
            sink,
        }
    }

    /// Register a mode with an in-memory ledger.
    #[must_use]
    pub fn with_mode(mut self, name: impl Into<String>, mode: Box<dyn TableMode>) -> Self {
        self.register(name, mode, Box::new(MemoryHistory::new()));
        self
    }

    /// Register or replace a mode.
    pub fn register(&mut self, name: impl Into<String>, mode: Box<dyn TableMode>, ledger: Box<dyn HistoryStore>) {
        let name = name.into();
        log::debug!("registered mode `{name}` ({})", mode.title());
        self.modes.insert(name, Hosted { mode, ledger });
    }

    /// Name of the mode that handled the last request.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn mode(&self, name: &str) -> Option<&dyn TableMode> {
        self.modes.get(name).map(|hosted| hosted.mode.as_ref())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Send one request to the named mode.
    ///
    /// `show` only re-draws. Any other action runs `entrance`; a `finished`
    /// response gets the mode's ranked ledger attached. Modes that do not
    /// build a history package get one from the `player` and `team` fields
    /// of the request and the round record.
    pub fn handle(&mut self, name: &str, input: &ModeInput) -> Result<Response, ModeError> {
        let hosted = self.modes.get_mut(name).ok_or_else(|| ModeError::protocol("mode"))?;
        if self.active.as_deref() != Some(name) {
            log::info!("table switched to `{name}`");
            self.active = Some(name.to_string());
        }

        if input.is("show") {
            let scene = hosted.mode.show(Some(input));
            self.sink.push(name, &scene);
            return Ok(Response {
                signal: hosted.mode.state_name().to_string(),
                score: hosted.mode.score(),
                ..Response::default()
            });
        }

        let outcome = match hosted.mode.entrance(input) {
            Ok(outcome) => outcome,
            Err(err) => {
                match &err {
                    ModeError::IllegalTransition { .. } | ModeError::UnknownTarget { .. } | ModeError::UnknownState(_) => {
                        log::error!("{}: {err}", hosted.mode.title());
                    }
                    _ if err.is_client_error() => log::warn!("{}: rejected request: {err}", hosted.mode.title()),
                    _ => log::error!("{}: {err}", hosted.mode.title()),
                }
                return Err(err);
            }
        };

        let mut response = outcome.response;
        if response.is_finished() {
            let package = response
                .hist_package
                .clone()
                .or_else(|| fallback_row(input, hosted.mode.as_ref()));
            let partition = package.as_ref().and_then(|row| row.partition.clone());
            match history(hosted.ledger.as_mut(), None, package, partition.as_deref()) {
                Ok(view) => response.history = view,
                Err(err) => log::warn!("{}: history not updated: {err}", hosted.mode.title()),
            }
        }

        if let Some(cue) = outcome.sound {
            self.sink.play(cue);
        }
        self.sink.push(name, hosted.mode.scene());
        Ok(response)
    }

    /// Reset one mode and redraw it.
    pub fn reset(&mut self, name: &str, keep_settings: bool) -> Result<(), ModeError> {
        let hosted = self.modes.get_mut(name).ok_or_else(|| ModeError::protocol("mode"))?;
        hosted.mode.reset(keep_settings);
        self.sink.push(name, hosted.mode.scene());
        Ok(())
    }
}

fn fallback_row(input: &ModeInput, mode: &dyn TableMode) -> Option<HistoryRow> {
    let player = input.opt_str("player")?;
    let team = input.opt_str("team").unwrap_or_default();
    Some(
        mode.record()
            .iter()
            .fold(HistoryRow::new(player, team, mode.score()), |row, (key, value)| {
                row.with_extra(key.clone(), value.clone())
            }),
    )
}
