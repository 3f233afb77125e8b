//! Transition-table interpreter.
//!
//! `ModeEngine` owns one mode instance: its current state, the mutable
//! `ModeContext` threaded through every handler, and the pending scene.
//!
//! ## entrance
//!
//! 1. `action == "settings"` goes to the settings hook; the state stays.
//! 2. Otherwise the current state's handler returns a `Transition`.
//! 3. `decision` is looked up in the state's decision map. A miss is
//!    `ModeError::IllegalTransition`.
//! 4. On a state change the next state's scene template is evaluated into the
//!    pending scene. Without one, the local scene updates are applied.
//! 5. An explicit sound wins; a state change defaults to `Cue::Progress`.
//!
//! Any error restores the context, so a failed `entrance` changes nothing.
//! The engine never redraws; the caller decides when to push the scene.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::effects::{Cue, EntranceOutcome, ForwardEffects, LocalEffects, Response, Transition};
use super::input::{InputSpec, ModeInput};
use super::table::{ModeState, TransitionTable};
use crate::error::ModeError;
use crate::scene::SceneDescription;

/// A concrete mode.
pub trait ModeDefinition: Clone + Send + Sized + 'static {
    type State: ModeState;

    /// Sub-record that survives `reset(keep_settings = true)`.
    type Settings: Clone + Default + Send + Serialize + DeserializeOwned + 'static;

    /// Build fresh mode data.
    fn new(settings: &Self::Settings) -> Self;

    /// Build fresh mode data on reset. Modes holding external resources
    /// override this to carry them over.
    fn rebuild(&self, settings: &Self::Settings) -> Self {
        Self::new(settings)
    }

    /// Display name, e.g. `"Precision"`.
    fn title() -> &'static str;

    fn table() -> TransitionTable<Self>;

    /// Handle `action == "settings"`.
    fn apply_settings(
        _ctx: &mut ModeContext<Self>,
        _input: &ModeInput,
    ) -> Result<(LocalEffects, ForwardEffects), ModeError> {
        Ok((LocalEffects::default(), ForwardEffects::default()))
    }

    /// Scene of a child mode selected by `input`, for composite modes.
    fn show_child(_ctx: &ModeContext<Self>, _input: &ModeInput) -> Option<SceneDescription> {
        None
    }
}

/// Mutable per-instance data handed to every handler.
#[derive(Clone)]
pub struct ModeContext<M: ModeDefinition> {
    /// Mode-specific fields.
    pub mode: M,
    pub score: f64,
    /// Status text of the current round.
    pub message: String,
    /// Structured record of the current round, for the history ledger.
    pub record: Map<String, Value>,
    settings: M::Settings,
}

impl<M: ModeDefinition> ModeContext<M> {
    pub fn new(settings: M::Settings) -> Self {
        Self::with_mode(M::new(&settings), settings)
    }

    pub fn with_mode(mode: M, settings: M::Settings) -> Self {
        Self {
            mode,
            score: 0.0,
            message: String::new(),
            record: Map::new(),
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &M::Settings {
        &self.settings
    }

    /// Replace the settings. Mode data is not rebuilt.
    pub fn set_settings(&mut self, settings: M::Settings) {
        self.settings = settings;
    }

    /// Rebuild mode data and clear score, message and record.
    pub fn reset(&mut self, keep_settings: bool) {
        if !keep_settings {
            self.settings = M::Settings::default();
        }
        self.mode = self.mode.rebuild(&self.settings);
        self.score = 0.0;
        self.message.clear();
        self.record.clear();
    }

    /// `reset` usable as a handler result: returns the neutral transition.
    pub fn reset_in_place(&mut self, keep_settings: bool) -> Transition {
        self.reset(keep_settings);
        Transition::neutral()
    }
}

/// Interpreter for one mode instance.
#[derive(Clone)]
pub struct ModeEngine<M: ModeDefinition> {
    table: TransitionTable<M>,
    state: M::State,
    ctx: ModeContext<M>,
    scene: SceneDescription,
}

impl<M: ModeDefinition> ModeEngine<M> {
    /// Build the mode from settings and complete its table.
    pub fn new(settings: M::Settings) -> Result<Self, ModeError> {
        Self::from_context(ModeContext::new(settings))
    }

    /// Use already constructed mode data.
    pub fn from_mode(mode: M, settings: M::Settings) -> Result<Self, ModeError> {
        Self::from_context(ModeContext::with_mode(mode, settings))
    }

    fn from_context(ctx: ModeContext<M>) -> Result<Self, ModeError> {
        let table = M::table().complete()?;
        let mut engine = Self {
            table,
            state: M::State::INIT,
            ctx,
            scene: SceneDescription::new(),
        };
        engine.scene = engine.template(M::State::INIT)?;
        Ok(engine)
    }

    #[must_use]
    pub fn state(&self) -> M::State {
        self.state
    }

    #[must_use]
    pub fn context(&self) -> &ModeContext<M> {
        &self.ctx
    }

    /// Direct access for setup and tests. Bypasses the transition table.
    pub fn context_mut(&mut self) -> &mut ModeContext<M> {
        &mut self.ctx
    }

    /// Pending scene.
    #[must_use]
    pub fn scene(&self) -> &SceneDescription {
        &self.scene
    }

    /// Run one request through the transition table.
    pub fn entrance(&mut self, input: &ModeInput) -> Result<EntranceOutcome, ModeError> {
        let backup = self.ctx.clone();
        let result = self.step(input);
        if result.is_err() {
            self.ctx = backup;
        }
        result
    }

    fn step(&mut self, input: &ModeInput) -> Result<EntranceOutcome, ModeError> {
        if input.is_settings() {
            let (local, forward) = M::apply_settings(&mut self.ctx, input)?;
            let sound = local.sound;
            self.apply_local(local);
            return Ok(EntranceOutcome {
                response: Response::merge(forward, self.state.name(), self.ctx.score),
                sound,
                changed: false,
            });
        }

        let entry = self
            .table
            .get(self.state)
            .ok_or_else(|| ModeError::UnknownState(self.state.name().to_string()))?;
        let (handler, from) = (entry.handler, self.state);

        let transition = handler(&mut self.ctx, input)?;

        let next = self
            .table
            .get(from)
            .and_then(|entry| entry.decisions.get(&transition.decision))
            .copied()
            .ok_or_else(|| ModeError::IllegalTransition {
                state: from.name().to_string(),
                decision: transition.decision.clone(),
            })?;

        let Transition { local, forward, .. } = transition;
        let changed = next != from;
        let sound = local.sound.or(changed.then_some(Cue::Progress));

        if changed {
            self.scene = self.template(next)?;
            log::debug!("{}: {} -> {}", M::title(), from.name(), next.name());
        } else {
            self.apply_local(local);
        }
        self.state = next;

        Ok(EntranceOutcome {
            response: Response::merge(forward, next.name(), self.ctx.score),
            sound,
            changed,
        })
    }

    /// Scene for a client re-entering the mode.
    ///
    /// In `init`, a composite mode may delegate to a child selected by
    /// `input`; otherwise the `init` template is re-evaluated. In any other
    /// state the pending scene is returned. Either way the result is an
    /// independent copy.
    #[must_use]
    pub fn show(&self, input: Option<&ModeInput>) -> SceneDescription {
        if self.state == M::State::INIT {
            if let Some(scene) = input.and_then(|input| M::show_child(&self.ctx, input)) {
                return scene;
            }
            if let Some(entry) = self.table.get(self.state) {
                return (entry.scene)(&self.ctx);
            }
        }
        self.scene.clone()
    }

    /// Back to `init` with score 0 and fresh mode data.
    pub fn reset(&mut self, keep_settings: bool) {
        self.ctx.reset(keep_settings);
        self.state = M::State::INIT;
        if let Some(entry) = self.table.get(M::State::INIT) {
            self.scene = (entry.scene)(&self.ctx);
        }
        log::debug!("{}: reset (keep settings: {keep_settings})", M::title());
    }

    /// Input forms per state, in declaration order.
    #[must_use]
    pub fn input_specs(&self) -> Vec<(&'static str, InputSpec)> {
        self.table
            .states()
            .filter_map(|state| self.table.get(state).map(|e| (state.name(), e.input.clone())))
            .collect()
    }

    fn template(&self, state: M::State) -> Result<SceneDescription, ModeError> {
        self.table
            .get(state)
            .map(|entry| (entry.scene)(&self.ctx))
            .ok_or_else(|| ModeError::UnknownState(state.name().to_string()))
    }

    fn apply_local(&mut self, local: LocalEffects) {
        if local.reset_scene {
            self.scene.clear();
        }
        self.scene.apply_all(local.scene_updates);
    }
}

/// Object-safe view of a mode engine, for hosting heterogeneous modes.
pub trait TableMode: Send {
    fn title(&self) -> &'static str;

    fn state_name(&self) -> &'static str;

    fn score(&self) -> f64;

    /// Structured record of the current round.
    fn record(&self) -> &Map<String, Value>;

    fn entrance(&mut self, input: &ModeInput) -> Result<EntranceOutcome, ModeError>;

    fn show(&self, input: Option<&ModeInput>) -> SceneDescription;

    fn scene(&self) -> &SceneDescription;

    fn reset(&mut self, keep_settings: bool);

    fn input_specs(&self) -> Vec<(&'static str, InputSpec)>;
}

impl<M: ModeDefinition> TableMode for ModeEngine<M> {
    fn title(&self) -> &'static str {
        M::title()
    }

    fn state_name(&self) -> &'static str {
        self.state.name()
    }

    fn score(&self) -> f64 {
        self.ctx.score
    }

    fn record(&self) -> &Map<String, Value> {
        &self.ctx.record
    }

    fn entrance(&mut self, input: &ModeInput) -> Result<EntranceOutcome, ModeError> {
        ModeEngine::entrance(self, input)
    }

    fn show(&self, input: Option<&ModeInput>) -> SceneDescription {
        ModeEngine::show(self, input)
    }

    fn scene(&self) -> &SceneDescription {
        ModeEngine::scene(self)
    }

    fn reset(&mut self, keep_settings: bool) {
        ModeEngine::reset(self, keep_settings);
    }

    fn input_specs(&self) -> Vec<(&'static str, InputSpec)> {
        ModeEngine::input_specs(self)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::core::Position;
    use crate::modes::table::TableEntry;
    use crate::scene::ScenePart;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Step {
        Init,
        Counting,
        Finished,
    }

    impl ModeState for Step {
        const INIT: Self = Step::Init;
        const FINISHED: Self = Step::Finished;

        fn name(self) -> &'static str {
            match self {
                Step::Init => "init",
                Step::Counting => "counting",
                Step::Finished => "finished",
            }
        }
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    struct Target {
        hits: u32,
    }

    #[derive(Clone)]
    struct Counter {
        hits: u32,
    }

    impl ModeDefinition for Counter {
        type State = Step;
        type Settings = Target;

        fn new(_settings: &Target) -> Self {
            Counter { hits: 0 }
        }

        fn title() -> &'static str {
            "Counter"
        }

        fn table() -> TransitionTable<Self> {
            TransitionTable::new()
                .with_state(
                    Step::Init,
                    TableEntry::new(start, |_| SceneDescription::status("press start"))
                        .on(true, Step::Counting)
                        .on(false, Step::Init),
                )
                .with_state(
                    Step::Counting,
                    TableEntry::new(hit, |ctx| {
                        SceneDescription::status(format!("{} hits", ctx.mode.hits))
                    })
                    .on(false, Step::Counting)
                    .on("done", Step::Finished),
                )
        }

        fn apply_settings(
            ctx: &mut ModeContext<Self>,
            input: &ModeInput,
        ) -> Result<(LocalEffects, ForwardEffects), ModeError> {
            let hits = input.number("hits")? as u32;
            ctx.set_settings(Target { hits });
            Ok((
                LocalEffects::default().with_part(
                    ScenePart::text(format!("target {hits}"), Position::default()).with_key("target"),
                ),
                ForwardEffects::message(format!("x{hits}")),
            ))
        }
    }

    fn start(_ctx: &mut ModeContext<Counter>, input: &ModeInput) -> Result<Transition, ModeError> {
        Ok(Transition::new(input.is("start")))
    }

    fn hit(ctx: &mut ModeContext<Counter>, input: &ModeInput) -> Result<Transition, ModeError> {
        if input.is("bogus") {
            ctx.score = -1.0;
            return Ok(Transition::new("nope"));
        }
        if input.is("needs-field") {
            ctx.score = -1.0;
            input.str_field("player")?;
        }
        ctx.mode.hits += 1;
        ctx.score = f64::from(ctx.mode.hits);
        if ctx.mode.hits >= ctx.settings().hits.max(1) {
            ctx.message = format!("{} hits", ctx.mode.hits);
            return Ok(Transition::new("done"));
        }
        Ok(Transition::neutral().with_part(
            ScenePart::text(format!("{} hits", ctx.mode.hits), Position::default()).with_key("status"),
        ))
    }

    fn engine(hits: u32) -> ModeEngine<Counter> {
        ModeEngine::new(Target { hits }).unwrap()
    }

    #[test]
    fn test_finished_is_synthesized() {
        let engine = engine(2);
        let specs = engine.input_specs();
        let names: Vec<_> = specs.iter().map(|(name, _)| *name).collect();

        assert_eq!(names, vec!["init", "counting", "finished"]);
        assert_eq!(specs[2].1.fields[0].placeholder, "Next Try");
    }

    #[test]
    fn test_state_change_loads_template_and_plays_progress() {
        let mut engine = engine(2);

        let out = engine.entrance(&ModeInput::new("start")).unwrap();

        assert!(out.changed);
        assert_eq!(out.sound, Some(Cue::Progress));
        assert_eq!(out.response.signal, "counting");
        assert_eq!(engine.scene(), &SceneDescription::status("0 hits"));
    }

    #[test]
    fn test_same_state_applies_updates_silently() {
        let mut engine = engine(3);
        engine.entrance(&ModeInput::new("start")).unwrap();

        let out = engine.entrance(&ModeInput::new("hit")).unwrap();

        assert!(!out.changed);
        assert_eq!(out.sound, None);
        assert_eq!(engine.scene().len(), 1);
        assert_eq!(
            engine.scene().get("status"),
            Some(&ScenePart::text("1 hits", Position::default()).with_key("status"))
        );
    }

    #[test]
    fn test_illegal_decision_leaves_instance_untouched() {
        let mut engine = engine(3);
        engine.entrance(&ModeInput::new("start")).unwrap();
        let scene = engine.scene().clone();

        let err = engine.entrance(&ModeInput::new("bogus")).unwrap_err();

        assert!(matches!(err, ModeError::IllegalTransition { ref decision, .. } if decision == "nope"));
        assert_eq!(engine.state(), Step::Counting);
        assert_eq!(engine.context().score, 0.0);
        assert_eq!(engine.scene(), &scene);
    }

    #[test]
    fn test_protocol_error_restores_context() {
        let mut engine = engine(3);
        engine.entrance(&ModeInput::new("start")).unwrap();

        let err = engine.entrance(&ModeInput::new("needs-field")).unwrap_err();

        assert!(err.is_client_error());
        assert_eq!(engine.context().score, 0.0);
        assert_eq!(engine.context().mode.hits, 0);
    }

    #[test]
    fn test_finished_then_loop_back_keeps_settings() {
        let mut engine = engine(1);
        engine.entrance(&ModeInput::new("start")).unwrap();

        let out = engine.entrance(&ModeInput::new("hit")).unwrap();
        assert!(out.response.is_finished());
        assert_eq!(out.response.score, 1.0);
        assert_eq!(
            engine.scene(),
            &SceneDescription::new().with(
                ScenePart::text("Counter Challenge: 1 hits", Position::new(100.0, 100.0)).with_key("status")
            )
        );

        let out = engine.entrance(&ModeInput::new("next_try")).unwrap();
        assert_eq!(out.response.signal, "init");
        assert_eq!(out.response.score, 0.0);
        assert_eq!(engine.context().settings().hits, 1);
        assert_eq!(engine.context().mode.hits, 0);
    }

    #[test]
    fn test_settings_hook() {
        let mut engine = engine(1);

        let out = engine
            .entrance(&ModeInput::new("settings").with_field("hits", 4))
            .unwrap();

        assert_eq!(out.response.signal, "init");
        assert_eq!(out.response.message.as_deref(), Some("x4"));
        assert_eq!(engine.context().settings().hits, 4);
        assert!(engine.scene().get("target").is_some());
    }

    #[test]
    fn test_reset_without_settings() {
        let mut engine = engine(5);
        engine.entrance(&ModeInput::new("start")).unwrap();
        engine.entrance(&ModeInput::new("hit")).unwrap();

        engine.reset(false);

        assert_eq!(engine.state(), Step::Init);
        assert_eq!(engine.context().score, 0.0);
        assert_eq!(engine.context().settings().hits, 0);
    }

    #[test]
    fn test_show_returns_independent_copy() {
        let mut engine = engine(3);
        engine.entrance(&ModeInput::new("start")).unwrap();

        let shown = engine.show(None);
        engine.entrance(&ModeInput::new("hit")).unwrap();

        assert_eq!(shown, SceneDescription::status("0 hits"));
        assert_ne!(&shown, engine.scene());
    }
}
