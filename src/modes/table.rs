//! Transition tables.
//!
//! A mode is described entirely by data: for every state a handler, a map from
//! decision to next state, a scene template and an input form.
//!
//! ```text
//! init ──"true"──▶ play ──"true"──▶ finished ──"false"──▶ init
//!   ▲                │
//!   └────"reset"─────┘
//! ```

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use super::effects::Transition;
use super::engine::{ModeContext, ModeDefinition};
use super::input::{InputField, InputSpec, ModeInput};
use crate::core::Position;
use crate::error::ModeError;
use crate::scene::{SceneDescription, ScenePart};

/// State identifiers of one mode.
pub trait ModeState: Copy + Eq + Hash + fmt::Debug + Send + 'static {
    /// Entry state after construction and reset.
    const INIT: Self;

    /// Terminal state. Its name must be `"finished"`.
    const FINISHED: Self;

    /// Externally visible state name.
    fn name(self) -> &'static str;
}

/// State handler.
pub type Handler<M> = fn(&mut ModeContext<M>, &ModeInput) -> Result<Transition, ModeError>;

/// Scene template, evaluated against the live context.
pub type SceneTemplate<M> = fn(&ModeContext<M>) -> SceneDescription;

/// One row of a transition table.
pub struct TableEntry<M: ModeDefinition> {
    pub handler: Handler<M>,
    pub decisions: FxHashMap<String, M::State>,
    pub scene: SceneTemplate<M>,
    pub input: InputSpec,
}

impl<M: ModeDefinition> Clone for TableEntry<M> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler,
            decisions: self.decisions.clone(),
            scene: self.scene,
            input: self.input.clone(),
        }
    }
}

impl<M: ModeDefinition> TableEntry<M> {
    pub fn new(handler: Handler<M>, scene: SceneTemplate<M>) -> Self {
        Self {
            handler,
            decisions: FxHashMap::default(),
            scene,
            input: InputSpec::none(),
        }
    }

    /// Map a decision to a next state.
    #[must_use]
    pub fn on(mut self, decision: impl ToString, next: M::State) -> Self {
        self.decisions.insert(decision.to_string(), next);
        self
    }

    #[must_use]
    pub fn with_input(mut self, input: InputSpec) -> Self {
        self.input = input;
        self
    }
}

/// All states of a mode, in declaration order.
pub struct TransitionTable<M: ModeDefinition> {
    entries: FxHashMap<M::State, TableEntry<M>>,
    order: Vec<M::State>,
}

impl<M: ModeDefinition> Clone for TransitionTable<M> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            order: self.order.clone(),
        }
    }
}

impl<M: ModeDefinition> Default for TransitionTable<M> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
            order: Vec::new(),
        }
    }
}

impl<M: ModeDefinition> TransitionTable<M> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a state.
    #[must_use]
    pub fn with_state(mut self, state: M::State, entry: TableEntry<M>) -> Self {
        if self.entries.insert(state, entry).is_none() {
            self.order.push(state);
        }
        self
    }

    #[must_use]
    pub fn get(&self, state: M::State) -> Option<&TableEntry<M>> {
        self.entries.get(&state)
    }

    #[must_use]
    pub fn contains(&self, state: M::State) -> bool {
        self.entries.contains_key(&state)
    }

    /// States in declaration order.
    pub fn states(&self) -> impl Iterator<Item = M::State> + '_ {
        self.order.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Add the default terminal state if missing and check every decision
    /// target exists.
    ///
    /// The default `finished` state resets the mode (keeping settings) and
    /// loops back to `init` on decision `false`.
    pub fn complete(mut self) -> Result<Self, ModeError> {
        if !self.contains(M::State::FINISHED) {
            let entry = TableEntry::new(finished_handler::<M>, finished_scene::<M>)
                .on(false, M::State::INIT)
                .with_input(InputSpec::none().with_field(InputField::button("next_try", "Next Try")));
            self = self.with_state(M::State::FINISHED, entry);
        }

        if !self.contains(M::State::INIT) {
            return Err(ModeError::UnknownState(M::State::INIT.name().to_string()));
        }

        for state in &self.order {
            let Some(entry) = self.entries.get(state) else {
                continue;
            };
            if let Some(target) = entry.decisions.values().find(|t| !self.entries.contains_key(t)) {
                return Err(ModeError::UnknownTarget {
                    from: state.name().to_string(),
                    to: target.name().to_string(),
                });
            }
        }
        Ok(self)
    }
}

fn finished_handler<M: ModeDefinition>(
    ctx: &mut ModeContext<M>,
    _input: &ModeInput,
) -> Result<Transition, ModeError> {
    Ok(ctx.reset_in_place(true))
}

fn finished_scene<M: ModeDefinition>(ctx: &ModeContext<M>) -> SceneDescription {
    SceneDescription::new().with(
        ScenePart::text(
            format!("{} Challenge: {}", M::title(), ctx.message),
            Position::new(100.0, 100.0),
        )
        .with_key("status"),
    )
}
