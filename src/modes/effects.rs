//! Handler results and engine responses.
//!
//! A handler returns a `Transition`: a decision plus two kinds of effects.
//! - `LocalEffects` stay on the server (sound, scene edits)
//! - `ForwardEffects` go to the client
//!
//! The engine turns forward effects into a `Response`. Engine-owned fields
//! (`signal`, `score`) always win over anything a handler put into `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::history::{HistoryRow, HistoryView};
use crate::scene::{ScenePart, SceneUpdate};

/// Audio feedback cue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Default on every state change.
    Progress,
    /// Balls are not where they should be.
    CorrectPositions,
    Foul,
    Victory,
}

/// Effects applied on the server only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalEffects {
    /// Overrides the default cue.
    pub sound: Option<Cue>,
    /// Applied when the state does not change.
    pub scene_updates: Vec<SceneUpdate>,
    /// Clear the scene before applying `scene_updates`.
    pub reset_scene: bool,
}

impl LocalEffects {
    #[must_use]
    pub fn with_sound(mut self, cue: Cue) -> Self {
        self.sound = Some(cue);
        self
    }

    /// Queue an upsert.
    #[must_use]
    pub fn with_part(mut self, part: ScenePart) -> Self {
        self.scene_updates.push(SceneUpdate::Upsert(part));
        self
    }

    #[must_use]
    pub fn with_removal(mut self, key: impl Into<String>) -> Self {
        self.scene_updates.push(SceneUpdate::Remove(key.into()));
        self
    }

    #[must_use]
    pub fn resetting_scene(mut self) -> Self {
        self.reset_scene = true;
        self
    }
}

/// Effects forwarded to the client.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ForwardEffects {
    pub message: Option<String>,
    pub notification: Option<String>,
    /// Row to add to the mode's history ledger.
    pub hist_package: Option<HistoryRow>,
    pub error: Option<String>,
    /// Mode-specific fields.
    pub extra: Map<String, Value>,
}

impl ForwardEffects {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_notification(mut self, notification: impl Into<String>) -> Self {
        self.notification = Some(notification.into());
        self
    }

    #[must_use]
    pub fn with_hist_package(mut self, row: HistoryRow) -> Self {
        self.hist_package = Some(row);
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// What a state handler decided.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// Looked up in the state's decision map.
    pub decision: String,
    pub local: LocalEffects,
    pub forward: ForwardEffects,
}

impl Transition {
    /// A decision with no effects. Booleans become `"true"` / `"false"`.
    pub fn new(decision: impl ToString) -> Self {
        Self {
            decision: decision.to_string(),
            local: LocalEffects::default(),
            forward: ForwardEffects::default(),
        }
    }

    /// The neutral transition: decision `false`, no effects.
    #[must_use]
    pub fn neutral() -> Self {
        Self::new(false)
    }

    #[must_use]
    pub fn with_local(mut self, local: LocalEffects) -> Self {
        self.local = local;
        self
    }

    #[must_use]
    pub fn with_forward(mut self, forward: ForwardEffects) -> Self {
        self.forward = forward;
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.forward.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_sound(mut self, cue: Cue) -> Self {
        self.local.sound = Some(cue);
        self
    }

    #[must_use]
    pub fn with_part(mut self, part: ScenePart) -> Self {
        self.local.scene_updates.push(SceneUpdate::Upsert(part));
        self
    }
}

/// Response returned to the client.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// New state name. The terminal state is always `"finished"`.
    pub signal: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<HistoryView>,
    #[serde(rename = "hist-package", default, skip_serializing_if = "Option::is_none")]
    pub hist_package: Option<HistoryRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const ENGINE_FIELDS: [&str; 2] = ["signal", "score"];

impl Response {
    /// Merge forward effects with the engine-owned fields.
    pub fn merge(forward: ForwardEffects, signal: impl Into<String>, score: f64) -> Self {
        let mut extra = forward.extra;
        for field in ENGINE_FIELDS {
            if extra.remove(field).is_some() {
                log::debug!("dropping handler-supplied `{field}`, the engine owns it");
            }
        }

        Self {
            signal: signal.into(),
            score,
            message: forward.message,
            notification: forward.notification,
            history: None,
            hist_package: forward.hist_package,
            error: forward.error,
            extra,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.signal == "finished"
    }
}

/// Everything `entrance` produces besides the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct EntranceOutcome {
    pub response: Response,
    pub sound: Option<Cue>,
    /// Whether the state changed.
    pub changed: bool,
}
