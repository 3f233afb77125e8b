//! Ordered scene with reference-key editing.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::part::ScenePart;
use crate::core::Position;

/// An edit applied to a scene that stays in the same state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneUpdate {
    /// Replace the part with the same key, or append.
    Upsert(ScenePart),
    /// Delete the part with this key.
    Remove(String),
}

/// Ordered list of scene parts. Later parts render above earlier ones.
///
/// Backed by a persistent vector: clones share structure and never observe
/// each other's edits.
///
/// ```
/// use billiard_table::core::Position;
/// use billiard_table::scene::{SceneDescription, ScenePart};
///
/// let mut scene = SceneDescription::new();
/// scene.upsert(ScenePart::text("1 : 0", Position::new(0.0, 0.0)).with_key("score"));
/// let before = scene.clone();
///
/// scene.upsert(ScenePart::text("2 : 0", Position::new(0.0, 0.0)).with_key("score"));
/// assert_eq!(scene.len(), 1);
/// assert_ne!(before, scene);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneDescription {
    parts: Vector<ScenePart>,
}

impl SceneDescription {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A scene holding a single status line.
    pub fn status(text: impl Into<String>) -> Self {
        let mut scene = Self::new();
        scene.push(ScenePart::text(text, Position::new(100.0, 100.0)).with_key("status"));
        scene
    }

    /// Builder form of `push`.
    #[must_use]
    pub fn with(mut self, part: ScenePart) -> Self {
        self.push(part);
        self
    }

    /// Append on top of everything else.
    pub fn push(&mut self, part: ScenePart) {
        self.parts.push_back(part);
    }

    /// Replace the part with the same key in place, or append.
    pub fn upsert(&mut self, part: ScenePart) {
        let existing = part.key().and_then(|key| self.position_of(key));
        match existing {
            Some(index) => {
                self.parts.set(index, part);
            }
            None => self.push(part),
        }
    }

    /// Remove the part with `key`. Returns whether one was found.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.position_of(key) {
            Some(index) => {
                self.parts.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, update: SceneUpdate) {
        match update {
            SceneUpdate::Upsert(part) => self.upsert(part),
            SceneUpdate::Remove(key) => {
                if !self.remove(&key) {
                    log::debug!("scene has no part `{key}` to remove");
                }
            }
        }
    }

    pub fn apply_all(&mut self, updates: impl IntoIterator<Item = SceneUpdate>) {
        for update in updates {
            self.apply(update);
        }
    }

    pub fn clear(&mut self) {
        self.parts.clear();
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ScenePart> {
        self.position_of(key).and_then(|index| self.parts.get(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Parts in render order.
    pub fn iter(&self) -> impl Iterator<Item = &ScenePart> {
        self.parts.iter()
    }

    fn position_of(&self, key: &str) -> Option<usize> {
        self.parts.iter().position(|p| p.key() == Some(key))
    }
}

impl FromIterator<ScenePart> for SceneDescription {
    fn from_iter<I: IntoIterator<Item = ScenePart>>(iter: I) -> Self {
        Self {
            parts: iter.into_iter().collect(),
        }
    }
}

impl Extend<ScenePart> for SceneDescription {
    fn extend<I: IntoIterator<Item = ScenePart>>(&mut self, iter: I) {
        for part in iter {
            self.push(part);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(key: &str, body: &str) -> ScenePart {
        ScenePart::text(body, Position::new(0.0, 0.0)).with_key(key)
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut scene: SceneDescription = [text("a", "1"), text("b", "2"), text("c", "3")]
            .into_iter()
            .collect();

        scene.upsert(text("b", "changed"));

        let keys: Vec<_> = scene.iter().filter_map(ScenePart::key).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(scene.get("b"), Some(&text("b", "changed")));
    }

    #[test]
    fn test_upsert_unknown_or_missing_key_appends() {
        let mut scene = SceneDescription::new().with(text("a", "1"));

        scene.upsert(text("z", "new"));
        scene.upsert(ScenePart::line(Position::new(0.0, 0.0), Position::new(5.0, 5.0)));

        assert_eq!(scene.len(), 3);
        assert_eq!(scene.iter().last().and_then(ScenePart::key), None);
    }

    #[test]
    fn test_remove() {
        let mut scene = SceneDescription::new().with(text("a", "1")).with(text("b", "2"));

        scene.apply(SceneUpdate::Remove("a".into()));
        scene.apply(SceneUpdate::Remove("missing".into()));

        assert_eq!(scene.len(), 1);
        assert!(scene.get("a").is_none());
    }

    #[test]
    fn test_clones_are_independent() {
        let mut scene = SceneDescription::status("waiting");
        let copy = scene.clone();

        scene.apply_all([SceneUpdate::Upsert(text("status", "go"))]);

        assert_eq!(copy, SceneDescription::status("waiting"));
        assert_eq!(scene.get("status"), Some(&text("status", "go")));
    }

    #[test]
    fn test_serializes_as_array() {
        let scene = SceneDescription::status("hello");
        let json = serde_json::to_value(&scene).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["text"], "hello");
    }
}
