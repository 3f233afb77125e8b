//! Fixed-size score slots.

use serde_json::{Map, Value};

/// One collected round.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotEntry {
    pub score: f64,
    pub record: Map<String, Value>,
}

/// Scores of one activity. Capacity never changes.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreSlots {
    slots: Vec<Option<SlotEntry>>,
}

impl ScoreSlots {
    /// At least one slot.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, index: usize) -> Option<&SlotEntry> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Store a round in the first empty slot, or over the lowest score.
    ///
    /// Returns the slot index and the score it replaced.
    pub fn fill(&mut self, score: f64, record: Map<String, Value>) -> (usize, Option<f64>) {
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .unwrap_or_else(|| self.lowest());
        let replaced = self.slots[index]
            .replace(SlotEntry { score, record })
            .map(|old| old.score);
        (index, replaced)
    }

    /// First slot holding the minimum score.
    fn lowest(&self) -> usize {
        self.entries()
            .min_by(|a, b| a.1.score.total_cmp(&b.1.score))
            .map_or(0, |(index, _)| index)
    }

    /// Filled slots with their indices.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &SlotEntry)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|entry| (index, entry)))
    }

    /// Records of filled slots.
    pub fn records(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.entries().map(|(_, entry)| &entry.record)
    }

    /// Per-slot records, `null` for empty slots.
    pub fn to_value(&self) -> Value {
        Value::Array(
            self.slots
                .iter()
                .map(|slot| slot.as_ref().map_or(Value::Null, |e| Value::Object(e.record.clone())))
                .collect(),
        )
    }

    /// Short scoreboard line, `-` for empty slots.
    pub fn summary(&self) -> String {
        self.slots
            .iter()
            .map(|slot| slot.as_ref().map_or("-".to_string(), |e| e.score.round().to_string()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
