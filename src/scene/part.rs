//! Typed scene parts.

use serde::{Deserialize, Serialize};

use crate::core::{BallId, BallSnapshot, Position, Region};

/// What a scene part draws.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PartKind {
    Text {
        text: String,
        position: Position,
        size: f64,
    },
    /// Balls at their positions. May include marker balls and repeated names.
    Balls { balls: Vec<(BallId, Position)> },
    Line {
        from: Position,
        to: Position,
        width: f64,
    },
    Rectangle { region: Region, filled: bool },
    Polygon { points: Vec<Position> },
    Arrow { from: Position, to: Position },
    Bullseye { center: Position, rings: u8 },
    /// Embedded image referenced by an opaque source string.
    Image { source: String, region: Region },
    /// Outline of a fifteen-ball triangle with its apex at `apex`.
    BreakRack { apex: Position },
}

/// One entry of a `SceneDescription`.
///
/// Parts with a `key` can be replaced or removed later; parts without one are
/// only ever appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(flatten)]
    pub kind: PartKind,
}

impl ScenePart {
    pub fn new(kind: PartKind) -> Self {
        Self { key: None, kind }
    }

    /// Attach a stable reference key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn text(text: impl Into<String>, position: Position) -> Self {
        Self::new(PartKind::Text {
            text: text.into(),
            position,
            size: 40.0,
        })
    }

    /// Text with a custom font size (mm).
    pub fn sized_text(text: impl Into<String>, position: Position, size: f64) -> Self {
        Self::new(PartKind::Text {
            text: text.into(),
            position,
            size,
        })
    }

    pub fn balls(balls: impl IntoIterator<Item = (BallId, Position)>) -> Self {
        Self::new(PartKind::Balls {
            balls: balls.into_iter().collect(),
        })
    }

    /// Every ball of a snapshot.
    pub fn snapshot(snapshot: &BallSnapshot) -> Self {
        Self::balls(snapshot.iter().map(|(id, p)| (id.clone(), p)))
    }

    pub fn line(from: Position, to: Position) -> Self {
        Self::new(PartKind::Line {
            from,
            to,
            width: 4.0,
        })
    }

    /// Change the stroke width of a line. Other parts are unchanged.
    #[must_use]
    pub fn with_width(mut self, stroke: f64) -> Self {
        if let PartKind::Line { width, .. } = &mut self.kind {
            *width = stroke;
        }
        self
    }

    pub fn rectangle(region: Region, filled: bool) -> Self {
        Self::new(PartKind::Rectangle { region, filled })
    }

    pub fn polygon(points: Vec<Position>) -> Self {
        Self::new(PartKind::Polygon { points })
    }

    pub fn arrow(from: Position, to: Position) -> Self {
        Self::new(PartKind::Arrow { from, to })
    }

    pub fn bullseye(center: Position, rings: u8) -> Self {
        Self::new(PartKind::Bullseye { center, rings })
    }

    pub fn image(source: impl Into<String>, region: Region) -> Self {
        Self::new(PartKind::Image {
            source: source.into(),
            region,
        })
    }

    pub fn break_rack(apex: Position) -> Self {
        Self::new(PartKind::BreakRack { apex })
    }

    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let part = ScenePart::text("Player 1 may break", Position::new(100.0, 50.0)).with_key("status");
        let json = serde_json::to_value(&part).unwrap();

        assert_eq!(json["type"], "text");
        assert_eq!(json["key"], "status");
        assert_eq!(json["text"], "Player 1 may break");
    }

    #[test]
    fn test_unkeyed_part_omits_key() {
        let part = ScenePart::arrow(Position::new(0.0, 0.0), Position::new(1.0, 1.0));
        let json = serde_json::to_value(&part).unwrap();

        assert!(json.get("key").is_none());
        let back: ScenePart = serde_json::from_value(json).unwrap();
        assert_eq!(back, part);
    }
}
