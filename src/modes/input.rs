//! Requests into a mode and the input forms a UI renders per state.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{BallSnapshot, Token};
use crate::error::ModeError;

/// One `entrance` request.
///
/// ```
/// use billiard_table::modes::ModeInput;
///
/// let input: ModeInput = serde_json::from_str(
///     r#"{"action": "submit", "player": "Ada", "coordinates": [{"name": "white", "x": 1, "y": 2}]}"#,
/// ).unwrap();
///
/// assert_eq!(input.str_field("player").unwrap(), "Ada");
/// assert_eq!(input.coordinates().unwrap().len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeInput {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<BallSnapshot>,
    /// Every other field of the request.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ModeInput {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_coordinates(mut self, snapshot: BallSnapshot) -> Self {
        self.coordinates = Some(snapshot);
        self
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_settings(&self) -> bool {
        self.action == "settings"
    }

    #[must_use]
    pub fn is(&self, action: &str) -> bool {
        self.action == action
    }

    /// The submitted snapshot.
    pub fn coordinates(&self) -> Result<&BallSnapshot, ModeError> {
        self.coordinates
            .as_ref()
            .ok_or_else(|| ModeError::protocol("coordinates"))
    }

    pub fn str_field(&self, key: &str) -> Result<&str, ModeError> {
        self.opt_str(key).ok_or_else(|| ModeError::protocol(key))
    }

    #[must_use]
    pub fn opt_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// A number, given either as JSON number or numeric string.
    pub fn number(&self, key: &str) -> Result<f64, ModeError> {
        match self.fields.get(key) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or_else(|| ModeError::protocol(key))
    }

    pub fn token(&self) -> Result<Token, ModeError> {
        self.str_field("token").map(Token::new)
    }

    /// A nested object field.
    pub fn object(&self, key: &str) -> Result<&Map<String, Value>, ModeError> {
        self.fields
            .get(key)
            .and_then(Value::as_object)
            .ok_or_else(|| ModeError::protocol(key))
    }
}

/// Kind of a form field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "options")]
pub enum FieldKind {
    Text,
    Number,
    Button,
    Select(Vec<String>),
}

/// One form field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputField {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub placeholder: String,
}

impl InputField {
    pub fn text(name: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
            placeholder: placeholder.into(),
        }
    }

    pub fn number(name: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Number,
            placeholder: placeholder.into(),
        }
    }

    pub fn button(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Button,
            placeholder: label.into(),
        }
    }

    pub fn select(name: impl Into<String>, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let name = name.into();
        Self {
            placeholder: name.clone(),
            name,
            kind: FieldKind::Select(options.into_iter().map(Into::into).collect()),
        }
    }
}

/// Declarative input form of one state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Label of the submit control. `None` hides it.
    pub submit: Option<String>,
    pub fields: Vec<InputField>,
}

impl InputSpec {
    /// A lone submit control.
    pub fn submit(label: impl Into<String>) -> Self {
        Self {
            submit: Some(label.into()),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, field: InputField) -> Self {
        self.fields.push(field);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_are_protocol_errors() {
        let input = ModeInput::new("submit");

        assert!(matches!(input.coordinates(), Err(ModeError::Protocol { field }) if field == "coordinates"));
        assert!(matches!(input.str_field("player"), Err(ModeError::Protocol { .. })));
        assert!(input.token().is_err());
    }

    #[test]
    fn test_number_accepts_strings() {
        let input = ModeInput::new("settings")
            .with_field("difficulty", "2")
            .with_field("collisions", 3)
            .with_field("bad", "x");

        assert_eq!(input.number("difficulty").unwrap(), 2.0);
        assert_eq!(input.number("collisions").unwrap(), 3.0);
        assert!(input.number("bad").is_err());
    }

    #[test]
    fn test_input_spec_serialization() {
        let spec = InputSpec::submit("Start")
            .with_field(InputField::text("player", "Name"))
            .with_field(InputField::select("difficulty", ["hard", "easy"]));
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(json["submit"], "Start");
        assert_eq!(json["fields"][0]["kind"], "text");
        assert_eq!(json["fields"][1]["options"][1], "easy");
    }
}
