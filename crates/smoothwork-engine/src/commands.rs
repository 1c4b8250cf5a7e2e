//! Commands a host can dispatch into the editor
//!
//! The editor owns no input device. Hosts translate their own key events
//! into a `KeyChord` and let `EditorCommand::from_key` apply the standard
//! shortcut table; form collaborators send `FormEvent`s.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::NodeId;

/// Keyboard-driven editor commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorCommand {
    Undo,
    Redo,
    DuplicateSelected,
    DeleteSelected,
    AutoLayout,
}

/// A key press as reported by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyChord {
    /// Key name, e.g. `"z"`, `"Delete"`, `"Backspace"`
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    /// Focus is inside a text input or editable field
    pub in_text_field: bool,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn in_text_field(mut self) -> Self {
        self.in_text_field = true;
        self
    }
}

impl EditorCommand {
    /// Map a key chord to a command
    ///
    /// Ctrl and Cmd are interchangeable. Delete and Backspace are ignored
    /// while typing in a text field.
    pub fn from_key(chord: &KeyChord) -> Option<Self> {
        let key = chord.key.as_str();
        let modifier = chord.ctrl || chord.meta;

        if modifier {
            if key.eq_ignore_ascii_case("z") {
                return Some(if chord.shift { Self::Redo } else { Self::Undo });
            }
            if key.eq_ignore_ascii_case("y") {
                return Some(Self::Redo);
            }
            if key.eq_ignore_ascii_case("d") {
                return Some(Self::DuplicateSelected);
            }
            return None;
        }

        if (key == "Delete" || key == "Backspace") && !chord.in_text_field {
            return Some(Self::DeleteSelected);
        }
        None
    }
}

/// Message from the property form collaborator
///
/// On the wire this is either `{id, data}` or `{id, "__delete": true}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawFormEvent")]
pub enum FormEvent {
    /// Replace the node's data payload
    Edit { id: NodeId, data: Value },
    /// Delete the node and its incident edges
    Delete { id: NodeId },
}

impl FormEvent {
    pub fn id(&self) -> &str {
        match self {
            Self::Edit { id, .. } | Self::Delete { id } => id,
        }
    }
}

#[derive(Deserialize)]
struct RawFormEvent {
    id: NodeId,
    #[serde(default)]
    data: Option<Value>,
    #[serde(rename = "__delete", default)]
    delete: bool,
}

impl TryFrom<RawFormEvent> for FormEvent {
    type Error = String;

    fn try_from(raw: RawFormEvent) -> Result<Self, Self::Error> {
        if raw.delete {
            return Ok(Self::Delete { id: raw.id });
        }
        match raw.data {
            Some(data) => Ok(Self::Edit { id: raw.id, data }),
            None => Err(format!("form event for '{}' has neither data nor __delete", raw.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shortcut_table() {
        let cases = [
            (KeyChord::new("z").ctrl(), Some(EditorCommand::Undo)),
            (KeyChord::new("z").meta(), Some(EditorCommand::Undo)),
            (KeyChord::new("Z").ctrl().shift(), Some(EditorCommand::Redo)),
            (KeyChord::new("y").ctrl(), Some(EditorCommand::Redo)),
            (KeyChord::new("d").meta(), Some(EditorCommand::DuplicateSelected)),
            (KeyChord::new("Delete"), Some(EditorCommand::DeleteSelected)),
            (KeyChord::new("Backspace"), Some(EditorCommand::DeleteSelected)),
            (KeyChord::new("Backspace").in_text_field(), None),
            (KeyChord::new("z"), None),
            (KeyChord::new("q").ctrl(), None),
        ];
        for (chord, expected) in cases {
            assert_eq!(EditorCommand::from_key(&chord), expected, "{:?}", chord);
        }
    }

    #[test]
    fn test_form_event_edit() {
        let event: FormEvent =
            serde_json::from_value(json!({ "id": "n1", "data": { "label": "Hi" } })).unwrap();
        assert_eq!(
            event,
            FormEvent::Edit {
                id: "n1".to_string(),
                data: json!({ "label": "Hi" })
            }
        );
    }

    #[test]
    fn test_form_event_delete_sentinel_wins() {
        let event: FormEvent =
            serde_json::from_value(json!({ "id": "n1", "__delete": true, "data": {} })).unwrap();
        assert_eq!(event, FormEvent::Delete { id: "n1".to_string() });
        assert_eq!(event.id(), "n1");
    }

    #[test]
    fn test_form_event_requires_payload() {
        let result: Result<FormEvent, _> = serde_json::from_value(json!({ "id": "n1" }));
        assert!(result.is_err());
    }
}
