//! Note domain model.
//!
//! # Responsibility
//! - Define the `Note` record exchanged with every store implementation.
//! - Define the edit-slot state used by the list controller.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes afterwards.
//! - `id` is unique within one loaded note list.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque store-assigned note identifier.
///
/// Kept as a type alias because stores differ in id shape (UUID, ULID, ...)
/// and the client never interprets it.
pub type NoteId = String;

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Store-assigned stable identifier.
    pub id: NoteId,
    /// Free-form note text.
    pub name: String,
}

impl Note {
    pub fn new(id: impl Into<NoteId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Delete confirmation returned by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedNote {
    /// Id the store reports as removed.
    pub id: NoteId,
}

/// Which note, if any, the draft currently edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditSlot {
    /// Draft creates a new note on submit.
    #[default]
    Idle,
    /// Draft replaces the name of the note with this id on submit.
    Editing(NoteId),
}

impl EditSlot {
    /// Returns the edited note id when in `Editing` state.
    pub fn editing_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Editing(id) => Some(id.as_str()),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Note text validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Note text is empty or whitespace only.
    EmptyName,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "note text cannot be empty"),
        }
    }
}

impl Error for NoteValidationError {}

/// Validates note text before it is sent to a store.
///
/// Only presence of text is checked; content is stored verbatim.
pub fn validate_note_name(name: &str) -> Result<(), NoteValidationError> {
    if name.trim().is_empty() {
        return Err(NoteValidationError::EmptyName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_note_name, EditSlot, Note, NoteValidationError};

    #[test]
    fn note_serializes_with_store_field_names() {
        let note = Note::new("n-1", "buy milk");
        let json = serde_json::to_value(&note).expect("note should serialize");
        assert_eq!(json, serde_json::json!({ "id": "n-1", "name": "buy milk" }));
    }

    #[test]
    fn edit_slot_defaults_to_idle() {
        let slot = EditSlot::default();
        assert!(slot.is_idle());
        assert_eq!(slot.editing_id(), None);
        assert_eq!(EditSlot::Editing("7".into()).editing_id(), Some("7"));
    }

    #[test]
    fn validation_rejects_blank_text_only() {
        assert_eq!(
            validate_note_name("  \n\t"),
            Err(NoteValidationError::EmptyName)
        );
        assert!(validate_note_name(" keep surrounding spaces ").is_ok());
    }
}
