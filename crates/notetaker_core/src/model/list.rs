//! Ordered in-memory note list and its reconciliation rules.
//!
//! # Responsibility
//! - Mirror the store's note collection after each successful mutation
//!   without re-reading it.
//!
//! # Invariants
//! - Created notes are prepended (most-recent-first).
//! - Updates replace exactly one element in place; other positions never move.
//! - Deletes filter by id, so duplicates (which should not occur) are removed too.

use crate::model::note::Note;

/// Ordered note collection owned by the list controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteList {
    items: Vec<Note>,
}

impl NoteList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from store output verbatim (no sort, no dedup).
    pub fn from_notes(items: Vec<Note>) -> Self {
        Self { items }
    }

    pub fn as_slice(&self) -> &[Note] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.items.iter().find(|note| note.id == id)
    }

    /// Returns the index of the first note with `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|note| note.id == id)
    }

    /// Replaces the whole collection with a fresh store listing.
    pub fn replace_all(&mut self, items: Vec<Note>) {
        self.items = items;
    }

    /// Inserts a store-created note at the front.
    pub fn prepend(&mut self, note: Note) {
        self.items.insert(0, note);
    }

    /// Swaps in an updated note at the position of its id.
    ///
    /// Returns `false` and leaves the list untouched when the id is absent.
    pub fn replace_in_place(&mut self, note: Note) -> bool {
        match self.position(&note.id) {
            Some(index) => {
                self.items[index] = note;
                true
            }
            None => false,
        }
    }

    /// Removes every note whose id equals `id`; returns how many were removed.
    pub fn remove_by_id(&mut self, id: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|note| note.id != id);
        before - self.items.len()
    }

    pub fn into_vec(self) -> Vec<Note> {
        self.items
    }
}

impl From<Vec<Note>> for NoteList {
    fn from(items: Vec<Note>) -> Self {
        Self::from_notes(items)
    }
}
