//! Client-side domain model.
//!
//! # Responsibility
//! - Define the note record shared by stores and the list controller.
//! - Keep list reconciliation rules free of any I/O.
//!
//! # Invariants
//! - Every note is identified by a store-assigned `NoteId`.
//! - Local state is only ever derived from store responses.

pub mod list;
pub mod note;
