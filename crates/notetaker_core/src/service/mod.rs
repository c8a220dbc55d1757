//! Client use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into UI-level note operations.
//! - Keep the UI layer decoupled from transport details.

pub mod note_list;
