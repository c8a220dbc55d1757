//! Core client logic for Note Taker.
//! Holds the note list controller, the store contract and its backends.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use auth::{authenticate, AuthError, Credential, Session};
pub use bootstrap::{open_controller, open_store, BootstrapError, DynNoteListController};
pub use config::{AppConfig, BackendConfig, ConfigError};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, LogSettings, LogTarget, LoggingError,
};
pub use model::list::NoteList;
pub use model::note::{DeletedNote, EditSlot, Note, NoteId, NoteValidationError};
pub use service::note_list::{
    ControllerError, ControllerState, DeleteOutcome, NoteListController, SubmitOutcome,
};
pub use store::{GraphQlNoteStore, NoteStore, SqliteNoteStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
