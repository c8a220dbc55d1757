//! Wiring from configuration to a ready controller.
//!
//! # Invariants
//! - No store is constructed before the auth gate grants a session.

use crate::auth::{authenticate, AuthError, Session};
use crate::config::{AppConfig, BackendConfig};
use crate::service::note_list::NoteListController;
use crate::store::{GraphQlNoteStore, NoteStore, SqliteNoteStore, StoreError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Controller over whichever backend the configuration selects.
pub type DynNoteListController = NoteListController<Box<dyn NoteStore>>;

#[derive(Debug)]
pub enum BootstrapError {
    /// Auth gate refused a session.
    Auth(AuthError),
    /// Store could not be opened.
    Store(StoreError),
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Auth(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<AuthError> for BootstrapError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl From<StoreError> for BootstrapError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Builds the configured store for an already granted session.
pub fn open_store(
    config: &AppConfig,
    session: &Session,
) -> Result<Box<dyn NoteStore>, BootstrapError> {
    let store: Box<dyn NoteStore> = match &config.backend {
        BackendConfig::GraphQl { endpoint, .. } => {
            info!("event=store_open module=bootstrap status=ok backend=graphql");
            Box::new(GraphQlNoteStore::new(
                endpoint,
                session,
                config.request_timeout,
            )?)
        }
        BackendConfig::Sqlite { path } => {
            let store = SqliteNoteStore::open(path)?;
            info!(
                "event=store_open module=bootstrap status=ok backend=sqlite path={}",
                path.display()
            );
            Box::new(store)
        }
    };
    Ok(store)
}

/// Passes the auth gate, opens the store and returns an unloaded controller.
pub fn open_controller(
    config: &AppConfig,
) -> Result<(Session, DynNoteListController), BootstrapError> {
    let session = authenticate(config)?;
    let store = open_store(config, &session)?;
    Ok((session, NoteListController::new(store)))
}
