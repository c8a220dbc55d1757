//! External note store contract and implementations.
//!
//! # Responsibility
//! - Define the async CRUD contract the list controller depends on.
//! - Keep transport details (GraphQL over HTTP, SQLite) behind that contract.
//!
//! # Invariants
//! - `create` and `update` return the note exactly as the store now holds it.
//! - `update` and `delete` of an unknown id fail; they never upsert.

use crate::db::DbError;
use crate::model::note::{DeletedNote, Note, NoteId};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod graphql;
pub mod sqlite;

pub use graphql::GraphQlNoteStore;
pub use sqlite::SqliteNoteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a single store call.
///
/// Callers treat every variant as "the store call failed"; variants exist
/// for diagnostics only.
#[derive(Debug)]
pub enum StoreError {
    /// Request never produced an HTTP response (connect, timeout, TLS).
    Transport(String),
    /// Endpoint answered with a non-success status.
    Http { status: u16, body: String },
    /// GraphQL `errors` array was present and non-empty.
    GraphQl(Vec<String>),
    /// Response body did not have the expected shape.
    Decode(String),
    /// Target note does not exist in the store.
    NotFound(NoteId),
    /// Local database failure.
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "store transport failed: {message}"),
            Self::Http { status, body } => write!(f, "store returned HTTP {status}: {body}"),
            Self::GraphQl(messages) => write!(f, "graphql errors: {}", messages.join("; ")),
            Self::Decode(message) => write!(f, "unexpected store response: {message}"),
            Self::NotFound(id) => write!(f, "note not found in store: {id}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

/// Authoritative note collection the client mirrors.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Returns every note the store exposes, in store order.
    async fn list(&self) -> StoreResult<Vec<Note>>;
    /// Creates a note and returns it with its assigned id.
    async fn create(&self, name: &str) -> StoreResult<Note>;
    /// Replaces the name of an existing note.
    async fn update(&self, id: &str, name: &str) -> StoreResult<Note>;
    /// Deletes a note and confirms the removed id.
    async fn delete(&self, id: &str) -> StoreResult<DeletedNote>;
}

#[async_trait]
impl<S: NoteStore + ?Sized> NoteStore for Box<S> {
    async fn list(&self) -> StoreResult<Vec<Note>> {
        (**self).list().await
    }

    async fn create(&self, name: &str) -> StoreResult<Note> {
        (**self).create(name).await
    }

    async fn update(&self, id: &str, name: &str) -> StoreResult<Note> {
        (**self).update(id, name).await
    }

    async fn delete(&self, id: &str) -> StoreResult<DeletedNote> {
        (**self).delete(id).await
    }
}
