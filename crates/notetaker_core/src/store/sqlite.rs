//! SQLite-backed note store.
//!
//! Stands in for the managed backend in local runs and integration tests.
//! It is the authoritative copy, not a client cache.
//!
//! # Invariants
//! - Ids are UUID v4 strings generated here, never by callers.
//! - `list` orders by `created_at DESC, rowid DESC`.
//! - `update`/`delete` of an unknown id return `StoreError::NotFound`.

use crate::db::{open_db, open_db_in_memory};
use crate::model::note::{DeletedNote, Note};
use crate::store::{NoteStore, StoreError, StoreResult};
use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use uuid::Uuid;

/// Note store over one migrated SQLite connection.
pub struct SqliteNoteStore {
    conn: Mutex<Connection>,
}

impl SqliteNoteStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens the database file at `path`, creating and migrating it if needed.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    fn fetch(conn: &Connection, id: &str) -> StoreResult<Option<Note>> {
        let note = conn
            .query_row(
                "SELECT id, name FROM notes WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Note {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(note)
    }
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn list(&self) -> StoreResult<Vec<Note>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT id, name FROM notes ORDER BY created_at DESC, rowid DESC;")?;
        let rows = stmt.query_map([], |row| {
            Ok(Note {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut notes = Vec::new();
        for row in rows {
            notes.push(row?);
        }
        debug!("event=store_list module=sqlite status=ok count={}", notes.len());
        Ok(notes)
    }

    async fn create(&self, name: &str) -> StoreResult<Note> {
        let id = Uuid::new_v4().to_string();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO notes (id, name) VALUES (?1, ?2);",
            params![id, name],
        )?;
        debug!("event=store_create module=sqlite status=ok note_id={id}");
        Self::fetch(&conn, &id)?.ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: &str, name: &str) -> StoreResult<Note> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE notes
             SET name = ?1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![name, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        debug!("event=store_update module=sqlite status=ok note_id={id}");
        Self::fetch(&conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &str) -> StoreResult<DeletedNote> {
        let conn = self.conn.lock();
        let changed = conn.execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        debug!("event=store_delete module=sqlite status=ok note_id={id}");
        Ok(DeletedNote { id: id.to_string() })
    }
}
