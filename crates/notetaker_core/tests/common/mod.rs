use async_trait::async_trait;
use notetaker_core::{DeletedNote, Note, NoteStore, StoreError, StoreResult};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Create,
    Update,
    Delete,
}

/// In-memory store with sequential ids and per-operation failure switches.
pub struct ScriptedStore {
    notes: Mutex<Vec<Note>>,
    next_id: AtomicUsize,
    failing: Mutex<HashSet<Op>>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedStore {
    /// Seeds the remote collection; new ids continue after the seed count.
    pub fn with_notes(pairs: &[(&str, &str)]) -> Self {
        Self {
            notes: Mutex::new(pairs.iter().map(|(id, name)| Note::new(*id, *name)).collect()),
            next_id: AtomicUsize::new(pairs.len() + 1),
            failing: Mutex::new(HashSet::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::with_notes(&[])
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.failing.lock().remove(&op);
    }

    /// Adds a note server-side without the controller knowing.
    pub fn insert_remote(&self, note: Note) {
        self.notes.lock().push(note);
    }

    /// Removes a note server-side without the controller knowing.
    pub fn remove_remote(&self, id: &str) {
        self.notes.lock().retain(|note| note.id != id);
    }

    pub fn remote_notes(&self) -> Vec<Note> {
        self.notes.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, op: Op) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().contains(&op) {
            return Err(StoreError::Transport(format!("scripted {op:?} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl NoteStore for ScriptedStore {
    async fn list(&self) -> StoreResult<Vec<Note>> {
        self.check(Op::List)?;
        Ok(self.notes.lock().clone())
    }

    async fn create(&self, name: &str) -> StoreResult<Note> {
        self.check(Op::Create)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let note = Note::new(id, name);
        self.notes.lock().insert(0, note.clone());
        Ok(note)
    }

    async fn update(&self, id: &str, name: &str) -> StoreResult<Note> {
        self.check(Op::Update)?;
        let mut notes = self.notes.lock();
        let note = notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        note.name = name.to_string();
        Ok(note.clone())
    }

    async fn delete(&self, id: &str) -> StoreResult<DeletedNote> {
        self.check(Op::Delete)?;
        let mut notes = self.notes.lock();
        let before = notes.len();
        notes.retain(|note| note.id != id);
        if notes.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(DeletedNote { id: id.to_string() })
    }
}

/// Store whose `create` parks until `release` is notified.
#[allow(dead_code)]
pub struct GatedStore {
    pub inner: ScriptedStore,
    pub entered: Notify,
    pub release: Notify,
}

#[allow(dead_code)]
impl GatedStore {
    pub fn new(inner: ScriptedStore) -> Self {
        Self {
            inner,
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl NoteStore for GatedStore {
    async fn list(&self) -> StoreResult<Vec<Note>> {
        self.inner.list().await
    }

    async fn create(&self, name: &str) -> StoreResult<Note> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.create(name).await
    }

    async fn update(&self, id: &str, name: &str) -> StoreResult<Note> {
        self.inner.update(id, name).await
    }

    async fn delete(&self, id: &str) -> StoreResult<DeletedNote> {
        self.inner.delete(id).await
    }
}
