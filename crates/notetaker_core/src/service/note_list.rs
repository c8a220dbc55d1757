//! Note list controller.
//!
//! # Responsibility
//! - Own the loaded note list, the draft text and the edit slot.
//! - Call the store once per operation and reconcile the local list from
//!   the store's answer instead of re-reading the whole collection.
//!
//! # Invariants
//! - At most one store call is in flight per controller; overlapping calls
//!   get `ControllerError::Busy`.
//! - Local state changes only after a successful store answer.
//! - The state mutex is never held across an `.await`.
//! - Every failure is logged here and returned to the caller.

use crate::model::list::NoteList;
use crate::model::note::{validate_note_name, EditSlot, Note, NoteId};
use crate::store::{NoteStore, StoreError};
use log::{info, warn};
use parking_lot::Mutex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};

/// Failure of a controller operation.
#[derive(Debug)]
pub enum ControllerError {
    /// Submitted text is blank; nothing was sent.
    EmptyText,
    /// Another store call is still pending.
    Busy,
    /// Note passed to `begin_edit` is not in the loaded list.
    NoteNotFound(NoteId),
    /// Store updated a note that is no longer in the local list.
    NotInList(NoteId),
    /// Store call failed.
    Store(StoreError),
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "note text cannot be empty"),
            Self::Busy => write!(f, "another note operation is still in progress"),
            Self::NoteNotFound(id) => write!(f, "note not in list: {id}"),
            Self::NotInList(id) => {
                write!(f, "updated note {id} is no longer in the list; reload to see it")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ControllerError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// What a successful `submit` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(Note),
    Updated(Note),
}

/// Result of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Id confirmed by the store.
    pub id: NoteId,
    /// Local elements removed (0 when the note was not loaded).
    pub removed: usize,
}

/// Point-in-time copy of controller state for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerState {
    pub notes: NoteList,
    pub draft: String,
    pub edit_slot: EditSlot,
}

struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Client-side mirror of the store's note collection.
///
/// Methods take `&self` so one controller can be shared (e.g. behind `Arc`)
/// between UI tasks; the in-flight guard serializes store calls.
pub struct NoteListController<S: NoteStore> {
    store: S,
    state: Mutex<ControllerState>,
    in_flight: AtomicBool,
}

impl<S: NoteStore> NoteListController<S> {
    /// Creates an empty, idle controller over `store`. Call `load` next.
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: Mutex::new(ControllerState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Snapshot of the loaded notes, in display order.
    pub fn notes(&self) -> Vec<Note> {
        self.state.lock().notes.as_slice().to_vec()
    }

    pub fn draft(&self) -> String {
        self.state.lock().draft.clone()
    }

    pub fn edit_slot(&self) -> EditSlot {
        self.state.lock().edit_slot.clone()
    }

    pub fn snapshot(&self) -> ControllerState {
        self.state.lock().clone()
    }

    /// Whether a store call is currently pending.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Replaces the local list with the store's full listing.
    ///
    /// Draft and edit slot are not touched. Returns the number of notes loaded.
    pub async fn load(&self) -> Result<usize, ControllerError> {
        let _in_flight = self.begin("notes_load")?;
        match self.store.list().await {
            Ok(notes) => {
                let count = notes.len();
                self.state.lock().notes.replace_all(notes);
                info!("event=notes_load module=controller status=ok count={count}");
                Ok(count)
            }
            Err(err) => {
                warn!("event=notes_load module=controller status=error error={err}");
                Err(err.into())
            }
        }
    }

    /// Mirrors the text box contents.
    pub fn set_draft(&self, text: impl Into<String>) -> Result<(), ControllerError> {
        let mut state = self.state.lock();
        self.ensure_idle("draft_set")?;
        state.draft = text.into();
        Ok(())
    }

    /// Starts editing `note`: the slot takes its id and the draft the text
    /// of the loaded note with that id.
    ///
    /// # Errors
    /// - `NoteNotFound` when `note` is not in the loaded list.
    /// - `Busy` while a store call is pending.
    pub fn begin_edit(&self, note: &Note) -> Result<(), ControllerError> {
        let mut state = self.state.lock();
        self.ensure_idle("edit_begin")?;
        // The loaded entry wins over a possibly stale caller copy.
        let Some(name) = state.notes.get(&note.id).map(|loaded| loaded.name.clone()) else {
            warn!(
                "event=edit_begin module=controller status=error error_code=note_not_found note_id={}",
                note.id
            );
            return Err(ControllerError::NoteNotFound(note.id.clone()));
        };
        state.draft = name;
        state.edit_slot = EditSlot::Editing(note.id.clone());
        info!("event=edit_begin module=controller status=ok note_id={}", note.id);
        Ok(())
    }

    /// Abandons the current edit without calling the store.
    ///
    /// Clears the draft. No-op when idle.
    pub fn cancel_edit(&self) -> Result<(), ControllerError> {
        let mut state = self.state.lock();
        self.ensure_idle("edit_cancel")?;
        if let EditSlot::Editing(id) = std::mem::take(&mut state.edit_slot) {
            state.draft.clear();
            info!("event=edit_cancel module=controller status=ok note_id={id}");
        }
        Ok(())
    }

    /// Submits `text` as the draft.
    ///
    /// Updates the edited note when the edit slot points at a loaded note,
    /// otherwise creates a new one. On success the draft and the edit slot
    /// are cleared; on failure both are kept so the user can retry.
    pub async fn submit(
        &self,
        text: impl Into<String>,
    ) -> Result<SubmitOutcome, ControllerError> {
        let text = text.into();
        let _in_flight = self.begin("note_submit")?;

        let target = {
            let mut state = self.state.lock();
            state.draft = text.clone();
            state
                .edit_slot
                .editing_id()
                .filter(|id| state.notes.contains(id))
                .map(str::to_string)
        };

        reject_blank("note_submit", &text)?;

        let outcome = match target {
            Some(id) => SubmitOutcome::Updated(self.update_note(&id, &text).await?),
            None => SubmitOutcome::Created(self.create_note(&text).await?),
        };

        let mut state = self.state.lock();
        state.draft.clear();
        state.edit_slot = EditSlot::Idle;
        Ok(outcome)
    }

    /// Creates a note and prepends the store's answer.
    pub async fn apply_create(&self, text: &str) -> Result<Note, ControllerError> {
        let _in_flight = self.begin("note_create")?;
        reject_blank("note_create", text)?;
        self.create_note(text).await
    }

    /// Renames note `id` and swaps the store's answer in at its position.
    ///
    /// When the note being edited is updated, the edit completes: the slot
    /// returns to idle and the draft is cleared.
    ///
    /// # Errors
    /// - `NotInList` when the store succeeded but the id is no longer loaded;
    ///   nothing is inserted.
    pub async fn apply_update(&self, id: &str, text: &str) -> Result<Note, ControllerError> {
        let _in_flight = self.begin("note_update")?;
        reject_blank("note_update", text)?;
        let note = self.update_note(id, text).await?;

        let mut state = self.state.lock();
        if state.edit_slot.editing_id() == Some(id) {
            state.edit_slot = EditSlot::Idle;
            state.draft.clear();
        }
        Ok(note)
    }

    /// Deletes note `id` and filters the confirmed id out of the list.
    pub async fn apply_delete(&self, id: &str) -> Result<DeleteOutcome, ControllerError> {
        let _in_flight = self.begin("note_delete")?;
        match self.store.delete(id).await {
            Ok(deleted) => {
                let removed = self.state.lock().notes.remove_by_id(&deleted.id);
                info!(
                    "event=note_delete module=controller status=ok note_id={} removed={removed}",
                    deleted.id
                );
                Ok(DeleteOutcome {
                    id: deleted.id,
                    removed,
                })
            }
            Err(err) => {
                warn!("event=note_delete module=controller status=error note_id={id} error={err}");
                Err(err.into())
            }
        }
    }

    async fn create_note(&self, text: &str) -> Result<Note, ControllerError> {
        match self.store.create(text).await {
            Ok(note) => {
                self.state.lock().notes.prepend(note.clone());
                info!(
                    "event=note_create module=controller status=ok note_id={} name_chars={}",
                    note.id,
                    note.name.chars().count()
                );
                Ok(note)
            }
            Err(err) => {
                warn!("event=note_create module=controller status=error error={err}");
                Err(err.into())
            }
        }
    }

    async fn update_note(&self, id: &str, text: &str) -> Result<Note, ControllerError> {
        let note = match self.store.update(id, text).await {
            Ok(note) => note,
            Err(err) => {
                warn!("event=note_update module=controller status=error note_id={id} error={err}");
                return Err(err.into());
            }
        };

        let mut state = self.state.lock();
        if !state.notes.replace_in_place(note.clone()) {
            if state.edit_slot.editing_id() == Some(note.id.as_str()) {
                state.edit_slot = EditSlot::Idle;
            }
            warn!(
                "event=note_update module=controller status=error error_code=not_in_list note_id={}",
                note.id
            );
            return Err(ControllerError::NotInList(note.id));
        }
        info!(
            "event=note_update module=controller status=ok note_id={} name_chars={}",
            note.id,
            note.name.chars().count()
        );
        Ok(note)
    }

    fn begin(&self, operation: &'static str) -> Result<InFlight<'_>, ControllerError> {
        match self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Ok(InFlight {
                flag: &self.in_flight,
            }),
            Err(_) => {
                warn!("event={operation} module=controller status=error error_code=busy");
                Err(ControllerError::Busy)
            }
        }
    }

    fn ensure_idle(&self, operation: &'static str) -> Result<(), ControllerError> {
        if self.is_busy() {
            warn!("event={operation} module=controller status=error error_code=busy");
            return Err(ControllerError::Busy);
        }
        Ok(())
    }
}

fn reject_blank(operation: &'static str, text: &str) -> Result<(), ControllerError> {
    validate_note_name(text).map_err(|err| {
        warn!("event={operation} module=controller status=error error_code=empty_text error={err}");
        ControllerError::EmptyText
    })
}
