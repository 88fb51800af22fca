//! Note list transforms.
//!
//! # Responsibility
//! - Insert validated drafts at the head of the list.
//! - Remove notes by id, including legacy duplicates.
//!
//! # Invariants
//! - The list is ordered newest first; inserts always go to index 0.
//! - A rejected draft leaves the list untouched.
//! - Deletion keeps the relative order of the remaining notes.

use crate::model::note::{Note, NoteDraft, NoteId, NoteValidationError};

/// Validates `draft`, assigns a fresh id and prepends the new note.
///
/// Returns the created note's id.
pub fn add_note(
    notes: &mut Vec<Note>,
    draft: NoteDraft,
    created_at_ms: i64,
) -> Result<NoteId, NoteValidationError> {
    let mut note = draft.into_note(created_at_ms)?;
    while notes.iter().any(|existing| existing.id == note.id) {
        note.id = NoteId::from_created_at(created_at_ms);
    }

    let id = note.id.clone();
    notes.insert(0, note);
    Ok(id)
}

/// Removes every note carrying `id`. Returns how many were removed.
///
/// Legacy records can hold duplicate millisecond ids; all of them go.
pub fn delete_note(notes: &mut Vec<Note>, id: &NoteId) -> usize {
    let before = notes.len();
    notes.retain(|note| &note.id != id);
    before - notes.len()
}
