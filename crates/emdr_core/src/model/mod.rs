//! Domain model for the dots view and session notes.
//!
//! # Responsibility
//! - Define canonical data structures used by the state store.
//! - Keep wire naming (`AppState`) separate from in-memory settings.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion removes the note; there are no tombstones.

pub mod app_state;
pub mod note;
pub mod settings;
