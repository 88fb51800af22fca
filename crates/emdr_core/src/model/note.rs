//! Session note domain model.
//!
//! # Responsibility
//! - Define the note record persisted inside `AppState.notes`.
//! - Validate user drafts before they become notes.
//!
//! # Invariants
//! - `title` of a created note is never empty or whitespace-only.
//! - `id` is assigned once at creation and never rewritten.
//! - Ids loaded from storage are opaque; only new ids are UUIDv7.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::{NoContext, Timestamp, Uuid};

/// Calendar format used for `Note::date`.
pub const NOTE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Stable identifier for one session note.
///
/// Serialized as a bare string so legacy millisecond ids stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Builds a time-ordered id from creation time in epoch milliseconds.
    ///
    /// Two ids created in the same millisecond still differ in their random
    /// tail.
    pub fn from_created_at(created_at_ms: i64) -> Self {
        let millis = created_at_ms.max(0) as u64;
        let timestamp = Timestamp::from_unix(
            NoContext,
            millis / 1_000,
            ((millis % 1_000) * 1_000_000) as u32,
        );
        Self(Uuid::new_v7(timestamp).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// User-authored session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Free text, may be empty.
    pub content: String,
    /// Calendar date, `YYYY-MM-DD` for notes created by this crate.
    pub date: String,
}

/// Validation errors for note drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
    InvalidDate(String),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title cannot be empty"),
            Self::InvalidDate(value) => {
                write!(f, "note date `{value}` is not a YYYY-MM-DD calendar date")
            }
        }
    }
}

impl Error for NoteValidationError {}

/// Candidate note as submitted by the notes form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    /// `None` or blank means "today" at creation time.
    pub date: Option<String>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            date: None,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Turns the draft into a note stamped with `created_at_ms`.
    ///
    /// # Errors
    /// - `EmptyTitle` when the trimmed title is empty.
    /// - `InvalidDate` when an explicit date is not `YYYY-MM-DD`.
    pub fn into_note(self, created_at_ms: i64) -> Result<Note, NoteValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }

        let date = match self.date.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => {
                NaiveDate::parse_from_str(value, NOTE_DATE_FORMAT)
                    .map_err(|_| NoteValidationError::InvalidDate(value.to_string()))?;
                value.to_string()
            }
            _ => calendar_date(created_at_ms),
        };

        Ok(Note {
            id: NoteId::from_created_at(created_at_ms),
            title: title.to_string(),
            content: self.content,
            date,
        })
    }
}

/// Formats epoch milliseconds as a UTC calendar date.
pub fn calendar_date(epoch_ms: i64) -> String {
    DateTime::from_timestamp_millis(epoch_ms)
        .unwrap_or_default()
        .date_naive()
        .format(NOTE_DATE_FORMAT)
        .to_string()
}
