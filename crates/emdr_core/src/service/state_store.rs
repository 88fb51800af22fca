//! Client state store: in-memory settings + notes with debounced persistence.
//!
//! # Responsibility
//! - Own the animation settings and the notes list for one page instance.
//! - Restore state from key-value storage, with a legacy notes fallback.
//! - Schedule a debounced write after every state change.
//!
//! # Invariants
//! - Storage failures never escape; they are logged and the session keeps
//!   running in memory.
//! - At most one save timer is live; each change restarts the quiet window.
//! - Setters that leave state unchanged do not schedule a save.
//! - Numeric settings are clamped into their documented bounds.

use crate::clock::Clock;
use crate::config::StoreConfig;
use crate::model::app_state::AppState;
use crate::model::note::{Note, NoteDraft, NoteId, NoteValidationError};
use crate::model::settings::{
    clamp_amplitude, clamp_gap, clamp_speed, DotColor, Settings, SettingsError,
};
use crate::schedule::{Debouncer, ManualScheduler, TaskScheduler, TimerId};
use crate::service::note_ops;
use crate::storage::{KeyValueStore, StorageError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Failure reading persisted state. Treated as "no saved state".
#[derive(Debug)]
pub enum StorageReadError {
    Inaccessible(StorageError),
    Malformed {
        key: String,
        source: serde_json::Error,
    },
}

impl Display for StorageReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inaccessible(err) => write!(f, "{err}"),
            Self::Malformed { key, source } => {
                write!(f, "persisted record `{key}` is malformed: {source}")
            }
        }
    }
}

impl Error for StorageReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Inaccessible(err) => Some(err),
            Self::Malformed { source, .. } => Some(source),
        }
    }
}

impl From<StorageError> for StorageReadError {
    fn from(value: StorageError) -> Self {
        Self::Inaccessible(value)
    }
}

/// Failure writing state. Dropped after logging; the next change retries.
#[derive(Debug)]
pub enum StorageWriteError {
    Serialize(serde_json::Error),
    Backend(StorageError),
}

impl Display for StorageWriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to serialize app state: {err}"),
            Self::Backend(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageWriteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Backend(err) => Some(err),
        }
    }
}

impl From<StorageError> for StorageWriteError {
    fn from(value: StorageError) -> Self {
        Self::Backend(value)
    }
}

/// Result of `StateStore::load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The primary record was applied.
    Restored,
    /// Only the legacy notes record existed; carries the adopted note count.
    LegacyNotes(usize),
    /// Nothing usable was found; defaults remain in effect.
    Defaults,
}

impl LoadOutcome {
    /// Whether the primary record was restored.
    pub fn is_restored(&self) -> bool {
        matches!(self, Self::Restored)
    }
}

/// Owned application state plus its persistence plumbing.
pub struct StateStore<S, T, C> {
    storage: S,
    scheduler: T,
    clock: C,
    config: StoreConfig,
    settings: Settings,
    notes: Vec<Note>,
    debouncer: Debouncer,
}

impl<S: KeyValueStore, T: TaskScheduler, C: Clock> StateStore<S, T, C> {
    /// Creates a store with default settings, no notes and default keys.
    pub fn new(storage: S, scheduler: T, clock: C) -> Self {
        Self::with_config(storage, scheduler, clock, StoreConfig::default())
    }

    pub fn with_config(storage: S, scheduler: T, clock: C, config: StoreConfig) -> Self {
        let debouncer = Debouncer::new(config.save_debounce());
        Self {
            storage,
            scheduler,
            clock,
            config,
            settings: Settings::default(),
            notes: Vec::new(),
            debouncer,
        }
    }

    /// Restores persisted state.
    ///
    /// Reads the primary record first. Only when it is absent, adopts the
    /// legacy notes-only record and schedules a save that migrates it into
    /// the primary record. Read failures leave the current state untouched.
    pub fn load(&mut self) -> LoadOutcome {
        match self.read_state() {
            Ok(Some(state)) => {
                let (settings, notes, color_error) = state.into_parts();
                if let Some(err) = color_error {
                    warn!(
                        "event=state_load module=store status=degraded reason=invalid_color error={}",
                        err
                    );
                }
                self.settings = settings;
                self.notes = notes;
                info!(
                    "event=state_load module=store status=ok source=primary notes={}",
                    self.notes.len()
                );
                return LoadOutcome::Restored;
            }
            Ok(None) => {}
            Err(err) => {
                warn!(
                    "event=state_load module=store status=error source=primary error={}",
                    err
                );
                return LoadOutcome::Defaults;
            }
        }

        match self.read_legacy_notes() {
            Ok(Some(notes)) => {
                let count = notes.len();
                self.notes = notes;
                info!(
                    "event=state_load module=store status=ok source=legacy notes={}",
                    count
                );
                self.mark_dirty();
                LoadOutcome::LegacyNotes(count)
            }
            Ok(None) => {
                debug!("event=state_load module=store status=empty");
                LoadOutcome::Defaults
            }
            Err(err) => {
                warn!(
                    "event=state_load module=store status=error source=legacy error={}",
                    err
                );
                LoadOutcome::Defaults
            }
        }
    }

    /// Writes the current state under the primary key.
    ///
    /// Returns whether the write succeeded. Failures are logged only.
    pub fn save(&mut self) -> bool {
        match self.write_state() {
            Ok(bytes) => {
                debug!(
                    "event=state_save module=store status=ok bytes={} notes={}",
                    bytes,
                    self.notes.len()
                );
                true
            }
            Err(err) => {
                warn!("event=state_save module=store status=error error={}", err);
                false
            }
        }
    }

    /// Host callback for an elapsed timer. Saves only for the live timer.
    pub fn on_timer_fired(&mut self, id: TimerId) -> bool {
        if self.debouncer.fire(id) {
            self.save()
        } else {
            debug!("event=timer_fired module=store status=ignored timer={id}");
            false
        }
    }

    /// Writes a pending save immediately. Returns `false` when nothing was
    /// pending or the write failed.
    pub fn flush(&mut self) -> bool {
        if self.debouncer.cancel(&mut self.scheduler) {
            self.save()
        } else {
            false
        }
    }

    /// Cancels the pending save timer without writing.
    pub fn teardown(&mut self) {
        if self.debouncer.cancel(&mut self.scheduler) {
            debug!("event=store_teardown module=store status=ok dropped_pending_save=true");
        }
    }

    pub fn has_pending_save(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Notes, newest first.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    /// Persistable snapshot of the current state.
    pub fn snapshot(&self) -> AppState {
        AppState::capture(&self.settings, &self.notes)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Sets the dot gap, clamped to bounds. Returns the applied value.
    pub fn set_gap(&mut self, gap: i64) -> i64 {
        let next = clamp_gap(gap);
        if next != self.settings.gap {
            self.settings.gap = next;
            self.mark_dirty();
        }
        self.settings.gap
    }

    pub fn adjust_gap(&mut self, delta: i64) -> i64 {
        self.set_gap(self.settings.gap.saturating_add(delta))
    }

    /// Sets the amplitude, clamped to bounds. Returns the applied value.
    pub fn set_amplitude(&mut self, amplitude: i64) -> i64 {
        let next = clamp_amplitude(amplitude);
        if next != self.settings.amplitude {
            self.settings.amplitude = next;
            self.mark_dirty();
        }
        self.settings.amplitude
    }

    pub fn adjust_amplitude(&mut self, delta: i64) -> i64 {
        self.set_amplitude(self.settings.amplitude.saturating_add(delta))
    }

    /// Sets the speed, clamped to bounds. Non-finite input is ignored.
    /// Returns the applied value.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        match clamp_speed(speed) {
            Some(next) if next != self.settings.speed => {
                self.settings.speed = next;
                self.mark_dirty();
            }
            Some(_) => {}
            None => warn!("event=settings_update module=store status=rejected field=speed"),
        }
        self.settings.speed
    }

    pub fn adjust_speed(&mut self, delta: f64) -> f64 {
        self.set_speed(self.settings.speed + delta)
    }

    /// Sets the dot color from a `#rgb`/`#rrggbb` literal.
    pub fn set_dot_color(&mut self, color: &str) -> Result<(), SettingsError> {
        let next = DotColor::parse(color)?;
        if next != self.settings.dot_color {
            self.settings.dot_color = next;
            self.mark_dirty();
        }
        Ok(())
    }

    /// Adds a note at the head of the list.
    ///
    /// # Errors
    /// - Draft validation errors; the notes list is left unchanged.
    pub fn add_note(&mut self, draft: NoteDraft) -> Result<NoteId, NoteValidationError> {
        let id = note_ops::add_note(&mut self.notes, draft, self.clock.now_epoch_ms())?;
        info!(
            "event=note_add module=store status=ok notes={}",
            self.notes.len()
        );
        self.mark_dirty();
        Ok(id)
    }

    /// Deletes every note with `id`. Returns whether anything was removed.
    pub fn delete_note(&mut self, id: &NoteId) -> bool {
        let removed = note_ops::delete_note(&mut self.notes, id);
        if removed == 0 {
            return false;
        }
        info!(
            "event=note_delete module=store status=ok removed={} notes={}",
            removed,
            self.notes.len()
        );
        self.mark_dirty();
        true
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    /// Releases the storage backend, dropping any pending save.
    pub fn into_storage(mut self) -> S {
        self.teardown();
        self.storage
    }

    fn mark_dirty(&mut self) {
        if let Err(err) = self.debouncer.trigger(&mut self.scheduler) {
            warn!(
                "event=save_schedule module=store status=error fallback=immediate error={}",
                err
            );
            self.save();
        }
    }

    fn read_state(&self) -> Result<Option<AppState>, StorageReadError> {
        read_json(&self.storage, &self.config.state_key)
    }

    fn read_legacy_notes(&self) -> Result<Option<Vec<Note>>, StorageReadError> {
        read_json(&self.storage, &self.config.legacy_notes_key)
    }

    fn write_state(&mut self) -> Result<usize, StorageWriteError> {
        let encoded =
            serde_json::to_string(&self.snapshot()).map_err(StorageWriteError::Serialize)?;
        self.storage.set(&self.config.state_key, &encoded)?;
        Ok(encoded.len())
    }
}

impl<S: KeyValueStore, C: Clock> StateStore<S, ManualScheduler, C> {
    /// Advances virtual time and delivers elapsed timers.
    ///
    /// Returns the number of successful saves.
    pub fn advance_time(&mut self, by: Duration) -> usize {
        let fired = self.scheduler.advance(by);
        fired
            .into_iter()
            .filter(|id| self.on_timer_fired(*id))
            .count()
    }
}

fn read_json<S, V>(storage: &S, key: &str) -> Result<Option<V>, StorageReadError>
where
    S: KeyValueStore + ?Sized,
    V: serde::de::DeserializeOwned,
{
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageReadError::Malformed {
            key: key.to_string(),
            source,
        })
}
