use emdr_core::model::settings::{
    AMPLITUDE_MAX, AMPLITUDE_MIN, GAP_MAX, GAP_MIN, SPEED_MAX, SPEED_MIN,
};
use emdr_core::{
    FixedClock, KeyValueStore, LoadOutcome, ManualScheduler, MemoryStore, NoteDraft, NoteId,
    NoteValidationError, ScheduleError, Settings, SettingsError, StateStore, StorageError,
    StorageResult, TaskScheduler, TimerId,
};
use std::time::Duration;

const STATE_KEY: &str = "emdr-app-state";
const LEGACY_KEY: &str = "emdr-notes";
// 2024-03-05T10:00:00Z
const NOW_MS: i64 = 1_709_632_800_000;

type TestStore<S> = StateStore<S, ManualScheduler, FixedClock>;

fn store_on<S: KeyValueStore>(storage: S) -> TestStore<S> {
    StateStore::new(storage, ManualScheduler::new(), FixedClock::new(NOW_MS))
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Backend that refuses every write until `healthy` is set.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    healthy: bool,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if !self.healthy {
            return Err(StorageError::Unavailable("storage disabled".to_string()));
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.inner.remove(key)
    }
}

/// Backend whose reads always fail.
struct UnreadableStore;

impl KeyValueStore for UnreadableStore {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Unavailable("access denied".to_string()))
    }

    fn set(&mut self, _key: &str, _value: &str) -> StorageResult<()> {
        Ok(())
    }

    fn remove(&mut self, _key: &str) -> StorageResult<()> {
        Ok(())
    }
}

/// Host timer facility that refuses every request.
struct RefusingScheduler;

impl TaskScheduler for RefusingScheduler {
    fn schedule(&mut self, _delay: Duration) -> Result<TimerId, ScheduleError> {
        Err(ScheduleError::Rejected("timers disabled".to_string()))
    }

    fn cancel(&mut self, _id: TimerId) {}
}

#[test]
fn save_then_load_restores_every_field() {
    let mut store = store_on(MemoryStore::new());
    store.set_gap(140);
    store.set_amplitude(44);
    store.set_speed(2.5);
    store.set_dot_color("#ff0000").unwrap();
    store
        .add_note(NoteDraft::new("Session 1", "felt calm").with_date("2024-03-01"))
        .unwrap();
    store.add_note(NoteDraft::new("Session 2", "")).unwrap();
    assert!(store.save());
    let expected = store.snapshot();

    let mut restored = store_on(store.into_storage());
    assert_eq!(restored.load(), LoadOutcome::Restored);
    assert_eq!(restored.snapshot(), expected);
    assert_eq!(restored.settings().dot_color.as_str(), "#ff0000");
    assert_eq!(restored.notes()[1].date, "2024-03-01");
    assert!(!restored.has_pending_save());
}

#[test]
fn saving_unchanged_state_twice_writes_identical_record() {
    let mut store = store_on(MemoryStore::new());
    store.add_note(NoteDraft::new("Session 1", "")).unwrap();

    assert!(store.save());
    let first = store.storage().get(STATE_KEY).unwrap().unwrap();
    assert!(store.save());
    let second = store.storage().get(STATE_KEY).unwrap().unwrap();
    assert_eq!(first, second);
}

#[test]
fn burst_of_changes_within_window_produces_one_write() {
    let mut store = store_on(MemoryStore::new());

    for step in 0..10 {
        store.set_gap(20 + step * 10);
        store.advance_time(ms(40));
    }
    assert_eq!(store.storage().write_count(), 0);
    assert!(store.has_pending_save());

    assert_eq!(store.advance_time(ms(500)), 1);
    assert_eq!(store.storage().write_count(), 1);
    assert!(!store.has_pending_save());

    let record: serde_json::Value =
        serde_json::from_str(&store.storage().get(STATE_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(record["gap"], 110);
}

#[test]
fn each_change_restarts_the_quiet_window() {
    let mut store = store_on(MemoryStore::new());
    store.set_amplitude(20);
    store.advance_time(ms(400));
    store.set_amplitude(25);
    store.advance_time(ms(400));
    assert_eq!(store.storage().write_count(), 0);

    store.advance_time(ms(100));
    assert_eq!(store.storage().write_count(), 1);
}

#[test]
fn stale_timer_id_does_not_trigger_save() {
    let mut store = store_on(MemoryStore::new());
    store.set_gap(50);
    store.set_gap(60);

    // The first timer was cancelled by the second change.
    assert!(!store.on_timer_fired(TimerId(1)));
    assert!(!store.on_timer_fired(TimerId(999)));
    assert!(store.has_pending_save());
    assert_eq!(store.storage().write_count(), 0);
}

#[test]
fn add_note_with_blank_title_is_rejected_without_side_effects() {
    let mut store = store_on(MemoryStore::new());
    store.add_note(NoteDraft::new("Session 1", "")).unwrap();
    store.flush();
    let before = store.notes().to_vec();

    let err = store.add_note(NoteDraft::new("   ", "content")).unwrap_err();
    assert_eq!(err, NoteValidationError::EmptyTitle);
    assert_eq!(store.notes(), before.as_slice());
    assert!(!store.has_pending_save());
}

#[test]
fn add_note_prepends_with_fresh_id() {
    let mut store = store_on(MemoryStore::new());
    let first = store.add_note(NoteDraft::new("Earlier", "")).unwrap();
    let old_len = store.notes().len();

    let id = store.add_note(NoteDraft::new("Session 1", "notes")).unwrap();
    assert_eq!(store.notes().len(), old_len + 1);
    assert_eq!(store.notes()[0].id, id);
    assert_eq!(store.notes()[0].title, "Session 1");
    assert_eq!(store.notes()[0].date, "2024-03-05");
    assert_ne!(id, first);
    assert_eq!(store.note(&first).map(|note| note.title.as_str()), Some("Earlier"));
}

#[test]
fn note_dates_follow_the_injected_clock() {
    let clock = FixedClock::new(NOW_MS);
    let mut store = StateStore::new(MemoryStore::new(), ManualScheduler::new(), &clock);
    store.add_note(NoteDraft::new("Day one", "")).unwrap();

    clock.advance(24 * 60 * 60 * 1_000);
    store.add_note(NoteDraft::new("Day two", "")).unwrap();

    assert_eq!(store.notes()[0].date, "2024-03-06");
    assert_eq!(store.notes()[1].date, "2024-03-05");
}

#[test]
fn delete_note_removes_exactly_one_and_keeps_order() {
    let mut store = store_on(MemoryStore::new());
    let a = store.add_note(NoteDraft::new("a", "")).unwrap();
    let b = store.add_note(NoteDraft::new("b", "")).unwrap();
    let c = store.add_note(NoteDraft::new("c", "")).unwrap();
    store.flush();

    assert!(store.delete_note(&b));
    let ids: Vec<NoteId> = store.notes().iter().map(|note| note.id.clone()).collect();
    assert_eq!(ids, vec![c, a]);
    assert!(store.has_pending_save());

    store.flush();
    assert!(!store.delete_note(&NoteId::from("missing")));
    assert!(!store.has_pending_save());
}

#[test]
fn legacy_notes_are_adopted_when_primary_record_is_absent() {
    let mut storage = MemoryStore::new();
    storage
        .set(
            LEGACY_KEY,
            r#"[
                {"id":"1700000000000","title":"Old session","content":"x","date":"2023-11-14"},
                {"id":"1690000000000","title":"Older","content":"","date":"2023-07-22"}
            ]"#,
        )
        .unwrap();

    let mut store = store_on(storage);
    assert_eq!(store.load(), LoadOutcome::LegacyNotes(2));
    assert_eq!(store.settings(), &Settings::default());
    assert_eq!(store.notes()[0].id.as_str(), "1700000000000");
    assert_eq!(store.notes()[1].title, "Older");

    // Adoption migrates into the primary record on the next quiet window.
    assert_eq!(store.advance_time(ms(500)), 1);
    let mut reopened = store_on(store.into_storage());
    assert_eq!(reopened.load(), LoadOutcome::Restored);
    assert_eq!(reopened.notes().len(), 2);
}

#[test]
fn missing_records_leave_defaults() {
    let mut store = store_on(MemoryStore::new());
    let outcome = store.load();
    assert_eq!(outcome, LoadOutcome::Defaults);
    assert!(!outcome.is_restored());
    assert_eq!(store.settings(), &Settings::default());
    assert!(store.notes().is_empty());
}

#[test]
fn unreadable_storage_falls_back_to_defaults() {
    let mut store = store_on(UnreadableStore);
    assert_eq!(store.load(), LoadOutcome::Defaults);
    store.set_gap(60);
    assert_eq!(store.settings().gap, 60);
}

#[test]
fn wrongly_typed_record_is_treated_as_absent_state() {
    let mut storage = MemoryStore::new();
    storage
        .set(STATE_KEY, r#"{"gap":"wide","amplitude":20}"#)
        .unwrap();

    let mut store = store_on(storage);
    assert_eq!(store.load(), LoadOutcome::Defaults);
    assert_eq!(store.settings(), &Settings::default());
}

#[test]
fn loaded_values_are_clamped_and_bad_color_degrades_to_default() {
    let mut storage = MemoryStore::new();
    storage
        .set(
            STATE_KEY,
            r#"{"gap":900,"amplitude":1,"speed":40.0,"dotColor":"blue","notes":[]}"#,
        )
        .unwrap();

    let mut store = store_on(storage);
    assert_eq!(store.load(), LoadOutcome::Restored);
    assert_eq!(store.settings().gap, GAP_MAX);
    assert_eq!(store.settings().amplitude, AMPLITUDE_MIN);
    assert_eq!(store.settings().speed, SPEED_MAX);
    assert_eq!(store.settings().dot_color, Settings::default().dot_color);
}

#[test]
fn record_with_missing_fields_uses_defaults_for_them() {
    let mut storage = MemoryStore::new();
    storage.set(STATE_KEY, r#"{"gap":42}"#).unwrap();

    let mut store = store_on(storage);
    assert_eq!(store.load(), LoadOutcome::Restored);
    assert_eq!(store.settings().gap, 42);
    assert_eq!(store.settings().amplitude, Settings::default().amplitude);
    assert!(store.notes().is_empty());
}

#[test]
fn setters_clamp_to_bounds_regardless_of_delta() {
    let mut store = store_on(MemoryStore::new());

    assert_eq!(store.adjust_gap(10_000), GAP_MAX);
    assert_eq!(store.adjust_gap(i64::MIN), GAP_MIN);
    assert_eq!(store.set_amplitude(-3), AMPLITUDE_MIN);
    assert_eq!(store.adjust_amplitude(500), AMPLITUDE_MAX);
    assert_eq!(store.adjust_speed(-100.0), SPEED_MIN);
    assert_eq!(store.set_speed(11.0), SPEED_MAX);
    assert_eq!(store.set_speed(f64::NAN), SPEED_MAX);
}

#[test]
fn clamping_to_current_bound_schedules_nothing() {
    let mut store = store_on(MemoryStore::new());
    store.set_gap(GAP_MAX);
    store.flush();

    store.adjust_gap(5);
    assert!(!store.has_pending_save());
}

#[test]
fn invalid_color_is_rejected_and_value_kept() {
    let mut store = store_on(MemoryStore::new());
    let err = store.set_dot_color("not-a-color").unwrap_err();
    assert!(matches!(err, SettingsError::InvalidColor(_)));
    assert_eq!(store.settings().dot_color, Settings::default().dot_color);
    assert!(!store.has_pending_save());
}

#[test]
fn write_failure_keeps_session_running_and_next_change_retries() {
    let mut store = store_on(FlakyStore::default());
    store.add_note(NoteDraft::new("Session 1", "")).unwrap();
    assert_eq!(store.advance_time(ms(500)), 0);
    assert_eq!(store.notes().len(), 1);
    assert!(store.storage().inner.get(STATE_KEY).unwrap().is_none());

    let mut storage = store.into_storage();
    storage.healthy = true;
    let mut store = store_on(storage);
    store.set_speed(3.0);
    assert_eq!(store.advance_time(ms(500)), 1);
    assert!(store.storage().inner.get(STATE_KEY).unwrap().is_some());
}

#[test]
fn quota_exceeded_is_absorbed() {
    let mut store = store_on(MemoryStore::with_quota(64));
    store
        .add_note(NoteDraft::new("Session 1", "x".repeat(256)))
        .unwrap();
    assert!(!store.save());
    assert_eq!(store.notes().len(), 1);
}

#[test]
fn refused_timer_saves_immediately() {
    let mut store = StateStore::new(
        MemoryStore::new(),
        RefusingScheduler,
        FixedClock::new(NOW_MS),
    );

    store.set_gap(150);
    assert_eq!(store.storage().write_count(), 1);
    assert!(!store.has_pending_save());

    let mut restored = store_on(store.into_storage());
    assert_eq!(restored.load(), LoadOutcome::Restored);
    assert_eq!(restored.settings().gap, 150);
}

#[test]
fn fractional_gap_in_stored_record_keeps_notes() {
    let mut storage = MemoryStore::new();
    storage
        .set(
            STATE_KEY,
            r##"{"gap":100.5,"amplitude":30,"speed":1,"dotColor":"#3b82f6",
                "notes":[{"id":"1","title":"keep me","content":"","date":"2024-01-01"}]}"##,
        )
        .unwrap();

    let mut store = store_on(storage);
    assert_eq!(store.load(), LoadOutcome::Restored);
    assert_eq!(store.settings().gap, 101);
    assert_eq!(store.notes()[0].title, "keep me");

    store.set_gap(50);
    assert_eq!(store.advance_time(ms(500)), 1);
    let record: serde_json::Value =
        serde_json::from_str(&store.storage().get(STATE_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(record["gap"], 50);
    assert_eq!(record["notes"][0]["title"], "keep me");
}

#[test]
fn deleting_a_duplicated_legacy_id_removes_every_copy() {
    let mut storage = MemoryStore::new();
    storage
        .set(
            LEGACY_KEY,
            r#"[
                {"id":"1","title":"first","content":"","date":"2023-01-01"},
                {"id":"2","title":"other","content":"","date":"2023-01-01"},
                {"id":"1","title":"second","content":"","date":"2023-01-01"}
            ]"#,
        )
        .unwrap();

    let mut store = store_on(storage);
    assert_eq!(store.load(), LoadOutcome::LegacyNotes(3));
    assert!(store.delete_note(&NoteId::from("1")));
    assert_eq!(store.notes().len(), 1);
    assert_eq!(store.notes()[0].id.as_str(), "2");
}

#[test]
fn late_delivery_of_live_timer_still_saves() {
    let mut store = store_on(MemoryStore::new());
    store.set_amplitude(20);

    // Host delivers the elapsed timer on a later turn.
    assert_eq!(store.scheduler().pending_count(), 1);
    assert!(store.on_timer_fired(TimerId(1)));
    assert_eq!(store.storage().write_count(), 1);
    assert!(!store.has_pending_save());
}
