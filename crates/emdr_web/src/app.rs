//! JavaScript-facing application handle.
//!
//! # Responsibility
//! - Build one state store per page over browser adapters and load it.
//! - Translate JS-friendly arguments (i32, strings) to core calls.
//!
//! # Invariants
//! - The store is shared with the timer callback through a `Weak`, so a
//!   freed `EmdrApp` never receives late timer callbacks.
//! - A timer that elapses while the store is borrowed is delivered on the
//!   next access instead of being dropped.
//! - Validation failures return `Err(JsValue)` with a readable message;
//!   storage failures never do.

use crate::clock::JsClock;
use crate::emdr_init;
use crate::local_storage::LocalStorage;
use crate::timeout::TimeoutScheduler;
use emdr_core::{
    AnimationStyle, KeyValueStore, LoadOutcome, MemoryStore, NoteDraft, NoteId, StateStore,
    TimerId,
};
use log::warn;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;

type WebStore = StateStore<Box<dyn KeyValueStore>, TimeoutScheduler, JsClock>;

/// Elapsed timer parked until the store can be borrowed again.
///
/// Only the latest id matters: the store has at most one live timer.
#[derive(Debug, Clone, Default)]
struct DeferredTimer(Rc<Cell<Option<TimerId>>>);

impl DeferredTimer {
    fn defer(&self, id: TimerId) {
        self.0.set(Some(id));
    }

    fn take(&self) -> Option<TimerId> {
        self.0.take()
    }
}

fn outcome_label(outcome: LoadOutcome) -> &'static str {
    match outcome {
        LoadOutcome::Restored => "restored",
        LoadOutcome::LegacyNotes(_) => "legacy",
        LoadOutcome::Defaults => "defaults",
    }
}

/// Page-level state handle.
#[wasm_bindgen]
pub struct EmdrApp {
    store: Rc<RefCell<WebStore>>,
    deferred: DeferredTimer,
    load_outcome: LoadOutcome,
}

#[wasm_bindgen]
impl EmdrApp {
    /// Creates the store and restores persisted state.
    ///
    /// Fails only when there is no `window` (e.g. inside a worker).
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<EmdrApp, JsValue> {
        emdr_init();
        let window =
            web_sys::window().ok_or_else(|| JsValue::from_str("EmdrApp requires a window"))?;

        let storage: Box<dyn KeyValueStore> = match LocalStorage::from_window(&window) {
            Ok(storage) => Box::new(storage),
            Err(err) => {
                warn!(
                    "event=storage_open module=web status=degraded fallback=memory error={}",
                    err
                );
                Box::new(MemoryStore::new())
            }
        };

        let deferred = DeferredTimer::default();
        let parked = deferred.clone();
        let store = Rc::new_cyclic(|weak: &Weak<RefCell<WebStore>>| {
            let weak = weak.clone();
            let scheduler = TimeoutScheduler::new(window, move |id| {
                let Some(store) = weak.upgrade() else {
                    return;
                };
                match store.try_borrow_mut() {
                    Ok(mut store) => {
                        store.on_timer_fired(id);
                    }
                    Err(_) => {
                        parked.defer(id);
                        warn!(
                            "event=timer_fired module=web status=deferred reason=busy timer={}",
                            id
                        );
                    }
                };
            });
            RefCell::new(StateStore::new(storage, scheduler, JsClock))
        });

        let load_outcome = store.borrow_mut().load();
        Ok(Self {
            store,
            deferred,
            load_outcome,
        })
    }

    /// `restored`, `legacy` or `defaults`.
    pub fn load_outcome(&self) -> String {
        outcome_label(self.load_outcome).to_string()
    }

    pub fn gap(&self) -> i32 {
        self.store().settings().gap as i32
    }

    /// Returns the applied (clamped) value.
    pub fn set_gap(&self, value: i32) -> i32 {
        self.store_mut().set_gap(i64::from(value)) as i32
    }

    pub fn adjust_gap(&self, delta: i32) -> i32 {
        self.store_mut().adjust_gap(i64::from(delta)) as i32
    }

    pub fn amplitude(&self) -> i32 {
        self.store().settings().amplitude as i32
    }

    pub fn set_amplitude(&self, value: i32) -> i32 {
        self.store_mut().set_amplitude(i64::from(value)) as i32
    }

    pub fn adjust_amplitude(&self, delta: i32) -> i32 {
        self.store_mut().adjust_amplitude(i64::from(delta)) as i32
    }

    pub fn speed(&self) -> f64 {
        self.store().settings().speed
    }

    pub fn set_speed(&self, value: f64) -> f64 {
        self.store_mut().set_speed(value)
    }

    pub fn adjust_speed(&self, delta: f64) -> f64 {
        self.store_mut().adjust_speed(delta)
    }

    pub fn dot_color(&self) -> String {
        self.store().settings().dot_color.to_string()
    }

    pub fn set_dot_color(&self, color: &str) -> Result<(), JsValue> {
        self.store_mut()
            .set_dot_color(color)
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    /// Inline style declarations for the dots container.
    pub fn css_vars(&self) -> String {
        AnimationStyle::from_settings(self.store().settings()).to_css_vars()
    }

    /// Adds a note and returns its id. A blank title is rejected so the
    /// form can keep focus on the title field.
    pub fn add_note(
        &self,
        title: String,
        content: String,
        date: Option<String>,
    ) -> Result<String, JsValue> {
        let draft = NoteDraft {
            title,
            content,
            date,
        };
        self.store_mut()
            .add_note(draft)
            .map(|id| id.to_string())
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    pub fn delete_note(&self, id: &str) -> bool {
        self.store_mut().delete_note(&NoteId::from(id))
    }

    pub fn note_count(&self) -> u32 {
        self.store().notes().len() as u32
    }

    /// Notes as a JSON array, newest first.
    pub fn notes_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.store().notes())
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    /// Writes a pending save now (e.g. on `pagehide`).
    pub fn flush(&self) -> bool {
        self.store_mut().flush()
    }

    pub fn has_pending_save(&self) -> bool {
        self.store().has_pending_save()
    }

    /// Cancels the pending save timer. Call when unmounting the page.
    pub fn teardown(&self) {
        self.store_mut().teardown();
    }
}

impl EmdrApp {
    fn store(&self) -> Ref<'_, WebStore> {
        self.deliver_deferred();
        self.store.borrow()
    }

    fn store_mut(&self) -> RefMut<'_, WebStore> {
        self.deliver_deferred();
        self.store.borrow_mut()
    }

    fn deliver_deferred(&self) {
        let Some(id) = self.deferred.take() else {
            return;
        };
        match self.store.try_borrow_mut() {
            Ok(mut store) => {
                store.on_timer_fired(id);
            }
            Err(_) => self.deferred.defer(id),
        };
    }
}
