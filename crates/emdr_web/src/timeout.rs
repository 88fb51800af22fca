//! `setTimeout`-backed task scheduler.
//!
//! # Invariants
//! - One JS closure serves every timer; the timer id travels as the
//!   `setTimeout` argument.
//! - A timer id is forgotten once it fires or is cancelled.
//! - Dropping the scheduler clears every outstanding timeout.

use crate::js_error_text;
use emdr_core::{ScheduleError, TaskScheduler, TimerId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// Live `setTimeout` handles keyed by the ids handed to the store.
#[derive(Debug, Default)]
struct TimerHandles {
    next_id: u64,
    live: HashMap<TimerId, i32>,
}

impl TimerHandles {
    fn allocate(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }

    fn insert(&mut self, id: TimerId, handle: i32) {
        self.live.insert(id, handle);
    }

    /// Forgets `id`, returning its JS handle when it was still live.
    fn take(&mut self, id: TimerId) -> Option<i32> {
        self.live.remove(&id)
    }

    fn drain(&mut self) -> Vec<i32> {
        self.live.drain().map(|(_, handle)| handle).collect()
    }

    fn len(&self) -> usize {
        self.live.len()
    }
}

type SharedHandles = Rc<RefCell<TimerHandles>>;

pub struct TimeoutScheduler {
    window: Window,
    handles: SharedHandles,
    callback: Closure<dyn FnMut(JsValue)>,
}

impl TimeoutScheduler {
    /// Creates a scheduler that reports elapsed timers to `on_fire`.
    pub fn new(window: Window, mut on_fire: impl FnMut(TimerId) + 'static) -> Self {
        let handles: SharedHandles = Rc::default();
        let fired_handles = Rc::clone(&handles);
        let callback = Closure::new(move |raw: JsValue| {
            let Some(raw_id) = raw.as_f64() else {
                return;
            };
            let id = TimerId(raw_id as u64);
            fired_handles.borrow_mut().take(id);
            on_fire(id);
        });

        Self {
            window,
            handles,
            callback,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.handles.borrow().len()
    }
}

impl TaskScheduler for TimeoutScheduler {
    fn schedule(&mut self, delay: Duration) -> Result<TimerId, ScheduleError> {
        let id = self.handles.borrow_mut().allocate();
        let delay_ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);

        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_1(
                self.callback.as_ref().unchecked_ref(),
                delay_ms,
                &JsValue::from_f64(id.0 as f64),
            )
            .map_err(|err| ScheduleError::Rejected(js_error_text(&err)))?;

        self.handles.borrow_mut().insert(id, handle);
        Ok(id)
    }

    fn cancel(&mut self, id: TimerId) {
        let handle = self.handles.borrow_mut().take(id);
        if let Some(handle) = handle {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

impl Drop for TimeoutScheduler {
    fn drop(&mut self) {
        let handles = self.handles.borrow_mut().drain();
        for handle in handles {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}
