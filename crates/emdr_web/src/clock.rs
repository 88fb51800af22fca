use emdr_core::Clock;

/// `Date.now()` clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsClock;

impl Clock for JsClock {
    fn now_epoch_ms(&self) -> i64 {
        js_sys::Date::now() as i64
    }
}
