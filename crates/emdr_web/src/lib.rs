//! Browser bindings for the EMDR dots page.
//!
//! # Responsibility
//! - Expose the core state store to JavaScript through wasm-bindgen.
//! - Adapt `localStorage`, `setTimeout` and `Date.now()` to core traits.
//!
//! # Invariants
//! - Exported functions never panic across the wasm boundary.
//! - Storage problems degrade to an in-memory session; they never surface
//!   as thrown exceptions.
//!
//! # Usage
//!
//! ```bash
//! wasm-pack build crates/emdr_web --target web
//! ```
//!
//! ```javascript
//! import init, { EmdrApp } from './emdr_web.js';
//!
//! await init();
//! const app = new EmdrApp();
//! app.set_gap(120);
//! dots.setAttribute('style', app.css_vars());
//! app.add_note('Session 1', 'felt calm', null);
//! window.addEventListener('pagehide', () => app.flush());
//! ```

mod app;
mod clock;
mod local_storage;
mod timeout;

pub use app::EmdrApp;
pub use clock::JsClock;
pub use local_storage::LocalStorage;
pub use timeout::TimeoutScheduler;

use wasm_bindgen::prelude::*;

/// Installs the panic hook and console logger. Safe to call repeatedly.
#[wasm_bindgen]
pub fn emdr_init() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).ok();
}

/// Minimal health-check API for smoke integration.
#[wasm_bindgen]
pub fn ping() -> String {
    emdr_core::ping().to_owned()
}

#[wasm_bindgen]
pub fn core_version() -> String {
    emdr_core::core_version().to_owned()
}

/// Renders a thrown JS value (usually a `DOMException`) for logs.
pub(crate) fn js_error_text(value: &JsValue) -> String {
    let name = js_sys::Reflect::get(value, &JsValue::from_str("name"))
        .ok()
        .and_then(|name| name.as_string());
    let message = js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string());
    match (name, message) {
        (Some(name), Some(message)) => format!("{name}: {message}"),
        (Some(name), None) => name,
        (None, Some(message)) => message,
        (None, None) => value.as_string().unwrap_or_else(|| format!("{value:?}")),
    }
}
