//! `window.localStorage` backend.
//!
//! # Invariants
//! - `QuotaExceededError` maps to `StorageError::QuotaExceeded`.
//! - Every other thrown value maps to `StorageError::Backend`.

use crate::js_error_text;
use emdr_core::{KeyValueStore, StorageError, StorageResult};
use wasm_bindgen::JsValue;
use web_sys::{Storage, Window};

pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// Opens the window's local storage.
    ///
    /// # Errors
    /// - `Unavailable` when storage is disabled (privacy mode, sandboxed
    ///   iframe) or access throws.
    pub fn from_window(window: &Window) -> StorageResult<Self> {
        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self { storage }),
            Ok(None) => Err(StorageError::Unavailable(
                "localStorage is not provided by this window".to_string(),
            )),
            Err(err) => Err(StorageError::Unavailable(js_error_text(&err))),
        }
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|err| StorageError::Backend(js_error_text(&err)))
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.storage
            .set_item(key, value)
            .map_err(|err| write_error(key, value, &err))
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|err| StorageError::Backend(js_error_text(&err)))
    }
}

fn write_error(key: &str, value: &str, err: &JsValue) -> StorageError {
    let name = js_sys::Reflect::get(err, &JsValue::from_str("name"))
        .ok()
        .and_then(|name| name.as_string());
    classify_write_error(name.as_deref(), key, value, || js_error_text(err))
}

/// Maps a thrown `DOMException` name to a storage error.
///
/// Chrome and Safari throw `QuotaExceededError`; older Firefox builds throw
/// `NS_ERROR_DOM_QUOTA_REACHED`.
fn classify_write_error(
    name: Option<&str>,
    key: &str,
    value: &str,
    details: impl FnOnce() -> String,
) -> StorageError {
    match name {
        Some("QuotaExceededError") | Some("NS_ERROR_DOM_QUOTA_REACHED") => {
            StorageError::QuotaExceeded {
                key: key.to_string(),
                bytes: value.len(),
            }
        }
        _ => StorageError::Backend(details()),
    }
}
