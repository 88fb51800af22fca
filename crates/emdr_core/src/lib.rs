//! Core state logic for the EMDR dots page.
//! This crate owns settings, session notes and their persistence; UI hosts
//! only forward user input and render what it returns.

pub mod animation;
pub mod clock;
pub mod config;
#[cfg(not(target_arch = "wasm32"))]
pub mod db;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
pub mod model;
pub mod schedule;
pub mod service;
pub mod storage;

pub use animation::AnimationStyle;
pub use clock::{Clock, FixedClock};
#[cfg(not(target_arch = "wasm32"))]
pub use clock::SystemClock;
pub use config::StoreConfig;
#[cfg(not(target_arch = "wasm32"))]
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::app_state::AppState;
pub use model::note::{Note, NoteDraft, NoteId, NoteValidationError};
pub use model::settings::{DotColor, Settings, SettingsError};
pub use schedule::{Debouncer, ManualScheduler, ScheduleError, TaskScheduler, TimerId};
pub use service::state_store::{LoadOutcome, StateStore, StorageReadError, StorageWriteError};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::SqliteStore;
pub use storage::{KeyValueStore, MemoryStore, StorageError, StorageResult};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
