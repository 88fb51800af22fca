//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `emdr_core` linkage outside the browser build.
//! - Exercise one save/load cycle through the SQLite backend.
//!
//! # Usage
//! `emdr_cli [STATE_DB]`; without a path the database lives in memory.

use emdr_core::{
    AnimationStyle, FixedClock, LoadOutcome, ManualScheduler, NoteDraft, SqliteStore, StateStore,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("emdr_core ping={}", emdr_core::ping());
    println!("emdr_core version={}", emdr_core::core_version());

    let db_path = std::env::args().nth(1);
    let opened = match db_path.as_deref() {
        Some(path) => SqliteStore::open(path),
        None => SqliteStore::open_in_memory(),
    };
    let storage = match opened {
        Ok(storage) => storage,
        Err(err) => {
            eprintln!("open state db failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut store = StateStore::new(storage, ManualScheduler::new(), FixedClock::new(0));
    println!("initial_load={:?}", store.load());
    println!(
        "style={}",
        AnimationStyle::from_settings(store.settings()).to_css_vars()
    );

    store.set_speed(2.0);
    if let Err(err) = store.add_note(NoteDraft::new("smoke", "")) {
        eprintln!("add_note failed: {err}");
        return ExitCode::FAILURE;
    }
    let saves = store.advance_time(store.config().save_debounce());
    let mut reloaded = StateStore::new(
        store.into_storage(),
        ManualScheduler::new(),
        FixedClock::new(0),
    );
    let outcome = reloaded.load();
    let keys = reloaded.storage().keys().unwrap_or_default();
    println!(
        "roundtrip saves={} outcome={:?} notes={} keys={:?}",
        saves,
        outcome,
        reloaded.notes().len(),
        keys
    );

    if outcome == LoadOutcome::Restored && reloaded.settings().speed == 2.0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
