//! Core use-case services.
//!
//! # Responsibility
//! - Keep note list transforms free of storage concerns.
//! - Orchestrate state changes and debounced persistence.

pub mod note_ops;
pub mod state_store;
