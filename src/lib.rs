//! Kanban sticky-note board library
//!
//! This library provides the note model, the filter/search/sort pipeline over
//! it, snapshot-based undo/redo, JSON persistence and import/export, and a
//! reminder scheduler for due notes.

mod board;
mod cli;
mod config;
mod errors;
mod helper;
mod history;
mod note;
mod query;
mod reminder_scheduler;
mod storage;
mod transfer;
mod types;

// Re-export key components
pub use board::*;
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use helper::*;
pub use history::*;
pub use note::*;
pub use query::*;
pub use reminder_scheduler::*;
pub use storage::*;
pub use transfer::*;
pub use types::*;
