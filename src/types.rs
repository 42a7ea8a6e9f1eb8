//! Shared types for the kbboard application.
//!
//! This module contains the Result alias, the summaries returned by board
//! operations and the command-line surface.
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::{parse_date, parse_time, BoardError, Column, Note, NoteColor, Priority, Recurrence};

/// A specialized Result type for kbboard operations.
pub type Result<T> = std::result::Result<T, BoardError>;

/// Number of notes per kanban column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnCounts {
    pub todo: usize,
    pub inprogress: usize,
    pub done: usize,
}

impl ColumnCounts {
    pub fn get(&self, column: Column) -> usize {
        match column {
            Column::Todo => self.todo,
            Column::InProgress => self.inprogress,
            Column::Done => self.done,
        }
    }

    pub fn total(&self) -> usize {
        self.todo + self.inprogress + self.done
    }
}

/// Badge counts for the smart filters, always over the whole collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SmartFilterCounts {
    pub overdue: usize,
    pub high_priority: usize,
    pub this_week: usize,
}

/// Summary of a committed board mutation
#[derive(Debug, Clone)]
pub struct ChangeSummary {
    /// History action label
    pub action: &'static str,
    /// Human description, as recorded in history
    pub description: String,
    /// IDs of the notes the operation touched
    pub note_ids: Vec<String>,
    /// Next occurrences spawned by completing recurring notes
    pub spawned: Vec<Note>,
}

/// Options for adding a note
#[derive(Args, Debug)]
pub struct AddNoteOptions {
    /// Title of the note
    pub title: String,

    /// Longer description
    #[clap(short, long)]
    pub description: Option<String>,

    /// Due date (YYYY-MM-DD), defaults to today
    #[clap(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Leave the note without a due date
    #[clap(long, conflicts_with = "date")]
    pub no_date: bool,

    /// Due time (HH:MM)
    #[clap(long, value_parser = parse_time)]
    pub time: Option<NaiveTime>,

    /// Note color, defaults to the configured color
    #[clap(long)]
    pub color: Option<NoteColor>,

    /// Column to place the note in
    #[clap(long, default_value = "todo")]
    pub column: Column,

    /// Priority (low, medium, high, none)
    #[clap(short, long, default_value = "medium")]
    pub priority: Priority,

    /// Tags to associate with the note (comma-separated)
    #[clap(short = 't', long)]
    pub tags: Option<String>,

    /// Recurrence (none, daily, weekly, monthly)
    #[clap(short, long, default_value = "none")]
    pub recurrence: Recurrence,
}

/// Options for editing a note
#[derive(Args, Debug)]
pub struct EditNoteOptions {
    /// ID (or unique ID prefix) of the note to edit
    pub id: String,

    /// New title
    #[clap(short = 'T', long)]
    pub title: Option<String>,

    /// New description
    #[clap(short, long)]
    pub description: Option<String>,

    /// New due date (YYYY-MM-DD)
    #[clap(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Remove the due date
    #[clap(long, conflicts_with = "date")]
    pub clear_date: bool,

    /// New due time (HH:MM)
    #[clap(long, value_parser = parse_time)]
    pub time: Option<NaiveTime>,

    /// Remove the due time
    #[clap(long, conflicts_with = "time")]
    pub clear_time: bool,

    #[clap(long)]
    pub color: Option<NoteColor>,

    #[clap(long)]
    pub column: Option<Column>,

    #[clap(short, long)]
    pub priority: Option<Priority>,

    /// Replace the note's tags (comma-separated)
    #[clap(short = 't', long)]
    pub tags: Option<String>,

    #[clap(short, long)]
    pub recurrence: Option<Recurrence>,
}

/// Options for listing notes
#[derive(Args, Debug)]
pub struct ListNotesOptions {
    /// Filter mode: all, today, upcoming, overdue, high-priority, this-week,
    /// date:YYYY-MM-DD or tag:<name>. Defaults to the configured filter.
    #[clap(short, long)]
    pub filter: Option<String>,

    /// Shorthand for --filter tag:<name>
    #[clap(short = 't', long, conflicts_with_all = ["filter", "date"])]
    pub tag: Option<String>,

    /// Shorthand for --filter date:<YYYY-MM-DD>
    #[clap(long, value_parser = parse_date, conflicts_with = "filter")]
    pub date: Option<NaiveDate>,

    /// Case-insensitive text search over title, description and tags
    #[clap(short, long)]
    pub search: Option<String>,

    /// Sort: date-desc, date-asc, priority-desc, title-asc
    #[clap(long)]
    pub sort: Option<String>,

    /// Format output as JSON
    #[clap(short, long)]
    pub json: bool,
}

/// Available subcommands for the kbboard application
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a new note
    Add(AddNoteOptions),

    /// Edit an existing note
    Edit(EditNoteOptions),

    /// Delete a note by ID
    Delete {
        /// ID (or unique ID prefix) of the note to delete
        id: String,
    },

    /// Mark a note completed, or reopen it
    Toggle {
        /// ID (or unique ID prefix) of the note
        id: String,
    },

    /// Move a note to another column
    Move {
        /// ID (or unique ID prefix) of the note
        id: String,

        /// Target column (todo, inprogress, done)
        column: Column,
    },

    /// Delete several notes at once
    BulkDelete {
        /// IDs (or unique ID prefixes) of the notes
        #[clap(required = true)]
        ids: Vec<String>,
    },

    /// Move several notes to a column
    BulkMove {
        /// Target column (todo, inprogress, done)
        column: Column,

        /// IDs (or unique ID prefixes) of the notes
        #[clap(required = true)]
        ids: Vec<String>,
    },

    /// Change the color of several notes
    BulkColor {
        /// New color (yellow, pink, mint, lavender, coral)
        color: NoteColor,

        /// IDs (or unique ID prefixes) of the notes
        #[clap(required = true)]
        ids: Vec<String>,
    },

    /// List notes with filtering, search and sorting
    List(ListNotesOptions),

    /// List every tag in use
    Tags {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show column counts and smart-filter counts
    Stats {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show which days of a month have notes
    Calendar {
        /// Month to show (YYYY-MM), defaults to the current month
        #[clap(short, long)]
        month: Option<String>,
    },

    /// Undo the last change
    Undo,

    /// Redo the last undone change
    Redo,

    /// Show the undo/redo history
    History,

    /// Export all notes
    Export {
        /// Path to write to; stdout when omitted
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// Format to export to
        #[clap(short, long, value_parser = ["json", "csv"], default_value = "json")]
        format: String,
    },

    /// Replace all notes with the contents of a JSON export
    Import {
        /// Path to the JSON file
        source: PathBuf,
    },

    /// Delete every note
    Clear {
        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Watch for due notes and print reminders until interrupted
    Remind,

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Update a configuration setting (key=value)
        #[clap(short, long)]
        set: Option<String>,

        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },
}
