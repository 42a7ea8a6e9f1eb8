//! Core data structures for the kbboard application.
//!
//! This module contains the Note record and the small closed vocabularies
//! (column, priority, color, recurrence) every note is described with.
use std::{fmt, str::FromStr};

use chrono::{Days, Months, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{generate_id, normalize_tags, BoardError};

/// Kanban status bucket a note lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    #[default]
    Todo,
    #[serde(rename = "inprogress")]
    InProgress,
    Done,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::Todo, Column::InProgress, Column::Done];

    /// Human readable name, as shown in column headers and history descriptions
    pub fn display_name(&self) -> &'static str {
        match self {
            Column::Todo => "To Do",
            Column::InProgress => "In Progress",
            Column::Done => "Done",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Todo => "todo",
            Column::InProgress => "inprogress",
            Column::Done => "done",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "todo" | "to-do" => Ok(Column::Todo),
            "inprogress" | "in-progress" | "doing" => Ok(Column::InProgress),
            "done" => Ok(Column::Done),
            other => Err(BoardError::validation(format!(
                "Unknown column '{}'. Must be one of: todo, inprogress, done",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    None,
}

impl Priority {
    /// Rank used by the priority sort: high=3, medium=2, low=1, none=0
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
            Priority::None => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::None => "none",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "none" => Ok(Priority::None),
            other => Err(BoardError::validation(format!(
                "Unknown priority '{}'. Must be one of: low, medium, high, none",
                other
            ))),
        }
    }
}

/// Sticky-note palette. Purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    #[default]
    Yellow,
    Pink,
    Mint,
    Lavender,
    Coral,
}

impl NoteColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteColor::Yellow => "yellow",
            NoteColor::Pink => "pink",
            NoteColor::Mint => "mint",
            NoteColor::Lavender => "lavender",
            NoteColor::Coral => "coral",
        }
    }
}

impl fmt::Display for NoteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteColor {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yellow" => Ok(NoteColor::Yellow),
            "pink" => Ok(NoteColor::Pink),
            "mint" => Ok(NoteColor::Mint),
            "lavender" => Ok(NoteColor::Lavender),
            "coral" => Ok(NoteColor::Coral),
            other => Err(BoardError::validation(format!(
                "Unknown color '{}'. Must be one of: yellow, pink, mint, lavender, coral",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    /// Date of the next occurrence after `from`, or None for non-recurring notes.
    ///
    /// Monthly recurrence clamps to the last day of a shorter month
    /// (Jan 31 -> Feb 29 in a leap year).
    pub fn next_date(&self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            Recurrence::None => None,
            Recurrence::Daily => from.checked_add_days(Days::new(1)),
            Recurrence::Weekly => from.checked_add_days(Days::new(7)),
            Recurrence::Monthly => from.checked_add_months(Months::new(1)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Recurrence::None),
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            other => Err(BoardError::validation(format!(
                "Unknown recurrence '{}'. Must be one of: none, daily, weekly, monthly",
                other
            ))),
        }
    }
}

/// Represents a single sticky note on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier for the note
    #[serde(default = "generate_id")]
    pub id: String,
    /// Note title, never empty
    pub title: String,
    /// Free text body
    #[serde(default)]
    pub description: String,
    /// Due date
    #[serde(default, with = "optional_date")]
    pub date: Option<NaiveDate>,
    /// Due time, only meaningful together with `date`
    #[serde(default, with = "optional_time")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub color: NoteColor,
    #[serde(default)]
    pub column: Column,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    /// Normalized tags (lowercase, trimmed, unique)
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub recurrence: Recurrence,
}

impl Note {
    /// Creates a new note in the todo column with default attributes
    pub fn new(title: impl Into<String>) -> Self {
        Note {
            id: generate_id(),
            title: title.into(),
            description: String::new(),
            date: None,
            time: None,
            color: NoteColor::default(),
            column: Column::Todo,
            completed: false,
            priority: Priority::default(),
            tags: Vec::new(),
            recurrence: Recurrence::None,
        }
    }

    /// Places the note in `column`, keeping `completed` in step with it.
    ///
    /// Returns true when the note transitioned into the completed state.
    pub fn set_column(&mut self, column: Column) -> bool {
        let was_completed = self.completed;
        self.column = column;
        self.completed = column == Column::Done;
        !was_completed && self.completed
    }

    /// Flips the completion state. Completing moves the note to done,
    /// reopening moves it back to todo.
    ///
    /// Returns true when the note transitioned into the completed state.
    pub fn toggle_completed(&mut self) -> bool {
        if self.completed {
            self.set_column(Column::Todo);
            false
        } else {
            self.set_column(Column::Done)
        }
    }

    /// Builds the next occurrence of a recurring note.
    ///
    /// The next date is computed from the note's own date, or from `today`
    /// when the note has none. Returns None for non-recurring notes.
    pub fn next_occurrence(&self, today: NaiveDate) -> Option<Note> {
        let next_date = self.recurrence.next_date(self.date.unwrap_or(today))?;

        Some(Note {
            id: generate_id(),
            date: Some(next_date),
            column: Column::Todo,
            completed: false,
            ..self.clone()
        })
    }

    /// Whether the note is still open (todo or in progress)
    pub fn is_active(&self) -> bool {
        matches!(self.column, Column::Todo | Column::InProgress)
    }

    /// Sort key used by the date orderings: date followed by time, with a
    /// missing time reading as midnight and a missing date as empty.
    pub fn date_key(&self) -> String {
        let date = self
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let time = self
            .time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "00:00".to_string());
        format!("{}{}", date, time)
    }

    /// Restores the record invariants on a note that came from outside:
    /// trimmed title, normalized tags, column and completion in agreement.
    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.tags = normalize_tags(&self.tags);
        self.completed = self.column == Column::Done;
    }
}

/// Attributes supplied when adding a note
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    /// Falls back to the configured default color
    pub color: Option<NoteColor>,
    pub column: Column,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub recurrence: Recurrence,
}

/// Partial update applied by an edit. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` clears the date
    pub date: Option<Option<NaiveDate>>,
    /// `Some(None)` clears the time
    pub time: Option<Option<NaiveTime>>,
    pub color: Option<NoteColor>,
    pub column: Option<Column>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub recurrence: Option<Recurrence>,
}

impl NoteUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.color.is_none()
            && self.column.is_none()
            && self.priority.is_none()
            && self.tags.is_none()
            && self.recurrence.is_none()
    }
}

/// Parses a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate, BoardError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        BoardError::validation(format!("Invalid date '{}' (expected YYYY-MM-DD): {}", value, e))
    })
}

/// Parses a 24-hour `HH:MM` time. A trailing `:SS` is tolerated.
pub fn parse_time(value: &str) -> Result<NaiveTime, BoardError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|e| {
            BoardError::validation(format!("Invalid time '{}' (expected HH:MM): {}", value, e))
        })
}

/// Serde adapter for optional ISO dates; an empty string reads as absent.
mod optional_date {
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => super::parse_date(&raw)
                .map(Some)
                .map_err(D::Error::custom),
            _ => Ok(None),
        }
    }
}

/// Serde adapter for optional `HH:MM` times; an empty string reads as absent.
mod optional_time {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.serialize_str(&t.format("%H:%M").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => super::parse_time(&raw)
                .map(Some)
                .map_err(D::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn set_column_keeps_completed_in_step() {
        let mut note = Note::new("Ship it");
        assert!(note.set_column(Column::Done));
        assert!(note.completed);

        // already completed, so no new transition
        assert!(!note.set_column(Column::Done));

        assert!(!note.set_column(Column::InProgress));
        assert!(!note.completed);
    }

    #[test]
    fn toggle_moves_between_todo_and_done() {
        let mut note = Note::new("Water plants");
        note.column = Column::InProgress;

        assert!(note.toggle_completed());
        assert_eq!(note.column, Column::Done);
        assert!(note.completed);

        assert!(!note.toggle_completed());
        assert_eq!(note.column, Column::Todo);
        assert!(!note.completed);
    }

    #[test]
    fn weekly_next_occurrence_keeps_attributes() {
        let mut note = Note::new("Standup notes");
        note.date = Some(date("2024-01-10"));
        note.time = Some(parse_time("09:30").unwrap());
        note.recurrence = Recurrence::Weekly;
        note.tags = vec!["work".to_string()];
        note.set_column(Column::Done);

        let next = note.next_occurrence(date("2024-03-01")).unwrap();
        assert_ne!(next.id, note.id);
        assert_eq!(next.date, Some(date("2024-01-17")));
        assert_eq!(next.time, note.time);
        assert_eq!(next.column, Column::Todo);
        assert!(!next.completed);
        assert_eq!(next.recurrence, Recurrence::Weekly);
        assert_eq!(next.tags, note.tags);
    }

    #[test]
    fn monthly_recurrence_clamps_to_month_end() {
        assert_eq!(
            Recurrence::Monthly.next_date(date("2024-01-31")),
            Some(date("2024-02-29"))
        );
        assert_eq!(
            Recurrence::Daily.next_date(date("2023-12-31")),
            Some(date("2024-01-01"))
        );
        assert_eq!(Recurrence::None.next_date(date("2024-01-31")), None);
    }

    #[test]
    fn undated_recurring_note_counts_from_today() {
        let mut note = Note::new("Stretch");
        note.recurrence = Recurrence::Daily;

        let next = note.next_occurrence(date("2024-05-01")).unwrap();
        assert_eq!(next.date, Some(date("2024-05-02")));
    }

    #[test]
    fn date_key_defaults_missing_time_to_midnight() {
        let mut note = Note::new("Key");
        assert_eq!(note.date_key(), "00:00");

        note.date = Some(date("2024-01-10"));
        assert_eq!(note.date_key(), "2024-01-1000:00");

        note.time = Some(parse_time("14:05").unwrap());
        assert_eq!(note.date_key(), "2024-01-1014:05");
    }

    #[test]
    fn deserializes_sparse_records_with_defaults() {
        let note: Note = serde_json::from_str(
            r#"{"title":"Imported","date":"","time":"","column":"inprogress","tags":["A"]}"#,
        )
        .unwrap();

        assert!(!note.id.is_empty());
        assert_eq!(note.date, None);
        assert_eq!(note.time, None);
        assert_eq!(note.column, Column::InProgress);
        assert_eq!(note.priority, Priority::Medium);
        assert_eq!(note.color, NoteColor::Yellow);
        assert_eq!(note.recurrence, Recurrence::None);
    }

    #[test]
    fn serializes_with_original_field_names() {
        let mut note = Note::new("Serialized");
        note.date = Some(date("2024-02-01"));
        note.time = Some(parse_time("08:00").unwrap());
        note.column = Column::InProgress;

        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["date"], "2024-02-01");
        assert_eq!(value["time"], "08:00");
        assert_eq!(value["column"], "inprogress");
        assert_eq!(value["priority"], "medium");
        assert_eq!(value["recurrence"], "none");
    }

    #[test]
    fn normalize_repairs_imported_note() {
        let mut note = Note::new("  Padded  ");
        note.tags = vec![" Work ".to_string(), "work".to_string(), "".to_string()];
        note.column = Column::Done;
        note.completed = false;

        note.normalize();
        assert_eq!(note.title, "Padded");
        assert_eq!(note.tags, vec!["work".to_string()]);
        assert!(note.completed);
    }

    #[test]
    fn parses_vocabulary_case_insensitively() {
        assert_eq!("In-Progress".parse::<Column>().unwrap(), Column::InProgress);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("Coral".parse::<NoteColor>().unwrap(), NoteColor::Coral);
        assert!("purple".parse::<NoteColor>().is_err());
        assert!(parse_time("25:00").is_err());
    }
}
