//! The query pipeline: filter, then search, then sort.
//!
//! Everything here is a pure function of the collection, the query and the
//! current date, so the same inputs always produce the same visible set.
use std::{cmp::Ordering, collections::BTreeMap, collections::BTreeSet, fmt, str::FromStr};

use chrono::{Datelike, Days, NaiveDate};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{parse_date, BoardError, Column, ColumnCounts, Note, Priority, SmartFilterCounts};

/// The single active filter mode
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Filter {
    All,
    #[default]
    Today,
    Upcoming,
    Date(NaiveDate),
    Tag(String),
    Overdue,
    HighPriority,
    ThisWeek,
}

impl Filter {
    /// Whether `note` passes this filter on `today`
    pub fn matches(&self, note: &Note, today: NaiveDate) -> bool {
        match self {
            Filter::All => true,
            Filter::Today => note.date == Some(today),
            Filter::Upcoming => note.date.is_some_and(|d| d > today),
            Filter::Date(selected) => note.date == Some(*selected),
            Filter::Tag(tag) => {
                let tag = tag.trim().to_lowercase();
                note.tags.iter().any(|t| t.to_lowercase() == tag)
            }
            Filter::Overdue => is_overdue(note, today),
            Filter::HighPriority => is_high_priority(note),
            Filter::ThisWeek => is_this_week(note, today),
        }
    }

    /// Short label for headers, empty for `all`
    pub fn label(&self) -> String {
        match self {
            Filter::All => String::new(),
            Filter::Today => "Today".to_string(),
            Filter::Upcoming => "Upcoming".to_string(),
            Filter::Date(date) => date.format("%b %-d, %Y").to_string(),
            Filter::Tag(tag) => format!("#{}", tag),
            Filter::Overdue => "Overdue".to_string(),
            Filter::HighPriority => "High Priority".to_string(),
            Filter::ThisWeek => "This Week".to_string(),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("all"),
            Filter::Today => f.write_str("today"),
            Filter::Upcoming => f.write_str("upcoming"),
            Filter::Date(date) => write!(f, "date:{}", date.format("%Y-%m-%d")),
            Filter::Tag(tag) => write!(f, "tag:{}", tag),
            Filter::Overdue => f.write_str("overdue"),
            Filter::HighPriority => f.write_str("high-priority"),
            Filter::ThisWeek => f.write_str("this-week"),
        }
    }
}

impl FromStr for Filter {
    type Err = BoardError;

    /// Parses `all`, `today`, `upcoming`, `overdue`, `high-priority`,
    /// `this-week`, `date:YYYY-MM-DD` or `tag:<name>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(value) = s.strip_prefix("date:") {
            return Ok(Filter::Date(parse_date(value)?));
        }
        if let Some(value) = s.strip_prefix("tag:") {
            let tag = value.trim().to_lowercase();
            if tag.is_empty() {
                return Err(BoardError::validation("Tag filter needs a tag name"));
            }
            return Ok(Filter::Tag(tag));
        }

        match s.to_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "today" => Ok(Filter::Today),
            "upcoming" => Ok(Filter::Upcoming),
            "overdue" => Ok(Filter::Overdue),
            "high-priority" => Ok(Filter::HighPriority),
            "this-week" => Ok(Filter::ThisWeek),
            other => Err(BoardError::validation(format!(
                "Unknown filter '{}'. Must be one of: all, today, upcoming, overdue, \
                 high-priority, this-week, date:YYYY-MM-DD, tag:<name>",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Filter {
    type Error = BoardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Filter> for String {
    fn from(filter: Filter) -> Self {
        filter.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    #[default]
    DateDesc,
    DateAsc,
    PriorityDesc,
    TitleAsc,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::DateDesc => "date-desc",
            SortMode::DateAsc => "date-asc",
            SortMode::PriorityDesc => "priority-desc",
            SortMode::TitleAsc => "title-asc",
        }
    }

    /// Ordering of two notes under this mode
    pub fn compare(&self, a: &Note, b: &Note) -> Ordering {
        match self {
            SortMode::DateDesc => b.date_key().cmp(&a.date_key()),
            SortMode::DateAsc => a.date_key().cmp(&b.date_key()),
            SortMode::PriorityDesc => b
                .priority
                .rank()
                .cmp(&a.priority.rank())
                .then_with(|| b.date_key().cmp(&a.date_key())),
            SortMode::TitleAsc => a
                .title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title)),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date-desc" => Ok(SortMode::DateDesc),
            "date-asc" => Ok(SortMode::DateAsc),
            "priority-desc" => Ok(SortMode::PriorityDesc),
            "title-asc" => Ok(SortMode::TitleAsc),
            other => Err(BoardError::validation(format!(
                "Unknown sort '{}'. Must be one of: date-desc, date-asc, priority-desc, title-asc",
                other
            ))),
        }
    }
}

/// Everything that decides which notes are visible and in what order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filter: Filter,
    /// Free-text search; empty means no search stage
    pub search: String,
    pub sort: SortMode,
}

impl Query {
    pub fn new(filter: Filter, sort: SortMode) -> Self {
        Self {
            filter,
            search: String::new(),
            sort,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }
}

pub fn is_overdue(note: &Note, today: NaiveDate) -> bool {
    !note.completed && note.date.is_some_and(|d| d < today)
}

pub fn is_high_priority(note: &Note) -> bool {
    note.priority == Priority::High
}

pub fn is_this_week(note: &Note, today: NaiveDate) -> bool {
    let (start, end) = week_bounds(today);
    note.date.is_some_and(|d| d >= start && d <= end)
}

/// The Sunday..Saturday span (both inclusive) containing `today`
pub fn week_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = u64::from(today.weekday().num_days_from_sunday());
    let start = today - Days::new(offset);
    (start, start + Days::new(6))
}

/// Case-insensitive substring match against title, description or any tag.
/// An empty query matches everything. Whitespace is significant.
pub fn matches_search(note: &Note, query: &str) -> bool {
    let query = query.to_lowercase();
    if query.is_empty() {
        return true;
    }

    note.title.to_lowercase().contains(&query)
        || note.description.to_lowercase().contains(&query)
        || note.tags.iter().any(|t| t.to_lowercase().contains(&query))
}

/// Stable in-place sort
pub fn sort_notes(notes: &mut [Note], sort: SortMode) {
    notes.sort_by(|a, b| sort.compare(a, b));
}

/// Runs the full pipeline and returns the visible notes in display order
pub fn visible_notes(notes: &[Note], query: &Query, today: NaiveDate) -> Vec<Note> {
    let mut visible: Vec<Note> = notes
        .iter()
        .filter(|note| query.filter.matches(note, today))
        .filter(|note| matches_search(note, &query.search))
        .cloned()
        .collect();

    sort_notes(&mut visible, query.sort);
    debug!(
        "Query filter={} search='{}' sort={} -> {} of {} notes",
        query.filter,
        query.search,
        query.sort,
        visible.len(),
        notes.len()
    );
    visible
}

/// Number of notes per column
pub fn column_counts(notes: &[Note]) -> ColumnCounts {
    let mut counts = ColumnCounts::default();
    for note in notes {
        match note.column {
            Column::Todo => counts.todo += 1,
            Column::InProgress => counts.inprogress += 1,
            Column::Done => counts.done += 1,
        }
    }
    counts
}

/// Every distinct normalized tag in the collection, sorted
pub fn all_tags(notes: &[Note]) -> Vec<String> {
    notes
        .iter()
        .flat_map(|n| n.tags.iter())
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Smart-filter badge counts over the whole collection
pub fn smart_filter_counts(notes: &[Note], today: NaiveDate) -> SmartFilterCounts {
    SmartFilterCounts {
        overdue: notes.iter().filter(|n| is_overdue(n, today)).count(),
        high_priority: notes.iter().filter(|n| is_high_priority(n)).count(),
        this_week: notes.iter().filter(|n| is_this_week(n, today)).count(),
    }
}

/// Days of the given month that carry at least one note, with note counts
pub fn calendar_month(notes: &[Note], year: i32, month: u32) -> BTreeMap<u32, usize> {
    let mut days = BTreeMap::new();
    for date in notes.iter().filter_map(|n| n.date) {
        if date.year() == year && date.month() == month {
            *days.entry(date.day()).or_insert(0) += 1;
        }
    }
    trace!("Calendar {}-{:02}: {} marked days", year, month, days.len());
    days
}
