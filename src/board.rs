//! The board: canonical note collection, its history and the active query.
//!
//! Every mutation runs to completion against the in-memory collection, is
//! recorded in history, and is then handed to the store. A failed save is
//! reported as `PersistenceFailure` but the mutation stays applied; the next
//! successful save writes the whole collection again.
use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::{
    all_tags, calendar_month, column_counts, normalize_tags, seed_notes, smart_filter_counts,
    today, visible_notes, BoardError, ChangeSummary, Column, ColumnCounts, Config, Filter,
    History, HistoryStep, Note, NoteColor, NoteDraft, NoteStore, NoteUpdate, Query, Result,
    SmartFilterCounts, SortMode,
};

pub struct Board {
    /// Canonical collection, in insertion order
    notes: Vec<Note>,

    /// Undo/redo log over snapshots of `notes`
    history: History,

    /// Filter, search and sort currently applied to the view
    query: Query,

    /// Persistence collaborator
    store: Box<dyn NoteStore>,

    /// Color for notes added without one
    default_color: NoteColor,

    /// Fixed "today" for deterministic date handling
    pinned_today: Option<NaiveDate>,
}

impl Board {
    /// Opens the board from `store`, seeding it with starter notes when
    /// nothing has been stored yet. The loaded collection becomes the history
    /// baseline.
    pub fn open(store: Box<dyn NoteStore>, config: &Config) -> Result<Self> {
        let mut board = Self::with_notes(Vec::new(), store, config);

        match board.store.load() {
            Ok(notes) => board.notes = notes,
            Err(BoardError::NotFound { .. }) => {
                info!("No stored notes found, seeding the board");
                board.notes = seed_notes(board.today());
                if let Err(e) = board.store.save(&board.notes) {
                    warn!("Failed to save seed notes: {}", e);
                }
            }
            Err(e) => return Err(e),
        }

        board
            .history
            .reset("init", "Board loaded", &board.notes);
        Ok(board)
    }

    /// Builds a board over an existing collection without loading or seeding
    pub fn with_notes(notes: Vec<Note>, store: Box<dyn NoteStore>, config: &Config) -> Self {
        let mut history = History::new(config.max_history);
        history.record("init", "Board loaded", &notes);

        Self {
            notes,
            history,
            query: Query::new(config.default_filter.clone(), config.default_sort),
            store,
            default_color: config.default_color,
            pinned_today: None,
        }
    }

    /// Pins the board's notion of today, for reproducible date handling
    pub fn pin_today(&mut self, date: NaiveDate) {
        self.pinned_today = Some(date);
    }

    pub fn today(&self) -> NaiveDate {
        self.pinned_today.unwrap_or_else(today)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Adopts a previously saved history if it describes the current
    /// collection; otherwise keeps the fresh baseline.
    pub fn restore_history(&mut self, mut history: History, max_entries: usize) -> bool {
        if history.current() != Some(self.notes.as_slice()) {
            debug!("Saved history does not match stored notes, discarding it");
            return false;
        }
        history.set_max_entries(max_entries);
        self.history = history;
        true
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Resolves a full ID or a unique ID prefix to the full ID
    pub fn resolve_id(&self, id_or_prefix: &str) -> Result<String> {
        let needle = id_or_prefix.trim();
        if needle.is_empty() {
            return Err(BoardError::validation("Note ID must not be empty"));
        }
        if let Some(note) = self.get(needle) {
            return Ok(note.id.clone());
        }

        let matches: Vec<&Note> = self
            .notes
            .iter()
            .filter(|n| n.id.starts_with(needle))
            .collect();

        match matches.as_slice() {
            [note] => Ok(note.id.clone()),
            [] => Err(BoardError::NoteNotFound {
                id: needle.to_string(),
            }),
            _ => Err(BoardError::validation(format!(
                "ID prefix '{}' matches {} notes",
                needle,
                matches.len()
            ))),
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn set_query(&mut self, query: Query) {
        self.query = query;
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.query.filter = filter;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        self.query.sort = sort;
    }

    /// Notes passing the active query, in display order
    pub fn visible(&self) -> Vec<Note> {
        visible_notes(&self.notes, &self.query, self.today())
    }

    /// Per-column counts of the visible set
    pub fn visible_counts(&self) -> ColumnCounts {
        column_counts(&self.visible())
    }

    pub fn tags(&self) -> Vec<String> {
        all_tags(&self.notes)
    }

    pub fn smart_filter_counts(&self) -> SmartFilterCounts {
        smart_filter_counts(&self.notes, self.today())
    }

    pub fn calendar(&self, year: i32, month: u32) -> BTreeMap<u32, usize> {
        calendar_month(&self.notes, year, month)
    }

    pub fn add(&mut self, draft: NoteDraft) -> Result<ChangeSummary> {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(BoardError::validation("Title must not be empty"));
        }

        let mut note = Note::new(title);
        while self.get(&note.id).is_some() {
            note.id = crate::generate_id();
        }
        note.description = draft.description.trim().to_string();
        note.date = draft.date;
        note.time = draft.time;
        note.color = draft.color.unwrap_or(self.default_color);
        note.set_column(draft.column);
        note.priority = draft.priority;
        note.tags = normalize_tags(&draft.tags);
        note.recurrence = draft.recurrence;

        let description = format!("Added: \"{}\"", note.title);
        let id = note.id.clone();
        info!("Adding note {}", id);
        self.notes.push(note);

        self.commit("add", description, vec![id], Vec::new())
    }

    pub fn edit(&mut self, id: &str, update: NoteUpdate) -> Result<ChangeSummary> {
        if update.is_empty() {
            return Err(BoardError::validation("Nothing to change"));
        }
        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(BoardError::validation("Title must not be empty"));
            }
        }

        let today = self.today();
        let index = self.index_of(id)?;
        let note = &mut self.notes[index];
        let old_title = note.title.clone();

        if let Some(title) = update.title {
            note.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            note.description = description.trim().to_string();
        }
        if let Some(date) = update.date {
            note.date = date;
        }
        if let Some(time) = update.time {
            note.time = time;
        }
        if let Some(color) = update.color {
            note.color = color;
        }
        if let Some(priority) = update.priority {
            note.priority = priority;
        }
        if let Some(tags) = update.tags {
            note.tags = normalize_tags(&tags);
        }
        if let Some(recurrence) = update.recurrence {
            note.recurrence = recurrence;
        }

        let mut spawned = Vec::new();
        if let Some(column) = update.column {
            if note.set_column(column) {
                spawned.extend(note.next_occurrence(today));
            }
        }

        let id = note.id.clone();
        info!("Edited note {}", id);
        self.notes.extend(spawned.iter().cloned());
        self.commit("edit", format!("Edited: \"{}\"", old_title), vec![id], spawned)
    }

    pub fn delete(&mut self, id: &str) -> Result<ChangeSummary> {
        let index = self.index_of(id)?;
        let note = self.notes.remove(index);
        info!("Deleted note {}", note.id);

        self.commit(
            "delete",
            format!("Deleted: \"{}\"", note.title),
            vec![note.id],
            Vec::new(),
        )
    }

    /// Completes an open note (moving it to done) or reopens a completed one
    /// (moving it back to todo). Completing a recurring note spawns its next
    /// occurrence.
    pub fn toggle_complete(&mut self, id: &str) -> Result<ChangeSummary> {
        let today = self.today();
        let index = self.index_of(id)?;
        let note = &mut self.notes[index];

        let completed_now = note.toggle_completed();
        let spawned: Vec<Note> = if completed_now {
            note.next_occurrence(today).into_iter().collect()
        } else {
            Vec::new()
        };

        let verb = if note.completed { "Completed" } else { "Reopened" };
        let description = format!("{}: \"{}\"", verb, note.title);
        let id = note.id.clone();
        info!("{} note {}", verb, id);

        self.notes.extend(spawned.iter().cloned());
        self.commit("toggle", description, vec![id], spawned)
    }

    /// Moves a note to `column`. Moving a note to the column it is already
    /// in changes nothing and records nothing; `Ok(None)` is returned.
    pub fn move_note(&mut self, id: &str, column: Column) -> Result<Option<ChangeSummary>> {
        let today = self.today();
        let index = self.index_of(id)?;
        let note = &mut self.notes[index];
        if note.column == column {
            debug!("Note {} already in {}", note.id, column);
            return Ok(None);
        }

        let spawned: Vec<Note> = if note.set_column(column) {
            note.next_occurrence(today).into_iter().collect()
        } else {
            Vec::new()
        };

        let description = format!("Moved \"{}\" to {}", note.title, column.display_name());
        let id = note.id.clone();
        info!("Moved note {} to {}", id, column);

        self.notes.extend(spawned.iter().cloned());
        self.commit("move", description, vec![id], spawned).map(Some)
    }

    pub fn bulk_delete(&mut self, ids: &[String]) -> Result<ChangeSummary> {
        let selected = self.selection(ids)?;
        let before = self.notes.len();
        self.notes.retain(|n| !selected.contains(&n.id));
        let count = before - self.notes.len();
        info!("Bulk deleted {} notes", count);

        self.commit(
            "bulk-delete",
            format!("Deleted {}", plural_notes(count)),
            selected.into_iter().collect(),
            Vec::new(),
        )
    }

    pub fn bulk_move(&mut self, ids: &[String], column: Column) -> Result<ChangeSummary> {
        let selected = self.selection(ids)?;
        let today = self.today();

        let mut spawned = Vec::new();
        for note in self.notes.iter_mut().filter(|n| selected.contains(&n.id)) {
            if note.set_column(column) {
                spawned.extend(note.next_occurrence(today));
            }
        }
        info!("Bulk moved {} notes to {}", selected.len(), column);

        self.notes.extend(spawned.iter().cloned());
        self.commit(
            "bulk-move",
            format!(
                "Moved {} to {}",
                plural_notes(selected.len()),
                column.display_name()
            ),
            selected.into_iter().collect(),
            spawned,
        )
    }

    pub fn bulk_color(&mut self, ids: &[String], color: NoteColor) -> Result<ChangeSummary> {
        let selected = self.selection(ids)?;
        for note in self.notes.iter_mut().filter(|n| selected.contains(&n.id)) {
            note.color = color;
        }
        info!("Bulk recolored {} notes to {}", selected.len(), color);

        self.commit(
            "bulk-color",
            format!("Changed color of {}", plural_notes(selected.len())),
            selected.into_iter().collect(),
            Vec::new(),
        )
    }

    pub fn clear_all(&mut self) -> Result<ChangeSummary> {
        let ids = self.notes.drain(..).map(|n| n.id).collect();
        info!("Cleared all notes");
        self.commit("clear", "Cleared all notes".to_string(), ids, Vec::new())
    }

    /// Replaces the collection with already-validated imported notes
    pub fn import_notes(&mut self, notes: Vec<Note>) -> Result<ChangeSummary> {
        let ids: Vec<String> = notes.iter().map(|n| n.id.clone()).collect();
        info!("Importing {} notes", ids.len());
        self.notes = notes;
        self.commit(
            "import",
            format!("Imported {}", plural_notes(ids.len())),
            ids,
            Vec::new(),
        )
    }

    /// Restores the state before the last recorded change
    pub fn undo(&mut self) -> Result<String> {
        let step = self.history.undo()?;
        self.adopt(step)
    }

    /// Re-applies the last undone change
    pub fn redo(&mut self) -> Result<String> {
        let step = self.history.redo()?;
        self.adopt(step)
    }

    fn adopt(&mut self, step: HistoryStep) -> Result<String> {
        self.notes = step.notes;
        self.persist()?;
        Ok(step.description)
    }

    fn commit(
        &mut self,
        action: &'static str,
        description: String,
        note_ids: Vec<String>,
        spawned: Vec<Note>,
    ) -> Result<ChangeSummary> {
        self.history.record(action, &description, &self.notes);
        self.persist()?;

        Ok(ChangeSummary {
            action,
            description,
            note_ids,
            spawned,
        })
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.notes).map_err(|e| match e {
            BoardError::PersistenceFailure { .. } => e,
            other => BoardError::PersistenceFailure {
                message: other.to_string(),
            },
        })
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| BoardError::NoteNotFound { id: id.to_string() })
    }

    /// Validates a bulk selection: non-empty and every ID present
    fn selection(&self, ids: &[String]) -> Result<HashSet<String>> {
        if ids.is_empty() {
            return Err(BoardError::validation("No notes selected"));
        }
        let selected: HashSet<String> = ids.iter().cloned().collect();
        if let Some(missing) = selected.iter().find(|id| self.get(id).is_none()) {
            return Err(BoardError::NoteNotFound {
                id: missing.clone(),
            });
        }
        Ok(selected)
    }
}

fn plural_notes(count: usize) -> String {
    format!("{} note{}", count, if count == 1 { "" } else { "s" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_date, MemoryStore, Priority, Recurrence};

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn board() -> Board {
        let config = Config::default();
        let mut board = Board::with_notes(Vec::new(), Box::new(MemoryStore::new()), &config);
        board.pin_today(date("2024-01-10"));
        board
    }

    fn draft(title: &str) -> NoteDraft {
        NoteDraft {
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn add(board: &mut Board, title: &str) -> String {
        board.add(draft(title)).unwrap().note_ids[0].clone()
    }

    #[test]
    fn open_seeds_an_empty_store() {
        let board = Board::open(Box::new(MemoryStore::new()), &Config::default()).unwrap();
        assert_eq!(board.notes().len(), 4);
        assert_eq!(board.history().len(), 1);
    }

    #[test]
    fn open_loads_existing_notes() {
        let store = MemoryStore::with_notes(vec![Note::new("kept")]);
        let board = Board::open(Box::new(store), &Config::default()).unwrap();
        assert_eq!(board.notes().len(), 1);
        assert_eq!(board.notes()[0].title, "kept");
    }

    #[test]
    fn add_fills_defaults_and_normalizes() {
        let mut board = board();
        let summary = board
            .add(NoteDraft {
                title: "  Buy milk ".to_string(),
                tags: vec!["Errands".to_string(), "errands ".to_string()],
                column: Column::Done,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(summary.description, "Added: \"Buy milk\"");
        let note = board.get(&summary.note_ids[0]).unwrap();
        assert_eq!(note.title, "Buy milk");
        assert_eq!(note.tags, vec!["errands"]);
        assert_eq!(note.priority, Priority::Medium);
        assert_eq!(note.color, NoteColor::Yellow);
        assert!(note.completed);
    }

    #[test]
    fn add_and_edit_reject_empty_titles() {
        let mut board = board();
        assert!(matches!(
            board.add(draft("   ")),
            Err(BoardError::ValidationFailure { .. })
        ));
        assert!(board.notes().is_empty());

        let id = add(&mut board, "Keep");
        let update = NoteUpdate {
            title: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            board.edit(&id, update),
            Err(BoardError::ValidationFailure { .. })
        ));
        assert_eq!(board.get(&id).unwrap().title, "Keep");
        assert_eq!(board.history().len(), 2);
    }

    #[test]
    fn edit_describes_by_old_title() {
        let mut board = board();
        let id = add(&mut board, "Old");
        let summary = board
            .edit(
                &id,
                NoteUpdate {
                    title: Some("New".to_string()),
                    date: Some(Some(date("2024-02-01"))),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(summary.description, "Edited: \"Old\"");
        let note = board.get(&id).unwrap();
        assert_eq!(note.title, "New");
        assert_eq!(note.date, Some(date("2024-02-01")));
    }

    #[test]
    fn completing_weekly_note_spawns_next_occurrence() {
        let mut board = board();
        let id = board
            .add(NoteDraft {
                title: "Review".to_string(),
                date: Some(date("2024-01-10")),
                recurrence: Recurrence::Weekly,
                ..Default::default()
            })
            .unwrap()
            .note_ids[0]
            .clone();

        let summary = board.toggle_complete(&id).unwrap();
        assert_eq!(summary.description, "Completed: \"Review\"");
        assert_eq!(summary.spawned.len(), 1);

        let original = board.get(&id).unwrap();
        assert!(original.completed);
        assert_eq!(original.column, Column::Done);

        let next = board.get(&summary.spawned[0].id).unwrap();
        assert_eq!(next.date, Some(date("2024-01-17")));
        assert!(!next.completed);
        assert_eq!(next.recurrence, Recurrence::Weekly);
        assert_eq!(board.notes().len(), 2);
    }

    #[test]
    fn reopening_does_not_spawn() {
        let mut board = board();
        let id = board
            .add(NoteDraft {
                title: "Daily".to_string(),
                date: Some(date("2024-01-10")),
                recurrence: Recurrence::Daily,
                ..Default::default()
            })
            .unwrap()
            .note_ids[0]
            .clone();

        board.toggle_complete(&id).unwrap();
        let summary = board.toggle_complete(&id).unwrap();
        assert_eq!(summary.description, "Reopened: \"Daily\"");
        assert!(summary.spawned.is_empty());

        let note = board.get(&id).unwrap();
        assert!(!note.completed);
        assert_eq!(note.column, Column::Todo);
    }

    #[test]
    fn move_keeps_completion_consistent() {
        let mut board = board();
        let id = add(&mut board, "Task");

        let summary = board.move_note(&id, Column::Done).unwrap().unwrap();
        assert_eq!(summary.description, "Moved \"Task\" to Done");
        assert!(board.get(&id).unwrap().completed);

        board.move_note(&id, Column::InProgress).unwrap();
        assert!(!board.get(&id).unwrap().completed);

        // same column: nothing recorded
        let entries = board.history().len();
        assert!(board.move_note(&id, Column::InProgress).unwrap().is_none());
        assert_eq!(board.history().len(), entries);
    }

    fn add_recurring(board: &mut Board, title: &str, on: &str, recurrence: Recurrence) -> String {
        board
            .add(NoteDraft {
                title: title.to_string(),
                date: Some(date(on)),
                recurrence,
                ..Default::default()
            })
            .unwrap()
            .note_ids[0]
            .clone()
    }

    #[test]
    fn moving_recurring_note_to_done_spawns_next() {
        let mut board = board();
        let id = add_recurring(&mut board, "Rent", "2024-01-31", Recurrence::Monthly);

        let summary = board.move_note(&id, Column::Done).unwrap().unwrap();
        assert_eq!(summary.spawned.len(), 1);
        assert_eq!(summary.spawned[0].date, Some(date("2024-02-29")));
        assert_eq!(summary.spawned[0].column, Column::Todo);
        assert_eq!(board.notes().len(), 2);

        // leaving done is not a completion
        let summary = board.move_note(&id, Column::InProgress).unwrap().unwrap();
        assert!(summary.spawned.is_empty());
        assert_eq!(board.notes().len(), 2);
    }

    #[test]
    fn bulk_move_to_done_spawns_for_each_recurring_note() {
        let mut board = board();
        let monthly = add_recurring(&mut board, "Rent", "2024-01-31", Recurrence::Monthly);
        let daily = add_recurring(&mut board, "Walk", "2024-01-10", Recurrence::Daily);
        let plain = add(&mut board, "Once");

        let ids = vec![monthly.clone(), daily.clone(), plain];
        let summary = board.bulk_move(&ids, Column::Done).unwrap();
        let mut dates: Vec<_> = summary.spawned.iter().map(|n| n.date).collect();
        dates.sort();
        assert_eq!(dates, vec![Some(date("2024-01-11")), Some(date("2024-02-29"))]);
        assert_eq!(board.notes().len(), 5);

        let summary = board.bulk_move(&[monthly, daily], Column::Todo).unwrap();
        assert!(summary.spawned.is_empty());
        assert_eq!(board.notes().len(), 5);
    }

    #[test]
    fn editing_column_to_done_spawns_next() {
        let mut board = board();
        let id = add_recurring(&mut board, "Review", "2024-01-10", Recurrence::Weekly);

        let summary = board
            .edit(
                &id,
                NoteUpdate {
                    column: Some(Column::Done),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(summary.spawned.len(), 1);
        assert_eq!(summary.spawned[0].date, Some(date("2024-01-17")));
        assert!(board.get(&id).unwrap().completed);

        let summary = board
            .edit(
                &id,
                NoteUpdate {
                    column: Some(Column::Todo),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(summary.spawned.is_empty());
        assert!(!board.get(&id).unwrap().completed);
        assert_eq!(board.notes().len(), 2);
    }

    #[test]
    fn bulk_operations() {
        let mut board = board();
        let a = add(&mut board, "a");
        let b = add(&mut board, "b");
        let c = add(&mut board, "c");

        let summary = board
            .bulk_move(&[a.clone(), b.clone()], Column::Done)
            .unwrap();
        assert_eq!(summary.description, "Moved 2 notes to Done");
        assert!(board.get(&a).unwrap().completed && board.get(&b).unwrap().completed);

        let summary = board.bulk_color(&[c.clone()], NoteColor::Coral).unwrap();
        assert_eq!(summary.description, "Changed color of 1 note");
        assert_eq!(board.get(&c).unwrap().color, NoteColor::Coral);

        let summary = board.bulk_delete(&[a, c]).unwrap();
        assert_eq!(summary.description, "Deleted 2 notes");
        assert_eq!(board.notes().len(), 1);
        assert_eq!(board.notes()[0].id, b);
    }

    #[test]
    fn bulk_operations_validate_selection() {
        let mut board = board();
        add(&mut board, "a");
        assert!(matches!(
            board.bulk_delete(&[]),
            Err(BoardError::ValidationFailure { .. })
        ));
        assert!(matches!(
            board.bulk_color(&["missing".to_string()], NoteColor::Mint),
            Err(BoardError::NoteNotFound { .. })
        ));
        assert_eq!(board.notes().len(), 1);
    }

    #[test]
    fn undo_and_redo_walk_the_history() {
        let mut board = board();
        let id = add(&mut board, "first");
        board.toggle_complete(&id).unwrap();
        board.delete(&id).unwrap();

        assert_eq!(board.undo().unwrap(), "Deleted: \"first\"");
        assert!(board.get(&id).unwrap().completed);
        assert_eq!(board.undo().unwrap(), "Completed: \"first\"");
        assert!(!board.get(&id).unwrap().completed);
        assert_eq!(board.undo().unwrap(), "Added: \"first\"");
        assert!(board.notes().is_empty());
        assert!(board.undo().unwrap_err().is_noop());

        assert_eq!(board.redo().unwrap(), "Added: \"first\"");
        assert_eq!(board.notes().len(), 1);

        add(&mut board, "branch");
        assert!(board.redo().unwrap_err().is_noop());
    }

    #[test]
    fn undo_restores_notes_removed_by_clear() {
        let mut board = board();
        add(&mut board, "a");
        add(&mut board, "b");
        board.clear_all().unwrap();
        assert!(board.notes().is_empty());

        board.undo().unwrap();
        assert_eq!(board.notes().len(), 2);
    }

    #[test]
    fn persistence_failure_keeps_memory_authoritative() {
        let config = Config::default();
        let mut board = Board::with_notes(Vec::new(), Box::new(MemoryStore::failing()), &config);

        let err = board.add(draft("unsaved")).unwrap_err();
        assert!(matches!(err, BoardError::PersistenceFailure { .. }));
        assert_eq!(board.notes().len(), 1);
        assert_eq!(board.history().len(), 2);
    }

    #[test]
    fn resolve_id_accepts_unique_prefixes() {
        let mut board = board();
        let id = add(&mut board, "prefixed");
        assert_eq!(board.resolve_id(&id[..8]).unwrap(), id);
        assert!(matches!(
            board.resolve_id("zzzz"),
            Err(BoardError::NoteNotFound { .. })
        ));
    }

    #[test]
    fn visible_applies_the_active_query() {
        let mut board = board();
        board
            .add(NoteDraft {
                title: "today".to_string(),
                date: Some(date("2024-01-10")),
                ..Default::default()
            })
            .unwrap();
        add(&mut board, "undated");

        board.set_filter(Filter::Today);
        assert_eq!(board.visible().len(), 1);
        assert_eq!(board.visible_counts().todo, 1);

        board.set_filter(Filter::All);
        board.set_search("UNDATED");
        assert_eq!(board.visible()[0].title, "undated");
    }

    #[test]
    fn restore_history_requires_matching_snapshot() {
        let mut board = board();
        add(&mut board, "a");
        let saved = board.history().clone();

        assert!(board.restore_history(saved.clone(), 50));
        add(&mut board, "b");
        assert!(!board.restore_history(saved, 50));
    }
}
