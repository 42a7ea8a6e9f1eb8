use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{Days, NaiveDate};
use log::{debug, error, info, trace, warn};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::{
    load_notes_from_file, BoardError, Column, History, Note, NoteColor, Priority, Result,
};

/// Persistence collaborator for the canonical note collection.
///
/// `load` fails with `NotFound` when nothing has been stored yet; callers
/// substitute the seed collection in that case.
pub trait NoteStore: Send {
    fn load(&self) -> Result<Vec<Note>>;
    fn save(&self, notes: &[Note]) -> Result<()>;
}

/// Stores the whole collection as one pretty-printed JSON array
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NoteStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Note>> {
        let notes = load_notes_from_file(&self.path)?;
        info!("Loaded {} notes from {}", notes.len(), self.path.display());
        Ok(notes)
    }

    fn save(&self, notes: &[Note]) -> Result<()> {
        info!("Saving {} notes to {}", notes.len(), self.path.display());
        write_json_atomic(&self.path, notes).map_err(|e| {
            error!("Failed to save notes: {}", e);
            BoardError::PersistenceFailure {
                message: e.to_string(),
            }
        })
    }
}

/// In-memory store, used by tests and by callers that manage persistence
/// themselves
#[derive(Debug, Default)]
pub struct MemoryStore {
    notes: Mutex<Option<Vec<Note>>>,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `notes`
    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            notes: Mutex::new(Some(notes)),
            fail_saves: false,
        }
    }

    /// A store whose saves always fail, as if storage were full
    pub fn failing() -> Self {
        Self {
            notes: Mutex::new(None),
            fail_saves: true,
        }
    }

    /// Last saved collection
    pub fn stored(&self) -> Option<Vec<Note>> {
        self.notes.lock().ok().and_then(|n| n.clone())
    }
}

impl NoteStore for MemoryStore {
    fn load(&self) -> Result<Vec<Note>> {
        let stored = self
            .notes
            .lock()
            .map_err(|e| BoardError::PersistenceFailure {
                message: format!("Failed to acquire lock on memory store: {}", e),
            })?
            .clone();

        stored.ok_or_else(|| BoardError::NotFound {
            path: PathBuf::from("<memory>"),
        })
    }

    fn save(&self, notes: &[Note]) -> Result<()> {
        if self.fail_saves {
            return Err(BoardError::PersistenceFailure {
                message: "storage is full".to_string(),
            });
        }

        let mut stored = self
            .notes
            .lock()
            .map_err(|e| BoardError::PersistenceFailure {
                message: format!("Failed to acquire lock on memory store: {}", e),
            })?;
        *stored = Some(notes.to_vec());
        Ok(())
    }
}

/// Writes `value` as JSON using a temporary file in the same directory that
/// is then moved over the target, so readers never see a partial file
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    // Ensure the parent directory exists
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.exists() {
        debug!("Creating parent directory: {}", dir.display());
        fs::create_dir_all(dir).map_err(|e| {
            error!("Failed to create directory {}: {}", dir.display(), e);
            BoardError::DirectoryError {
                path: dir.to_path_buf(),
            }
        })?;
    }

    debug!("Creating temporary file in directory: {}", dir.display());
    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
        error!("Failed to create temporary file: {}", e);
        BoardError::Io(e)
    })?;

    trace!("Serializing to JSON");
    let json = serde_json::to_string_pretty(value)?;

    temp_file.write_all(json.as_bytes())?;
    temp_file.flush()?;

    debug!("Performing atomic move of temporary file to {}", path.display());
    temp_file.persist(path).map_err(|e| {
        error!("Failed to persist file {}: {}", path.display(), e.error);
        BoardError::Io(e.error)
    })?;

    Ok(())
}

/// Saves the undo/redo history next to the notes
pub fn save_history(path: &Path, history: &History) -> Result<()> {
    debug!(
        "Saving history ({} entries) to {}",
        history.len(),
        path.display()
    );
    write_json_atomic(path, history)
}

/// Loads a previously saved history. Fails with `NotFound` when there is none.
pub fn load_history(path: &Path) -> Result<History> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            return BoardError::NotFound {
                path: path.to_path_buf(),
            };
        }
        BoardError::Io(e)
    })?;

    let history: History = serde_json::from_str(&content)?;
    if !history.is_consistent() {
        warn!("History in {} has an out-of-range cursor", path.display());
        return Err(BoardError::invalid_format(format!(
            "History cursor out of range in {}",
            path.display()
        )));
    }

    Ok(history)
}

/// Starter notes for a board that has never been saved
pub fn seed_notes(today: NaiveDate) -> Vec<Note> {
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    let next_week = today.checked_add_days(Days::new(7)).unwrap_or(today);

    let seed = |title: &str,
                description: &str,
                date: NaiveDate,
                color: NoteColor,
                column: Column,
                priority: Priority,
                tags: &[&str]| {
        let mut note = Note::new(title);
        note.description = description.to_string();
        note.date = Some(date);
        note.color = color;
        note.set_column(column);
        note.priority = priority;
        note.tags = tags.iter().map(|t| t.to_string()).collect();
        note
    };

    vec![
        seed(
            "Welcome to kbboard",
            "Move me to another column to change my status!",
            today,
            NoteColor::Yellow,
            Column::Todo,
            Priority::Medium,
            &["welcome", "tutorial"],
        ),
        seed(
            "Create your first note",
            "Run `kbboard add \"My note\"` to get started.",
            today,
            NoteColor::Mint,
            Column::Todo,
            Priority::High,
            &["tutorial"],
        ),
        seed(
            "Customize your notes",
            "Pick different colors to organize your tasks.",
            tomorrow,
            NoteColor::Pink,
            Column::InProgress,
            Priority::Medium,
            &["tutorial", "design"],
        ),
        seed(
            "Plan for next week",
            "Use the upcoming filter to see future tasks!",
            next_week,
            NoteColor::Lavender,
            Column::Todo,
            Priority::Low,
            &["planning"],
        ),
    ]
}
