//! Linear undo/redo over full snapshots of the note collection.
//!
//! Each recorded entry owns an independent copy of the collection as it was
//! right after a mutation. The cursor points at the entry matching the live
//! collection; the oldest entry is the baseline and cannot be undone.
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{BoardError, Note, Result};

/// Default bound on the number of retained entries
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// One recorded state of the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Short machine label, e.g. `add`, `bulk-move`
    pub action: String,
    /// Text shown to the user when this action is undone or redone
    pub description: String,
    /// Copy of the whole collection after the action
    pub snapshot: Vec<Note>,
}

/// Result of a successful undo or redo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStep {
    /// Description of the action that was undone or redone
    pub description: String,
    /// The collection to adopt as canonical
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
    /// Index of the entry matching the live collection. None before anything
    /// has been recorded.
    cursor: Option<usize>,
    max_entries: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    /// Creates an empty history retaining at most `max_entries` entries
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            max_entries: max_entries.max(1),
        }
    }

    /// Records the state reached by an action.
    ///
    /// Drops any redoable entries first, then evicts the oldest entries once
    /// the bound is exceeded.
    pub fn record(&mut self, action: &str, description: &str, notes: &[Note]) {
        match self.cursor {
            Some(cursor) => self.entries.truncate(cursor + 1),
            None => self.entries.clear(),
        }

        self.entries.push(HistoryEntry {
            action: action.to_string(),
            description: description.to_string(),
            snapshot: notes.to_vec(),
        });

        if self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(0..overflow);
            trace!("Evicted {} oldest history entries", overflow);
        }

        self.cursor = Some(self.entries.len() - 1);
        debug!(
            "Recorded '{}' ({} of {} entries)",
            action,
            self.entries.len(),
            self.max_entries
        );
    }

    /// Steps back to the previous recorded state
    pub fn undo(&mut self) -> Result<HistoryStep> {
        let cursor = match self.cursor {
            Some(cursor) if cursor > 0 => cursor,
            _ => {
                return Err(BoardError::NoOp {
                    message: "Nothing to undo".to_string(),
                })
            }
        };

        let description = self.entries[cursor].description.clone();
        self.cursor = Some(cursor - 1);
        debug!("Undo '{}' -> entry {}", description, cursor - 1);

        Ok(HistoryStep {
            description,
            notes: self.entries[cursor - 1].snapshot.clone(),
        })
    }

    /// Steps forward to the next recorded state, if an undo left one
    pub fn redo(&mut self) -> Result<HistoryStep> {
        let next = match self.cursor {
            Some(cursor) if cursor + 1 < self.entries.len() => cursor + 1,
            _ => {
                return Err(BoardError::NoOp {
                    message: "Nothing to redo".to_string(),
                })
            }
        };

        self.cursor = Some(next);
        let entry = &self.entries[next];
        debug!("Redo '{}' -> entry {}", entry.description, next);

        Ok(HistoryStep {
            description: entry.description.clone(),
            notes: entry.snapshot.clone(),
        })
    }

    /// Discards every entry and records `notes` as the new baseline
    pub fn reset(&mut self, action: &str, description: &str, notes: &[Note]) {
        self.entries.clear();
        self.cursor = None;
        self.record(action, description, notes);
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor + 1 < self.entries.len())
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Changes the bound, evicting the oldest entries if needed
    pub fn set_max_entries(&mut self, max_entries: usize) {
        self.max_entries = max_entries.max(1);
        if self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(0..overflow);
            self.cursor = self.cursor.map(|c| c.saturating_sub(overflow));
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Snapshot matching the live collection
    pub fn current(&self) -> Option<&[Note]> {
        self.cursor
            .and_then(|c| self.entries.get(c))
            .map(|e| e.snapshot.as_slice())
    }

    /// Whether the cursor is within bounds. Histories read back from disk are
    /// checked with this before use.
    pub fn is_consistent(&self) -> bool {
        match self.cursor {
            Some(cursor) => cursor < self.entries.len(),
            None => self.entries.is_empty(),
        }
    }
}
