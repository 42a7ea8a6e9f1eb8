use std::{collections::HashSet, fs, io::ErrorKind, path::Path};

use chrono::{Local, NaiveDate};
use log::{debug, error, trace};
use uuid::Uuid;

use crate::{BoardError, Note, Result};

/// Generates a new opaque note identifier
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Current local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Lowercases and trims tags, dropping empties and case-insensitive duplicates.
/// First occurrence wins.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

// Helper method for parsing comma-separated tags
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| normalize_tags(t.split(',')))
        .unwrap_or_default()
}

/// Helper method to load a note collection from a JSON file
pub fn load_notes_from_file(path: &Path) -> Result<Vec<Note>> {
    debug!("Loading notes from file: {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            return BoardError::NotFound {
                path: path.to_path_buf(),
            };
        }
        error!("Failed to open notes file {}: {}", path.display(), e);
        BoardError::Io(e)
    })?;

    let notes: Vec<Note> = serde_json::from_str(&content).map_err(|e| {
        error!("Notes file {} is not a valid collection: {}", path.display(), e);
        BoardError::Serialization(e)
    })?;

    // Validate notes
    if let Some(note) = notes.iter().find(|n| n.id.is_empty()) {
        let error_mgs = format!(
            "Note '{}' in {} has an empty ID",
            note.title,
            path.display()
        );
        error!("{}", error_mgs);
        return Err(BoardError::InvalidFormat { message: error_mgs });
    }

    trace!("Successfully loaded {} notes", notes.len());
    Ok(notes)
}
