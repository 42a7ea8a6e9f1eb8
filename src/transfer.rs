//! JSON and CSV export, and JSON import.
use std::collections::HashSet;

use log::{debug, info, warn};

use crate::{generate_id, BoardError, Note, Result};

/// Column headers of the tabular export
pub const CSV_HEADERS: [&str; 7] = [
    "Title",
    "Description",
    "Status",
    "Priority",
    "Due Date",
    "Tags",
    "Color",
];

/// Serializes the whole collection verbatim as a pretty-printed JSON array
pub fn export_json(notes: &[Note]) -> Result<String> {
    debug!("Exporting {} notes as JSON", notes.len());
    Ok(serde_json::to_string_pretty(notes)?)
}

/// Serializes the collection as CSV, one row per note, every field quoted
pub fn export_csv(notes: &[Note]) -> Result<String> {
    debug!("Exporting {} notes as CSV", notes.len());
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for note in notes {
        let date = note
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        writer.write_record([
            note.title.as_str(),
            note.description.as_str(),
            note.column.as_str(),
            note.priority.as_str(),
            date.as_str(),
            note.tags.join(";").as_str(),
            note.color.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| BoardError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| BoardError::invalid_format(e.to_string()))
}

/// Parses an import payload into a normalized collection.
///
/// The payload must be a JSON array of note-shaped records. Anything else
/// fails with `InvalidFormat` and nothing is returned. Tags and completion
/// state are normalized and duplicate IDs are replaced with fresh ones.
pub fn parse_import(payload: &str) -> Result<Vec<Note>> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| BoardError::invalid_format(format!("Not valid JSON: {}", e)))?;

    let records = match value {
        serde_json::Value::Array(records) => records,
        _ => {
            return Err(BoardError::invalid_format(
                "Expected a JSON array of notes",
            ))
        }
    };

    let mut seen = HashSet::with_capacity(records.len());
    let mut notes = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let mut note: Note = serde_json::from_value(record).map_err(|e| {
            BoardError::invalid_format(format!("Note #{} is not a valid note: {}", index + 1, e))
        })?;

        note.normalize();
        if note.title.is_empty() {
            return Err(BoardError::invalid_format(format!(
                "Note #{} has an empty title",
                index + 1
            )));
        }

        if note.id.trim().is_empty() || !seen.insert(note.id.clone()) {
            let fresh = generate_id();
            warn!(
                "Note #{} has a missing or duplicate ID '{}', assigning {}",
                index + 1,
                note.id,
                fresh
            );
            note.id = fresh.clone();
            seen.insert(fresh);
        }

        notes.push(note);
    }

    info!("Parsed {} notes for import", notes.len());
    Ok(notes)
}
