use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::Note;

/// Parses a notes export: either a bare JSON array of notes or an object
/// holding them under `notes`. Entries that fail to deserialize or carry an
/// empty id are skipped.
pub fn parse_notes_json(raw: &str) -> Result<Vec<Note>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in notes export")?;

    let entries = match &parsed {
        Value::Array(entries) => entries,
        Value::Object(object) => object
            .get("notes")
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("notes export object has no `notes` array"))?,
        _ => return Err(anyhow!("unexpected JSON type for notes export")),
    };

    let mut notes = Vec::with_capacity(entries.len());
    for (index, value) in entries.iter().enumerate() {
        match Note::deserialize(value) {
            Ok(note) if !note.id.trim().is_empty() => notes.push(note),
            Ok(_) => debug!(index, "skipping note without an id"),
            Err(error) => debug!(index, %error, "skipping malformed note entry"),
        }
    }

    Ok(notes)
}
