use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use super::Note;
use super::parse::parse_notes_json;

/// Loads notes from a JSON export file or from a directory of `*.md` files.
///
/// For a directory, each Markdown file becomes one note: the file name is
/// the id, the file stem the title, and the file body the content. Files
/// are read in name order so indexing stays reproducible.
pub fn load_notes(path: &Path) -> Result<Vec<Note>> {
    if path.is_dir() {
        return load_markdown_dir(path)
            .with_context(|| format!("failed to load notes from {}", path.display()));
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read notes export {}", path.display()))?;
    parse_notes_json(&raw).with_context(|| format!("failed to parse notes export {}", path.display()))
}

fn load_markdown_dir(dir: &Path) -> Result<Vec<Note>> {
    let mut paths = fs::read_dir(dir)
        .with_context(|| format!("failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|extension| extension.eq_ignore_ascii_case("md"))
        })
        .collect::<Vec<_>>();
    paths.sort();

    let mut notes = Vec::with_capacity(paths.len());
    for path in paths {
        let (Some(file_name), Some(stem)) = (
            path.file_name().and_then(|name| name.to_str()),
            path.file_stem().and_then(|stem| stem.to_str()),
        ) else {
            debug!(path = %path.display(), "skipping note with a non UTF-8 file name");
            continue;
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read note {}", path.display()))?;
        notes.push(Note::new(file_name, stem, content));
    }

    if notes.is_empty() {
        return Err(anyhow!("no Markdown notes found in {}", dir.display()));
    }

    Ok(notes)
}
