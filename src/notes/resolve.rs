use std::collections::{HashMap, HashSet};

use super::Note;

/// Maps raw link targets to note ids.
///
/// Built fresh for every indexing pass and never persisted. Titles are
/// matched case-insensitively, either verbatim or in slug form (whitespace
/// runs replaced by `-`). When two notes share a title the first one wins.
pub struct LinkResolver<'a> {
    ids: HashSet<&'a str>,
    titles: HashMap<String, &'a str>,
    slugs: HashMap<String, &'a str>,
}

impl<'a> LinkResolver<'a> {
    pub fn new(notes: &'a [Note]) -> Self {
        let mut ids = HashSet::with_capacity(notes.len());
        let mut titles = HashMap::with_capacity(notes.len());
        let mut slugs = HashMap::with_capacity(notes.len());

        for note in notes {
            ids.insert(note.id.as_str());

            let title = note.title.trim().to_lowercase();
            if title.is_empty() {
                continue;
            }
            slugs.entry(slugify(&title)).or_insert(note.id.as_str());
            titles.entry(title).or_insert(note.id.as_str());
        }

        Self { ids, titles, slugs }
    }

    /// Resolves a link target, trying in order: exact id, title, title after
    /// stripping `./` and `.md`, then the basename of that cleaned path.
    pub fn resolve(&self, target: &str) -> Option<&'a str> {
        let target = target.trim();
        if target.is_empty() {
            return None;
        }

        if let Some(&id) = self.ids.get(target) {
            return Some(id);
        }

        let lowered = target.to_lowercase();
        if let Some(id) = self.lookup_title(&lowered) {
            return Some(id);
        }

        let cleaned = clean_target(&lowered);
        if let Some(id) = self.lookup_title(cleaned) {
            return Some(id);
        }

        let basename = cleaned.rsplit('/').next().unwrap_or(cleaned);
        self.lookup_title(basename)
    }

    fn lookup_title(&self, key: &str) -> Option<&'a str> {
        if key.is_empty() {
            return None;
        }

        self.titles
            .get(key)
            .or_else(|| self.slugs.get(&slugify(key)))
            .copied()
    }
}

fn clean_target(target: &str) -> &str {
    let target = target.strip_prefix("./").unwrap_or(target);
    target.strip_suffix(".md").unwrap_or(target)
}

fn slugify(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join("-")
}
