mod collect;
mod links;
mod parse;
mod resolve;

use serde::{Deserialize, Serialize};

pub use collect::load_notes;
pub use links::{LinkKind, RawLink, extract_links, extract_tags};
pub use parse::parse_notes_json;
pub use resolve::LinkResolver;

/// A note as supplied by the note store. Only these three fields matter to
/// the graph.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Note {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}
