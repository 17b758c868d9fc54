//! Note graph indexing and queries.
//!
//! [`index_graph`] scans every note for links, resolves them to note ids and
//! builds a [`NoteGraph`]. Indexing runs in two phases: every resolved link
//! first produces a forward edge plus a synthetic backlink edge (these drive
//! degree counting), then the directional list is folded into one drawable
//! edge per unordered pair of notes.

mod index;
#[cfg(test)]
mod proptests;
mod query;
mod style;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::notes::LinkKind;

pub use index::{dedup_edges, index_graph, index_graph_with};
pub use query::{SearchHit, fuzzy_match_score, get_backlinks, shortest_path};
pub use style::{Classification, ColorBand, node_size};

/// Degree at which a note counts as a hub.
pub const DEFAULT_MAIN_THRESHOLD: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexOptions {
    /// Minimum degree for [`Classification::Main`].
    pub main_threshold: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            main_threshold: DEFAULT_MAIN_THRESHOLD,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Wikilink,
    #[serde(rename = "mdlink")]
    Mdlink,
    Backlink,
}

impl From<LinkKind> for EdgeKind {
    fn from(kind: LinkKind) -> Self {
        match kind {
            LinkKind::Wikilink => Self::Wikilink,
            LinkKind::Markdown => Self::Mdlink,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

impl GraphEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }

    /// Endpoints ordered lexicographically, identifying the edge regardless
    /// of direction.
    pub fn unordered_pair(&self) -> (&str, &str) {
        if self.from <= self.to {
            (self.from.as_str(), self.to.as_str())
        } else {
            (self.to.as_str(), self.from.as_str())
        }
    }

    pub fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub title: String,
    /// Resolved link occurrences touching this note, in either direction.
    pub degree: usize,
    pub tags: BTreeSet<String>,
    pub classification: Classification,
    pub size: f32,
    pub color: ColorBand,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NoteGraph {
    pub nodes: Vec<GraphNode>,
    /// One edge per unordered pair of linked notes.
    pub edges: Vec<GraphEdge>,
    /// Every forward link and its synthetic backlink, before deduplication.
    #[serde(skip)]
    pub links: Vec<GraphEdge>,
}

impl NoteGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn total_degree(&self) -> usize {
        self.nodes.iter().map(|node| node.degree).sum()
    }

    /// Notes linking to `id`, from the directional link list so links in
    /// both directions between a pair are all reported.
    pub fn backlinks(&self, id: &str) -> Vec<String> {
        get_backlinks(id, &self.links)
    }

    /// Shortest chain of links between two notes, ignoring link direction.
    pub fn path_between(&self, from: &str, to: &str) -> Option<Vec<String>> {
        if self.node(from).is_none() || self.node(to).is_none() {
            return None;
        }
        shortest_path(from, to, &self.links)
    }

    /// Notes sharing a drawable edge with `id`, in edge order.
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter_map(|edge| {
                if edge.from == id {
                    Some(edge.to.as_str())
                } else if edge.to == id {
                    Some(edge.from.as_str())
                } else {
                    None
                }
            })
            .collect()
    }
}
