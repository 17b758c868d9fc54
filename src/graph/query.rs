use std::collections::{HashMap, HashSet, VecDeque};

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::Serialize;

use super::{EdgeKind, GraphEdge, NoteGraph};

/// Sources of every non-backlink edge pointing at `note_id`, each reported
/// once in edge order.
pub fn get_backlinks(note_id: &str, edges: &[GraphEdge]) -> Vec<String> {
    let mut seen = HashSet::new();
    edges
        .iter()
        .filter(|edge| edge.kind != EdgeKind::Backlink && edge.to == note_id)
        .filter(|edge| seen.insert(edge.from.as_str()))
        .map(|edge| edge.from.clone())
        .collect()
}

/// Breadth-first search over the directed adjacency implied by `edges`.
///
/// Returns the ids from `from` to `to` inclusive, or `None` when `to` is not
/// reachable. The adjacency is rebuilt on every call.
pub fn shortest_path(from: &str, to: &str, edges: &[GraphEdge]) -> Option<Vec<String>> {
    if from == to {
        return Some(vec![from.to_owned()]);
    }

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        adjacency
            .entry(edge.from.as_str())
            .or_default()
            .push(edge.to.as_str());
    }

    let mut queue = VecDeque::from([from]);
    let mut visited = HashSet::from([from]);
    let mut parent: HashMap<&str, &str> = HashMap::new();

    while let Some(current) = queue.pop_front() {
        if current == to {
            break;
        }

        let Some(neighbors) = adjacency.get(current) else {
            continue;
        };

        for &next in neighbors {
            if visited.insert(next) {
                parent.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    if !visited.contains(to) {
        return None;
    }

    let mut path = vec![to.to_owned()];
    let mut cursor = to;
    while cursor != from {
        cursor = parent.get(cursor).copied()?;
        path.push(cursor.to_owned());
    }

    path.reverse();
    Some(path)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub score: i64,
}

impl NoteGraph {
    /// Fuzzy title search, best matches first. Ties keep node order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let matcher = SkimMatcherV2::default();
        let mut hits = self
            .nodes
            .iter()
            .filter_map(|node| {
                let label = if node.title.is_empty() {
                    node.id.as_str()
                } else {
                    node.title.as_str()
                };
                fuzzy_match_score(&matcher, label, query).map(|score| SearchHit {
                    id: node.id.clone(),
                    title: node.title.clone(),
                    score,
                })
            })
            .collect::<Vec<_>>();

        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(limit);
        hits
    }
}

/// Case-sensitive match first, then a lowercased retry.
pub fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}
