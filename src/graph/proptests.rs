//! Property-based tests for the indexer invariants.

use std::collections::HashSet;

use proptest::prelude::*;

use super::{EdgeKind, index_graph};
use crate::notes::Note;

/// Notes `n0..nK` titled `Note K`, each body linking to the listed targets.
/// Targets wrap around the note count so every link resolves.
fn build_notes(link_targets: &[Vec<usize>]) -> Vec<Note> {
    let count = link_targets.len();
    link_targets
        .iter()
        .enumerate()
        .map(|(index, targets)| {
            let content = targets
                .iter()
                .map(|target| format!("[[Note {}]]", target % count))
                .collect::<Vec<_>>()
                .join(" and ");
            Note::new(format!("n{index}"), format!("Note {index}"), content)
        })
        .collect()
}

fn non_self_links(link_targets: &[Vec<usize>]) -> usize {
    let count = link_targets.len();
    link_targets
        .iter()
        .enumerate()
        .map(|(index, targets)| {
            targets
                .iter()
                .filter(|target| *target % count != index)
                .count()
        })
        .sum()
}

fn link_targets() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0usize..8, 0..6), 1..8)
}

proptest! {
    #[test]
    fn test_no_self_loops(targets in link_targets()) {
        let graph = index_graph(&build_notes(&targets));
        prop_assert!(graph.edges.iter().all(|edge| edge.from != edge.to));
        prop_assert!(graph.links.iter().all(|edge| edge.from != edge.to));
    }

    #[test]
    fn test_one_edge_per_unordered_pair(targets in link_targets()) {
        let graph = index_graph(&build_notes(&targets));
        let mut pairs = HashSet::new();
        for edge in &graph.edges {
            prop_assert!(pairs.insert(edge.unordered_pair()));
        }

        let linked = graph
            .links
            .iter()
            .map(|edge| edge.unordered_pair())
            .collect::<HashSet<_>>();
        prop_assert_eq!(pairs, linked);
    }

    #[test]
    fn test_degree_sum_counts_both_endpoints(targets in link_targets()) {
        let graph = index_graph(&build_notes(&targets));
        let expected = non_self_links(&targets);
        prop_assert_eq!(graph.total_degree(), 2 * expected);

        let forward = graph
            .links
            .iter()
            .filter(|edge| edge.kind != EdgeKind::Backlink)
            .count();
        prop_assert_eq!(forward, expected);
    }

    #[test]
    fn test_indexing_is_idempotent(targets in link_targets()) {
        let notes = build_notes(&targets);
        let first = index_graph(&notes);
        let second = index_graph(&notes);
        prop_assert_eq!(first, second);
    }
}
