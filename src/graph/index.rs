use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::notes::{LinkResolver, Note, extract_links, extract_tags};

use super::style::{Classification, ColorBand, node_size};
use super::{EdgeKind, GraphEdge, GraphNode, IndexOptions, NoteGraph};

pub fn index_graph(notes: &[Note]) -> NoteGraph {
    index_graph_with(notes, &IndexOptions::default())
}

/// Builds the note graph. Pure function of `notes`: no state survives the
/// call besides the returned graph.
pub fn index_graph_with(notes: &[Note], options: &IndexOptions) -> NoteGraph {
    let resolver = LinkResolver::new(notes);

    let mut seen = HashSet::with_capacity(notes.len());
    let mut sources = Vec::with_capacity(notes.len());
    for note in notes {
        if seen.insert(note.id.as_str()) {
            sources.push(note);
        } else {
            debug!(id = %note.id, "skipping note with a duplicate id");
        }
    }

    let mut degrees: HashMap<&str, usize> = HashMap::with_capacity(sources.len());
    let mut links = Vec::new();
    for note in &sources {
        for link in extract_links(&note.content) {
            let Some(target) = resolver.resolve(&link.target) else {
                debug!(source = %note.id, target = %link.target, "dropping unresolved link");
                continue;
            };

            if target == note.id {
                continue;
            }

            links.push(GraphEdge::new(&note.id, target, link.kind.into()));
            links.push(GraphEdge::new(target, &note.id, EdgeKind::Backlink));
            *degrees.entry(note.id.as_str()).or_default() += 1;
            *degrees.entry(target).or_default() += 1;
        }
    }

    let edges = dedup_edges(&links);

    let nodes = sources
        .iter()
        .map(|note| {
            let degree = degrees.get(note.id.as_str()).copied().unwrap_or(0);
            GraphNode {
                id: note.id.clone(),
                title: note.title.clone(),
                degree,
                tags: extract_tags(&note.content),
                classification: Classification::for_degree(degree, options.main_threshold),
                size: node_size(degree),
                color: ColorBand::for_degree(degree),
            }
        })
        .collect::<Vec<_>>();

    debug!(
        nodes = nodes.len(),
        links = links.len() / 2,
        edges = edges.len(),
        "indexed note graph"
    );

    NoteGraph {
        nodes,
        edges,
        links,
    }
}

/// Keeps the first edge seen for each unordered pair of endpoints, with its
/// original direction and kind. Self-loops are dropped.
pub fn dedup_edges(edges: &[GraphEdge]) -> Vec<GraphEdge> {
    let mut seen = HashSet::with_capacity(edges.len());
    edges
        .iter()
        .filter(|edge| edge.from != edge.to && seen.insert(edge.unordered_pair()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Vec<Note> {
        vec![
            Note::new("1", "Home", "See [[Work]] and [[Home]]"),
            Note::new("2", "Work", "Back to [[Home]]"),
            Note::new("3", "Isolated", "no links"),
        ]
    }

    fn degree(graph: &NoteGraph, id: &str) -> usize {
        graph.node(id).map(|node| node.degree).unwrap()
    }

    #[test]
    fn test_scenario_home_work_isolated() {
        let graph = index_graph(&scenario());

        let ids = graph.nodes.iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["1", "2", "3"]);

        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].unordered_pair(), ("1", "2"));
        assert_eq!(graph.edges[0].kind, EdgeKind::Wikilink);

        // Home -> Work and Work -> Home each count once on both endpoints.
        assert_eq!(degree(&graph, "1"), 2);
        assert_eq!(degree(&graph, "2"), 2);
        assert_eq!(degree(&graph, "3"), 0);
        assert!(graph.neighbors("3").is_empty());
        assert_eq!(graph.node("3").unwrap().classification, Classification::Isolated);
        assert_eq!(graph.node("1").unwrap().classification, Classification::Main);
    }

    #[test]
    fn test_empty_input() {
        let graph = index_graph(&[]);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert!(graph.links.is_empty());
    }

    #[test]
    fn test_self_links_are_ignored() {
        let notes = vec![Note::new("a", "Alpha", "[[Alpha]] [[a]] [me](alpha.md)")];
        let graph = index_graph(&notes);
        assert!(graph.edges.is_empty());
        assert!(graph.links.is_empty());
        assert_eq!(degree(&graph, "a"), 0);
    }

    #[test]
    fn test_repeated_links_inflate_degree_not_edges() {
        let notes = vec![
            Note::new("a", "Alpha", "[[Beta]] [[Beta]] [beta](beta.md)"),
            Note::new("b", "Beta", "[[Alpha]]"),
        ];
        let graph = index_graph(&notes);

        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.links.len(), 8);
        assert_eq!(degree(&graph, "a"), 4);
        assert_eq!(degree(&graph, "b"), 4);
        assert_eq!(graph.total_degree(), 2 * 4);
    }

    #[test]
    fn test_first_kind_wins_and_keeps_direction() {
        let notes = vec![
            Note::new("z", "Zed", "[zed to alpha](Alpha)"),
            Note::new("a", "Alpha", "[[Zed]]"),
        ];
        let graph = index_graph(&notes);

        assert_eq!(graph.edges, vec![GraphEdge::new("z", "a", EdgeKind::Mdlink)]);
    }

    #[test]
    fn test_unresolved_links_produce_nothing() {
        let notes = vec![Note::new("a", "Alpha", "[[Nowhere]] [x](https://example.com) [[")];
        let graph = index_graph(&notes);
        assert!(graph.edges.is_empty());
        assert_eq!(degree(&graph, "a"), 0);
    }

    #[test]
    fn test_duplicate_ids_keep_first_note() {
        let notes = vec![
            Note::new("a", "Alpha", "[[Beta]]"),
            Note::new("a", "Shadow", "[[Beta]] [[Beta]]"),
            Note::new("b", "Beta", ""),
        ];
        let graph = index_graph(&notes);

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.node("a").unwrap().title, "Alpha");
        assert_eq!(degree(&graph, "b"), 1);
    }

    #[test]
    fn test_tags_and_derived_attributes() {
        let mut notes = vec![Note::new("hub", "Hub", "#index #index #maps")];
        for index in 0..6 {
            notes.push(Note::new(
                format!("leaf-{index}"),
                format!("Leaf {index}"),
                "[[Hub]]",
            ));
        }
        let graph = index_graph(&notes);

        let hub = graph.node("hub").unwrap();
        assert_eq!(hub.degree, 6);
        assert_eq!(hub.tags.iter().collect::<Vec<_>>(), vec!["index", "maps"]);
        assert_eq!(hub.color, ColorBand::Medium);
        assert_eq!(hub.classification, Classification::Main);

        let leaf = graph.node("leaf-0").unwrap();
        assert_eq!(leaf.classification, Classification::Secondary);
        assert_eq!(leaf.color, ColorBand::Low);
        assert!(hub.size > leaf.size);
    }

    #[test]
    fn test_main_threshold_is_configurable() {
        let graph = index_graph_with(&scenario(), &IndexOptions { main_threshold: 3 });
        assert_eq!(graph.node("1").unwrap().classification, Classification::Secondary);
    }

    #[test]
    fn test_dedup_edges_drops_self_loops_and_reverse_pairs() {
        let edges = vec![
            GraphEdge::new("a", "b", EdgeKind::Wikilink),
            GraphEdge::new("b", "a", EdgeKind::Backlink),
            GraphEdge::new("c", "c", EdgeKind::Wikilink),
            GraphEdge::new("b", "c", EdgeKind::Mdlink),
            GraphEdge::new("a", "b", EdgeKind::Mdlink),
        ];
        let deduped = dedup_edges(&edges);
        assert_eq!(
            deduped,
            vec![
                GraphEdge::new("a", "b", EdgeKind::Wikilink),
                GraphEdge::new("b", "c", EdgeKind::Mdlink),
            ]
        );
    }
}
