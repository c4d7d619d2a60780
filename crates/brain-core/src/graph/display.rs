//! Plain-text rendering of relationships

use super::types::Edge;

/// One line per edge: `(from) -[REL 0.55]-> (to)`
pub fn format_edge(edge: &Edge) -> String {
    match edge.confidence {
        Some(confidence) => format!(
            "({}) -[{} {:.3}]-> ({})",
            edge.from, edge.rel, confidence, edge.to
        ),
        None => format!("({}) -[{}]-> ({})", edge.from, edge.rel, edge.to),
    }
}

pub fn format_edges(edges: &[Edge]) -> String {
    if edges.is_empty() {
        return "No relationships found.".to_string();
    }
    edges.iter().map(format_edge).collect::<Vec<_>>().join("\n")
}
