//! ConceptNet integration
//!
//! Fetches common-sense assertions and turns them into graph triples:
//!
//! ```ignore
//! let client = ConceptNetClient::new(config.concept_net.clone())?;
//! let page = client.get_concept("leaf").await?;
//! let triples = to_triples(&page, client.lang());
//! ```

mod client;
mod types;

use std::collections::HashSet;

pub use client::{
    CONCEPTNET_BASE_URL, ConceptNetClient, ConceptNetClientBuilder, concept_path, normalize_term,
};
pub use types::{ConceptEdge, ConceptNode, ConceptPage, PageView, Relation, RelatedTerm};

use crate::graph::{RelType, Triple};

/// Graph triples for the edges of `page` whose both ends are in `lang`
///
/// Duplicate triples are dropped, keeping the first occurrence. Edges whose
/// relation label does not map to a relationship type are skipped.
pub fn to_triples(page: &ConceptPage, lang: &str) -> Vec<Triple> {
    edges_to_triples(&page.edges, lang)
}

pub fn edges_to_triples(edges: &[ConceptEdge], lang: &str) -> Vec<Triple> {
    let mut seen = HashSet::new();
    let mut triples = Vec::new();

    for edge in edges {
        let in_lang = |node: &ConceptNode| node.language.as_deref() == Some(lang);
        if !in_lang(&edge.start) || !in_lang(&edge.end) {
            continue;
        }

        let from = edge.start.label.trim();
        let to = edge.end.label.trim();
        if from.is_empty() || to.is_empty() {
            continue;
        }

        let Some(rel) = relation_type(&edge.rel) else {
            tracing::debug!(rel = %edge.rel.id, "Skipping relation without a usable type");
            continue;
        };

        let triple = Triple::new(from, rel, to);
        if seen.insert(triple.clone()) {
            triples.push(triple);
        }
    }

    triples
}

/// Relationship type for a ConceptNet relation
///
/// Uses the label, falling back to the id without its `/r/` prefix.
pub fn relation_type(rel: &Relation) -> Option<RelType> {
    let source = if rel.label.trim().is_empty() {
        rel.id.trim_start_matches("/r/")
    } else {
        rel.label.as_str()
    };
    RelType::new(screaming_snake(source)).ok()
}

/// `IsA` → `IS_A`, `dbpedia/genre` → `DBPEDIA_GENRE`, `ExternalURL` → `EXTERNAL_URL`
pub fn screaming_snake(label: &str) -> String {
    let mut out = String::with_capacity(label.len() + 4);
    let mut prev: Option<char> = None;

    for c in label.trim().trim_start_matches("/r/").chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase()
                && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
            {
                out.push('_');
            }
            out.push(c.to_ascii_uppercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
        prev = Some(c);
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}
