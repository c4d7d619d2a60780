//! Training workflow: assert, suggest from ConceptNet, ingest

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::concept_net::{ConceptNetClient, edges_to_triples};
use crate::error::Result;
use crate::graph::{GraphService, IngestReport, Label, Triple, UpsertOutcome};

use super::input::Assertion;

/// Edges fetched per concept when building suggestions
pub const DEFAULT_SUGGESTION_LIMIT: usize = 20;

/// Where suggested triples come from
#[async_trait]
pub trait ConceptSource: Send + Sync {
    /// Triples involving the concept `name`, at most `limit`
    async fn triples_for(&self, name: &str, limit: usize) -> Result<Vec<Triple>>;
}

#[async_trait]
impl ConceptSource for ConceptNetClient {
    async fn triples_for(&self, name: &str, limit: usize) -> Result<Vec<Triple>> {
        let edges = self.get_concept_edges(name, limit).await?;
        Ok(edges_to_triples(&edges, self.lang()))
    }
}

/// Suggestions for one round of training
#[derive(Debug, Clone, Default)]
pub struct Suggestions {
    pub triples: Vec<Triple>,
    /// Names whose lookup failed, with the error message
    pub failures: Vec<(String, String)>,
}

impl Suggestions {
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// The triples at `indices`, in that order
    pub fn pick(&self, indices: &[usize]) -> Vec<Triple> {
        indices
            .iter()
            .filter_map(|&i| self.triples.get(i).cloned())
            .collect()
    }
}

/// Glue between the graph and a concept source
pub struct Trainer<S = ConceptNetClient> {
    graph: GraphService,
    source: S,
    limit: usize,
}

impl<S: ConceptSource> Trainer<S> {
    pub fn new(graph: GraphService, source: S) -> Self {
        Self {
            graph,
            source,
            limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }

    /// Edges fetched per concept
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn graph(&self) -> &GraphService {
        &self.graph
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Upsert one assertion
    pub async fn assert(&self, assertion: &Assertion) -> Result<UpsertOutcome> {
        self.graph
            .assert_edge(&assertion.from, &assertion.rel, &assertion.to)
            .await
    }

    /// Suggested triples for every name, deduplicated
    ///
    /// A failed lookup is logged and recorded; the others still contribute.
    pub async fn suggest(&self, names: &[String]) -> Suggestions {
        let mut seen = HashSet::new();
        let mut suggestions = Suggestions::default();

        for name in names {
            match self.source.triples_for(name, self.limit).await {
                Ok(triples) => {
                    info!(concept = %name, count = triples.len(), "Fetched suggestions");
                    for triple in triples {
                        if seen.insert(triple.clone()) {
                            suggestions.triples.push(triple);
                        }
                    }
                }
                Err(e) => {
                    warn!(concept = %name, error = %e, "Failed to fetch suggestions");
                    suggestions.failures.push((name.clone(), e.to_string()));
                }
            }
        }

        suggestions
    }

    /// Add `triples` with both ends under `label`
    pub async fn ingest(&self, triples: &[Triple], label: &Label) -> IngestReport {
        self.graph.add_edges(triples, label).await
    }
}

impl<S> std::fmt::Debug for Trainer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trainer")
            .field("graph", &self.graph)
            .field("limit", &self.limit)
            .finish()
    }
}
