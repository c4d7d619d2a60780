//! Create-or-strengthen workflow on top of a [`GraphRepository`]

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::KeywordCache;
use crate::error::{Error, Result};

use super::confidence::ConfidencePolicy;
use super::repository::GraphRepository;
use super::types::{Edge, IngestReport, Label, NodeRef, RelType, Triple, UpsertOutcome};

/// Graph operations used by the CLI and the trainer
#[derive(Clone)]
pub struct GraphService {
    repo: Arc<dyn GraphRepository>,
    policy: ConfidencePolicy,
    keywords: KeywordCache,
}

impl std::fmt::Debug for GraphService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphService")
            .field("backend", &self.repo.backend())
            .field("policy", &self.policy)
            .finish()
    }
}

impl GraphService {
    pub fn new(
        repo: Arc<dyn GraphRepository>,
        policy: ConfidencePolicy,
        keywords: KeywordCache,
    ) -> Self {
        Self {
            repo,
            policy,
            keywords,
        }
    }

    pub fn policy(&self) -> ConfidencePolicy {
        self.policy
    }

    pub fn keywords(&self) -> &KeywordCache {
        &self.keywords
    }

    pub fn backend(&self) -> &'static str {
        self.repo.backend()
    }

    /// Make sure `node` exists; returns true if it had to be created
    pub async fn ensure_node(&self, node: &NodeRef) -> Result<bool> {
        if self.keywords.contains(node) {
            return Ok(false);
        }

        let found = self.repo.find_node(&node.name, Some(&node.label)).await?;
        let created = if found.is_empty() {
            self.repo.create_node(node).await?;
            true
        } else {
            false
        };

        self.keywords.remember(node);
        Ok(created)
    }

    /// Assert `(from)-[rel]->(to)`
    ///
    /// Creates missing nodes, then either creates the relationship with the
    /// initial confidence or strengthens the existing one.
    pub async fn assert_edge(
        &self,
        from: &NodeRef,
        rel: &RelType,
        to: &NodeRef,
    ) -> Result<UpsertOutcome> {
        self.ensure_node(from).await?;
        self.ensure_node(to).await?;

        let result = match self.repo.find_edge(from, rel, to).await? {
            None => {
                let confidence = self.policy.initial;
                self.repo
                    .create_edge(from, rel, to, confidence)
                    .await
                    .map(|()| UpsertOutcome::Created { confidence })
            }
            Some(existing) => {
                let previous = existing.confidence.unwrap_or(self.policy.initial);
                let confidence = self.policy.strengthen(existing.confidence);
                self.repo
                    .set_confidence(from, rel, to, confidence)
                    .await
                    .map(|()| UpsertOutcome::Strengthened {
                        previous,
                        confidence,
                    })
            }
        };

        match &result {
            Ok(UpsertOutcome::Created { confidence }) => {
                info!(%rel, from = %from.name, to = %to.name, confidence, "Created relationship");
            }
            Ok(UpsertOutcome::Strengthened {
                previous,
                confidence,
            }) => {
                info!(
                    %rel,
                    from = %from.name,
                    to = %to.name,
                    previous,
                    confidence,
                    "Relationship strengthened"
                );
            }
            Err(Error::NodeNotFound(_)) => {
                // the graph changed under the cache
                self.keywords.forget(from);
                self.keywords.forget(to);
            }
            Err(_) => {}
        }

        result
    }

    /// Whether any node called `name` exists (with `label` when given)
    pub async fn node_exists(&self, name: &str, label: Option<&Label>) -> Result<bool> {
        Ok(!self.repo.find_node(name, label).await?.is_empty())
    }

    pub async fn find_edge(
        &self,
        from: &NodeRef,
        rel: &RelType,
        to: &NodeRef,
    ) -> Result<Option<Edge>> {
        self.repo.find_edge(from, rel, to).await
    }

    /// All relationships touching a node, outgoing first
    pub async fn neighbourhood(&self, name: &str, label: Option<&Label>) -> Result<Vec<Edge>> {
        let edges = self.repo.find_all_edges(name, label).await?;
        for edge in &edges {
            debug!(from = %edge.from, rel = %edge.rel, to = %edge.to, "Found relationship");
        }
        Ok(edges)
    }

    /// Assert every triple with both ends under `label`
    ///
    /// Failures are logged and counted; the remaining triples still run.
    pub async fn add_edges(&self, triples: &[Triple], label: &Label) -> IngestReport {
        let mut report = IngestReport::default();

        for triple in triples {
            let from = NodeRef::new(label.clone(), triple.from.clone());
            let to = NodeRef::new(label.clone(), triple.to.clone());

            match self.assert_edge(&from, &triple.rel, &to).await {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    warn!(triple = %triple, error = %e, "Failed to add relationship");
                    report.failed += 1;
                }
            }
        }

        info!(
            created = report.created,
            strengthened = report.strengthened,
            failed = report.failed,
            "Ingest finished"
        );
        report
    }

    pub async fn health_check(&self) -> Result<()> {
        self.repo.health_check().await
    }
}
