//! Storage trait for the concept graph
//!
//! The trait abstracts over graph backends (Neo4j, in-memory). It exposes
//! the primitive reads and writes; the create-or-strengthen workflow lives
//! in [`GraphService`](super::GraphService).

use async_trait::async_trait;

use crate::error::Result;

use super::types::{Edge, Label, NodeRef, RelType};

#[async_trait]
pub trait GraphRepository: Send + Sync {
    /// Names of nodes called `name`, restricted to `label` when given
    async fn find_node(&self, name: &str, label: Option<&Label>) -> Result<Vec<String>>;

    /// Create a node (no-op if an identical node already exists)
    async fn create_node(&self, node: &NodeRef) -> Result<()>;

    /// Look up the directed relationship `(from)-[rel]->(to)`
    async fn find_edge(&self, from: &NodeRef, rel: &RelType, to: &NodeRef)
    -> Result<Option<Edge>>;

    /// Create `(from)-[rel {confidence}]->(to)`; both nodes must exist
    async fn create_edge(
        &self,
        from: &NodeRef,
        rel: &RelType,
        to: &NodeRef,
        confidence: f64,
    ) -> Result<()>;

    /// Overwrite the confidence of an existing relationship
    async fn set_confidence(
        &self,
        from: &NodeRef,
        rel: &RelType,
        to: &NodeRef,
        confidence: f64,
    ) -> Result<()>;

    /// Every relationship touching the node: outgoing first, then incoming
    async fn find_all_edges(&self, name: &str, label: Option<&Label>) -> Result<Vec<Edge>>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> Result<()>;

    /// Short backend name for diagnostics
    fn backend(&self) -> &'static str;
}
