//! In-process graph used for dry runs and tests

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};

use super::repository::GraphRepository;
use super::types::{Edge, Label, NodeRef, RelType};

#[derive(Debug, Clone)]
struct StoredEdge {
    from: NodeRef,
    rel: RelType,
    to: NodeRef,
    confidence: Option<f64>,
}

impl StoredEdge {
    fn matches(&self, from: &NodeRef, rel: &RelType, to: &NodeRef) -> bool {
        &self.from == from && &self.rel == rel && &self.to == to
    }

    fn to_edge(&self) -> Edge {
        Edge {
            from: self.from.name.clone(),
            rel: self.rel.to_string(),
            to: self.to.name.clone(),
            confidence: self.confidence,
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    nodes: Vec<NodeRef>,
    edges: Vec<StoredEdge>,
}

/// Graph repository held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: Mutex<MemoryState>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.state.lock().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.state.lock().edges.len()
    }

    /// Insert a relationship as another tool would, possibly without a confidence
    pub fn insert_raw_edge(
        &self,
        from: NodeRef,
        rel: RelType,
        to: NodeRef,
        confidence: Option<f64>,
    ) {
        let mut state = self.state.lock();
        for node in [&from, &to] {
            if !state.nodes.contains(node) {
                state.nodes.push(node.clone());
            }
        }
        state.edges.push(StoredEdge {
            from,
            rel,
            to,
            confidence,
        });
    }

    /// Remove a node and its relationships
    pub fn remove_node(&self, node: &NodeRef) {
        let mut state = self.state.lock();
        state.nodes.retain(|n| n != node);
        state.edges.retain(|e| &e.from != node && &e.to != node);
    }
}

fn label_matches(node: &NodeRef, name: &str, label: Option<&Label>) -> bool {
    node.name == name && label.is_none_or(|l| &node.label == l)
}

#[async_trait]
impl GraphRepository for MemoryGraph {
    async fn find_node(&self, name: &str, label: Option<&Label>) -> Result<Vec<String>> {
        let state = self.state.lock();
        Ok(state
            .nodes
            .iter()
            .filter(|n| label_matches(n, name, label))
            .map(|n| n.name.clone())
            .collect())
    }

    async fn create_node(&self, node: &NodeRef) -> Result<()> {
        let mut state = self.state.lock();
        if !state.nodes.contains(node) {
            state.nodes.push(node.clone());
        }
        Ok(())
    }

    async fn find_edge(
        &self,
        from: &NodeRef,
        rel: &RelType,
        to: &NodeRef,
    ) -> Result<Option<Edge>> {
        let state = self.state.lock();
        Ok(state
            .edges
            .iter()
            .find(|e| e.matches(from, rel, to))
            .map(StoredEdge::to_edge))
    }

    async fn create_edge(
        &self,
        from: &NodeRef,
        rel: &RelType,
        to: &NodeRef,
        confidence: f64,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if !state.nodes.contains(from) || !state.nodes.contains(to) {
            return Err(Error::NodeNotFound(format!("{} or {}", from, to)));
        }
        state.edges.push(StoredEdge {
            from: from.clone(),
            rel: rel.clone(),
            to: to.clone(),
            confidence: Some(confidence),
        });
        Ok(())
    }

    async fn set_confidence(
        &self,
        from: &NodeRef,
        rel: &RelType,
        to: &NodeRef,
        confidence: f64,
    ) -> Result<()> {
        let mut state = self.state.lock();
        let mut affected = 0;
        for edge in state.edges.iter_mut().filter(|e| e.matches(from, rel, to)) {
            edge.confidence = Some(confidence);
            affected += 1;
        }
        if affected == 0 {
            return Err(Error::NodeNotFound(format!("{} or {}", from, to)));
        }
        Ok(())
    }

    async fn find_all_edges(&self, name: &str, label: Option<&Label>) -> Result<Vec<Edge>> {
        let state = self.state.lock();
        let outgoing = state
            .edges
            .iter()
            .filter(|e| label_matches(&e.from, name, label));
        let incoming = state
            .edges
            .iter()
            .filter(|e| label_matches(&e.to, name, label));
        Ok(outgoing.chain(incoming).map(StoredEdge::to_edge).collect())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
