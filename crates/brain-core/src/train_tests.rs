//! Trainer workflow tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::KeywordCache;
use crate::error::{Error, Result};
use crate::graph::{
    ConfidencePolicy, GraphService, Label, MemoryGraph, NodeRef, RelType, Triple, UpsertOutcome,
};
use crate::train::{Assertion, ConceptSource, Trainer, parse_selection};

/// Canned triples per concept; unknown concepts are "not found"
#[derive(Default)]
struct FakeSource {
    triples: HashMap<String, Vec<Triple>>,
}

impl FakeSource {
    fn with(mut self, name: &str, triples: &[(&str, &str, &str)]) -> Self {
        self.triples.insert(
            name.to_string(),
            triples
                .iter()
                .map(|(from, rel, to)| Triple::new(*from, RelType::new(rel).unwrap(), *to))
                .collect(),
        );
        self
    }
}

#[async_trait]
impl ConceptSource for FakeSource {
    async fn triples_for(&self, name: &str, limit: usize) -> Result<Vec<Triple>> {
        self.triples
            .get(name)
            .map(|t| t.iter().take(limit).cloned().collect())
            .ok_or_else(|| Error::ConceptNotFound(name.to_string()))
    }
}

fn trainer(source: FakeSource) -> (Arc<MemoryGraph>, Trainer<FakeSource>) {
    let graph = Arc::new(MemoryGraph::new());
    let service = GraphService::new(
        graph.clone(),
        ConfidencePolicy::default(),
        KeywordCache::new(64),
    );
    (graph, Trainer::new(service, source))
}

fn leaf_and_tree() -> FakeSource {
    FakeSource::default()
        .with(
            "leaf",
            &[("leaf", "PART_OF", "plant"), ("leaf", "AT_LOCATION", "tree")],
        )
        .with(
            "tree",
            &[("tree", "IS_A", "plant"), ("leaf", "AT_LOCATION", "tree")],
        )
}

#[tokio::test]
async fn test_assert_upserts_edge() {
    let (graph, trainer) = trainer(FakeSource::default());
    let assertion = Assertion::parse("leaf Concept PART_OF tree Concept").unwrap();

    let first = trainer.assert(&assertion).await.unwrap();
    let second = trainer.assert(&assertion).await.unwrap();

    assert_eq!(first, UpsertOutcome::Created { confidence: 0.5 });
    assert_eq!(second.confidence(), 0.55);
    assert_eq!(graph.edge_count(), 1);
}

#[tokio::test]
async fn test_suggest_merges_and_dedupes() {
    let (_, trainer) = trainer(leaf_and_tree());

    let suggestions = trainer
        .suggest(&["leaf".to_string(), "tree".to_string()])
        .await;

    let lines: Vec<String> = suggestions.triples.iter().map(|t| t.to_string()).collect();
    assert_eq!(
        lines,
        [
            "leaf PART_OF plant",
            "leaf AT_LOCATION tree",
            "tree IS_A plant"
        ]
    );
    assert!(suggestions.failures.is_empty());
}

#[tokio::test]
async fn test_suggest_records_failures_and_continues() {
    let (_, trainer) = trainer(leaf_and_tree());

    let suggestions = trainer
        .suggest(&["qwzx".to_string(), "leaf".to_string()])
        .await;

    assert_eq!(suggestions.triples.len(), 2);
    assert_eq!(suggestions.failures.len(), 1);
    assert_eq!(suggestions.failures[0].0, "qwzx");
}

#[tokio::test]
async fn test_suggest_respects_limit() {
    let (_, trainer) = trainer(leaf_and_tree());
    let trainer = trainer.with_limit(1);

    let suggestions = trainer.suggest(&["leaf".to_string()]).await;
    assert_eq!(suggestions.triples.len(), 1);
}

#[tokio::test]
async fn test_ingest_selected_suggestions() {
    let (graph, trainer) = trainer(leaf_and_tree());
    let suggestions = trainer
        .suggest(&["leaf".to_string(), "tree".to_string()])
        .await;

    let chosen = suggestions.pick(&parse_selection("0 2", suggestions.triples.len()).unwrap());
    let concept = Label::new("Concept").unwrap();
    let report = trainer.ingest(&chosen, &concept).await;

    assert_eq!(report.created, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(graph.edge_count(), 2);

    let plant = NodeRef::new(concept, "plant");
    assert!(trainer.graph().keywords().contains(&plant));
}

#[tokio::test]
async fn test_ingest_all_twice_strengthens() {
    let (graph, trainer) = trainer(leaf_and_tree());
    let concept = Label::new("Concept").unwrap();
    let suggestions = trainer.suggest(&["leaf".to_string()]).await;

    trainer.ingest(&suggestions.triples, &concept).await;
    let report = trainer.ingest(&suggestions.triples, &concept).await;

    assert_eq!(report.created, 0);
    assert_eq!(report.strengthened, 2);
    assert_eq!(graph.edge_count(), 2);
}
