//! CLI tests

use std::sync::Arc;

use async_trait::async_trait;
use brain_core::cache::KeywordCache;
use brain_core::error::{Error, Result};
use brain_core::graph::{ConfidencePolicy, GraphService, Label, MemoryGraph, RelType, Triple};
use brain_core::train::{ConceptSource, Trainer};
use clap::Parser;

use crate::repl::{ScriptedPrompt, run_explore, run_train};
use crate::{Cli, Commands, ConfigAction};

struct LeafSource;

#[async_trait]
impl ConceptSource for LeafSource {
    async fn triples_for(&self, name: &str, _limit: usize) -> Result<Vec<Triple>> {
        match name {
            "leaf" => Ok(vec![
                Triple::new("leaf", RelType::new("PART_OF").unwrap(), "plant"),
                Triple::new("leaf", RelType::new("AT_LOCATION").unwrap(), "tree"),
                Triple::new("leaf", RelType::new("IS_A").unwrap(), "organ"),
            ]),
            other => Err(Error::ConceptNotFound(other.to_string())),
        }
    }
}

fn memory_service() -> (Arc<MemoryGraph>, GraphService) {
    let graph = Arc::new(MemoryGraph::new());
    let service = GraphService::new(
        graph.clone(),
        ConfidencePolicy::default(),
        KeywordCache::new(32),
    );
    (graph, service)
}

async fn train_session(lines: &[&str]) -> (Arc<MemoryGraph>, String) {
    let (graph, service) = memory_service();
    let trainer = Trainer::new(service, LeafSource);
    let label = Label::new("Concept").unwrap();
    let mut prompt = ScriptedPrompt::new(lines.iter().copied());
    let mut out = Vec::new();

    run_train(&trainer, &label, &mut prompt, &mut out, true)
        .await
        .unwrap();
    (graph, String::from_utf8(out).unwrap())
}

#[test]
fn test_parse_assert_command() {
    let cli = Cli::try_parse_from([
        "brain", "--dry-run", "assert", "Yang", "Person", "KNOWS", "Fangfang", "Person",
    ])
    .unwrap();

    assert!(cli.dry_run);
    match cli.command {
        Commands::Assert { from_name, rel, to_label, .. } => {
            assert_eq!(from_name, "Yang");
            assert_eq!(rel, "KNOWS");
            assert_eq!(to_label, "Person");
        }
        _ => panic!("expected assert"),
    }
}

#[test]
fn test_parse_assert_requires_five_fields() {
    assert!(Cli::try_parse_from(["brain", "assert", "Yang", "Person", "KNOWS"]).is_err());
}

#[test]
fn test_parse_wiki_requires_title_or_id() {
    assert!(Cli::try_parse_from(["brain", "wiki"]).is_err());
    assert!(Cli::try_parse_from(["brain", "wiki", "--title", "Leaf", "--id", "3"]).is_err());
    assert!(Cli::try_parse_from(["brain", "wiki", "--id", "1071857811"]).is_ok());
}

#[test]
fn test_parse_import_needs_names() {
    assert!(Cli::try_parse_from(["brain", "import"]).is_err());

    let cli = Cli::try_parse_from(["brain", "import", "leaf", "tree", "--label", "Plant"]).unwrap();
    match cli.command {
        Commands::Import { names, label, limit } => {
            assert_eq!(names, ["leaf", "tree"]);
            assert_eq!(label.as_deref(), Some("Plant"));
            assert_eq!(limit, brain_core::train::DEFAULT_SUGGESTION_LIMIT);
        }
        _ => panic!("expected import"),
    }
}

#[test]
fn test_parse_config_set() {
    let cli = Cli::try_parse_from(["brain", "config", "set", "concept_net.lang", "fr"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Config {
            action: ConfigAction::Set { .. }
        }
    ));
}

#[tokio::test]
async fn test_train_accept_all_suggestions() {
    let (graph, out) = train_session(&["leaf Concept PART_OF plant Concept", "y", "exit"]).await;

    assert!(out.contains("Created (Concept:leaf) -[PART_OF]-> (Concept:plant) (confidence 0.500)"));
    assert!(out.contains("(0): leaf PART_OF plant"));
    assert!(out.contains("ConceptNet lookup for 'plant' failed"));
    assert!(out.contains("Added 2 new, strengthened 1, failed 0"));
    assert_eq!(graph.edge_count(), 3);
}

#[tokio::test]
async fn test_train_select_with_retry_on_bad_input() {
    let (graph, out) = train_session(&[
        "leaf Concept PART_OF plant Concept",
        "maybe",
        "s",
        "7",
        "1 2",
        "exit",
    ])
    .await;

    assert!(out.contains("Unknown choice 'maybe'"));
    assert!(out.contains("out of range"));
    assert!(out.contains("Added 2 new, strengthened 0, failed 0"));
    assert_eq!(graph.edge_count(), 3);
}

#[tokio::test]
async fn test_train_manual_then_continue() {
    let (graph, out) = train_session(&[
        "leaf Concept PART_OF plant Concept",
        "m",
        "tree Concept HAS_A leaf Concept",
        "tree Concept",
        "exit",
        "",
        "exit",
    ])
    .await;

    assert!(out.contains("Created (Concept:tree) -[HAS_A]-> (Concept:leaf)"));
    assert!(out.contains("Expected 5 fields, got 2"));
    assert_eq!(graph.edge_count(), 2);
}

#[tokio::test]
async fn test_train_rejects_bad_assertion_and_stops_at_eof() {
    let (graph, out) = train_session(&["leaf PART_OF plant"]).await;

    assert!(out.contains("error: Invalid input: Expected 5 fields, got 3"));
    assert_eq!(graph.edge_count(), 0);
}

#[tokio::test]
async fn test_train_exit_from_menu() {
    let (graph, _) = train_session(&[
        "leaf Concept PART_OF plant Concept",
        "exit",
        "leaf Concept IS_A organ Concept",
    ])
    .await;

    assert_eq!(graph.edge_count(), 1);
}

#[tokio::test]
async fn test_explore_lists_edges() {
    let (_, service) = memory_service();
    let trainer = Trainer::new(service.clone(), LeafSource);
    trainer
        .assert(&brain_core::train::Assertion::parse("Yang Person KNOWS Fangfang Person").unwrap())
        .await
        .unwrap();

    let mut prompt = ScriptedPrompt::new(["Yang Person", "Kai", "a b c", "exit", "Yang"]);
    let mut out = Vec::new();
    run_explore(&service, &mut prompt, &mut out, true).await.unwrap();

    let out = String::from_utf8(out).unwrap();
    assert_eq!(
        out,
        "(Yang) -[KNOWS 0.500]-> (Fangfang)\n\
         No relationships found.\n\
         error: Invalid input: Expected 1 or 2 fields, got 3. Use: <node name> [node type]\n"
    );
}
