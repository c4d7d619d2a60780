//! CLI integration tests for brain
//!
//! Runs the binary end-to-end with an isolated config directory. Graph
//! commands use `--dry-run` so no Neo4j server is needed.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command with its own config dir and working directory (no stray `.env`)
#[allow(deprecated)]
fn brain_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("brain").unwrap();
    cmd.current_dir(home.path());
    cmd.env("BRAIN_CONFIG_DIR", home.path().join("config"));
    cmd.env_remove("BRAIN_NEO4J_PASSWORD");
    cmd.env_remove("BRAIN_NEO4J_CREDENTIALS");
    cmd.env_remove("BRAIN_MYSQL_PASSWORD");
    cmd.env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();

    brain_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("train"))
        .stdout(predicate::str::contains("explore"))
        .stdout(predicate::str::contains("concept"))
        .stdout(predicate::str::contains("wiki"))
        .stdout(predicate::str::contains("doctor"));
}

#[test]
fn test_wiki_requires_title_or_id() {
    let home = TempDir::new().unwrap();

    brain_cmd(&home).arg("wiki").assert().failure();
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_path_uses_config_dir() {
    let home = TempDir::new().unwrap();

    brain_cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"))
        .stdout(predicate::str::contains(
            home.path().join("config").to_string_lossy().to_string(),
        ));
}

#[test]
fn test_config_list_shows_defaults() {
    let home = TempDir::new().unwrap();

    brain_cmd(&home)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("neo4j.uri = bolt://localhost:7687"))
        .stdout(predicate::str::contains("concept_net.lang = en"))
        .stdout(predicate::str::contains("graph.initial_confidence = 0.5"))
        .stdout(predicate::str::contains("graph.default_label = Concept"))
        .stdout(predicate::str::contains("neo4j.password = (not set"));
}

#[test]
fn test_config_set_then_get() {
    let home = TempDir::new().unwrap();

    brain_cmd(&home)
        .args(["config", "set", "concept_net.lang", "fr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set concept_net.lang = fr"));

    brain_cmd(&home)
        .args(["config", "get", "concept_net.lang"])
        .assert()
        .success()
        .stdout("fr\n");

    assert!(home.path().join("config").join("config.toml").exists());
}

#[test]
fn test_config_set_rejects_out_of_range_confidence() {
    let home = TempDir::new().unwrap();

    brain_cmd(&home)
        .args(["config", "set", "graph.initial_confidence", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 0.0 and 1.0"));
}

#[test]
fn test_config_refuses_passwords() {
    let home = TempDir::new().unwrap();

    brain_cmd(&home)
        .args(["config", "set", "neo4j.password", "hunter2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("BRAIN_NEO4J_PASSWORD"));
}

#[test]
fn test_config_reset_restores_defaults() {
    let home = TempDir::new().unwrap();

    brain_cmd(&home)
        .args(["config", "set", "graph.default_label", "Thing"])
        .assert()
        .success();

    brain_cmd(&home)
        .args(["--quiet", "config", "reset"])
        .assert()
        .success();

    brain_cmd(&home)
        .args(["config", "get", "graph.default_label"])
        .assert()
        .success()
        .stdout("Concept\n");
}

#[test]
fn test_config_get_unknown_key() {
    let home = TempDir::new().unwrap();

    brain_cmd(&home)
        .args(["config", "get", "nope.nothing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

// ============================================================================
// Graph commands (in-memory)
// ============================================================================

#[test]
fn test_dry_run_assert_creates_relationship() {
    let home = TempDir::new().unwrap();

    brain_cmd(&home)
        .args([
            "--dry-run", "assert", "Yang", "Person", "knows", "Fangfang", "Person",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Created (Person:Yang) -[KNOWS]-> (Person:Fangfang) (confidence 0.500)",
        ));
}

#[test]
fn test_dry_run_assert_uses_configured_confidence() {
    let home = TempDir::new().unwrap();

    brain_cmd(&home)
        .args(["config", "set", "graph.initial_confidence", "0.3"])
        .assert()
        .success();

    brain_cmd(&home)
        .args(["--dry-run", "assert", "a", "Thing", "IS", "b", "Thing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(confidence 0.300)"));
}

#[test]
fn test_assert_rejects_invalid_label() {
    let home = TempDir::new().unwrap();

    brain_cmd(&home)
        .args([
            "--dry-run", "assert", "Yang", "Per-son", "KNOWS", "Fangfang", "Person",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid label 'Per-son'"));
}

#[test]
fn test_assert_without_credentials_fails() {
    let home = TempDir::new().unwrap();

    brain_cmd(&home)
        .args(["assert", "Yang", "Person", "KNOWS", "Fangfang", "Person"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("BRAIN_NEO4J_PASSWORD"));
}

#[test]
fn test_dry_run_edges_on_empty_graph() {
    let home = TempDir::new().unwrap();

    brain_cmd(&home)
        .args(["--dry-run", "edges", "Yang", "--label", "Person"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No relationships found."));
}

#[test]
fn test_dry_run_explore_reads_stdin() {
    let home = TempDir::new().unwrap();

    brain_cmd(&home)
        .args(["--quiet", "--dry-run", "explore"])
        .write_stdin("Yang\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("No relationships found."));
}
