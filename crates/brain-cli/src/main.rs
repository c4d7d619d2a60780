//! brain CLI - train and explore a concept graph

mod repl;

use std::sync::Arc;

use anyhow::Context;
use brain_core::cache::{KeywordCache, ResponseCache};
use brain_core::concept_net::{ConceptNetClient, edges_to_triples};
use brain_core::config::{Config, Neo4jCredentials};
use brain_core::graph::{
    ConfidencePolicy, GraphRepository, GraphService, Label, MemoryGraph, Neo4jGraph, NodeRef,
    RelType, format_edges,
};
use brain_core::train::{Assertion, DEFAULT_SUGGESTION_LIMIT, Trainer, numbered_triples};
use brain_core::wiki::{SectionFilter, WikiReader, WikiSource};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use repl::{TerminalPrompt, describe_outcome, describe_report, run_explore, run_train};

#[derive(Parser)]
#[command(name = "brain")]
#[command(author, version, about = "Train and explore a concept graph", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a throwaway in-memory graph instead of Neo4j
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactively assert relationships and accept ConceptNet suggestions
    Train {
        /// Label for nodes added from suggestions (defaults to graph.default_label)
        #[arg(short, long)]
        label: Option<String>,
        /// ConceptNet edges fetched per concept
        #[arg(short = 'n', long, default_value_t = DEFAULT_SUGGESTION_LIMIT)]
        limit: usize,
    },

    /// Interactively list the relationships of nodes
    Explore,

    /// Assert a single relationship
    Assert {
        from_name: String,
        from_label: String,
        rel: String,
        to_name: String,
        to_label: String,
    },

    /// List the relationships of a node
    Edges {
        name: String,
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Show what ConceptNet knows about a concept
    Concept {
        name: String,
        /// List related terms instead of edges
        #[arg(short, long)]
        related: bool,
        #[arg(short = 'n', long, default_value_t = DEFAULT_SUGGESTION_LIMIT)]
        limit: usize,
    },

    /// Show ConceptNet sentences linking two concepts
    Relations { a: String, b: String },

    /// Add every ConceptNet relationship of the given concepts
    Import {
        #[arg(required = true)]
        names: Vec<String>,
        #[arg(short, long)]
        label: Option<String>,
        #[arg(short = 'n', long, default_value_t = DEFAULT_SUGGESTION_LIMIT)]
        limit: usize,
    },

    /// Print a wiki article as plain text
    Wiki {
        /// Article title
        #[arg(long, conflicts_with = "id", required_unless_present = "id")]
        title: Option<String>,
        /// Text id (`text.old_id`)
        #[arg(long)]
        id: Option<u64>,
        /// Keep reference-style sections such as "See also"
        #[arg(long)]
        keep_all_sections: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let directive = if cli.quiet { "brain=warn" } else { "brain=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Config { action } => cmd_config(action, cli.quiet),

        Commands::Doctor => cmd_doctor(cli.dry_run, cli.quiet).await,

        Commands::Train { label, limit } => {
            let config = Config::load()?;
            let graph = graph_service(&config, cli.dry_run).await?;
            cmd_train(&config, graph, label.as_deref(), limit, cli.quiet).await
        }

        Commands::Explore => {
            let config = Config::load()?;
            let graph = graph_service(&config, cli.dry_run).await?;
            let mut prompt = TerminalPrompt::new()?;
            run_explore(&graph, &mut prompt, &mut std::io::stdout(), cli.quiet).await
        }

        Commands::Assert {
            from_name,
            from_label,
            rel,
            to_name,
            to_label,
        } => {
            let config = Config::load()?;
            let assertion = Assertion::new(
                NodeRef::new(Label::new(&from_label)?, from_name),
                RelType::new(&rel)?,
                NodeRef::new(Label::new(&to_label)?, to_name),
            );
            let graph = graph_service(&config, cli.dry_run).await?;
            cmd_assert(&graph, &assertion).await
        }

        Commands::Edges { name, label } => {
            let config = Config::load()?;
            let label = label.as_deref().map(Label::new).transpose()?;
            let graph = graph_service(&config, cli.dry_run).await?;
            let edges = graph.neighbourhood(&name, label.as_ref()).await?;
            println!("{}", format_edges(&edges));
            Ok(())
        }

        Commands::Concept {
            name,
            related,
            limit,
        } => {
            let config = Config::load()?;
            cmd_concept(&config, &name, related, limit).await
        }

        Commands::Relations { a, b } => {
            let config = Config::load()?;
            cmd_relations(&config, &a, &b).await
        }

        Commands::Import {
            names,
            label,
            limit,
        } => {
            let config = Config::load()?;
            let label = ingest_label(&config, label.as_deref())?;
            let graph = graph_service(&config, cli.dry_run).await?;
            cmd_import(&config, graph, &names, &label, limit, cli.quiet).await
        }

        Commands::Wiki {
            title,
            id,
            keep_all_sections,
        } => {
            let config = Config::load()?;
            cmd_wiki(&config, title.as_deref(), id, keep_all_sections).await
        }
    }
}

// ============================================================================
// Setup
// ============================================================================

async fn graph_service(config: &Config, dry_run: bool) -> anyhow::Result<GraphService> {
    if dry_run {
        info!("Dry run: using an in-memory graph");
        return Ok(service_over(config, Arc::new(MemoryGraph::new())));
    }

    let credentials = config.neo4j.resolved_credentials()?;
    neo4j_service(config, &credentials).await
}

async fn neo4j_service(
    config: &Config,
    credentials: &Neo4jCredentials,
) -> anyhow::Result<GraphService> {
    let graph = Neo4jGraph::connect(&config.neo4j, credentials)
        .await
        .with_context(|| format!("Failed to connect to Neo4j at {}", credentials.uri))?;
    Ok(service_over(config, Arc::new(graph)))
}

fn service_over(config: &Config, repo: Arc<dyn GraphRepository>) -> GraphService {
    GraphService::new(
        repo,
        ConfidencePolicy::from_config(&config.graph),
        KeywordCache::new(config.cache.size),
    )
}

fn concept_client(config: &Config) -> anyhow::Result<ConceptNetClient> {
    Ok(ConceptNetClient::builder()
        .config(config.concept_net.clone())
        .cache(ResponseCache::new(config.cache.size))
        .build()?)
}

fn ingest_label(config: &Config, label: Option<&str>) -> anyhow::Result<Label> {
    Ok(Label::new(label.unwrap_or(&config.graph.default_label))?)
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_train(
    config: &Config,
    graph: GraphService,
    label: Option<&str>,
    limit: usize,
    quiet: bool,
) -> anyhow::Result<()> {
    let label = ingest_label(config, label)?;
    let trainer = Trainer::new(graph, concept_client(config)?).with_limit(limit);
    let mut prompt = TerminalPrompt::new()?;

    run_train(&trainer, &label, &mut prompt, &mut std::io::stdout(), quiet).await
}

async fn cmd_assert(graph: &GraphService, assertion: &Assertion) -> anyhow::Result<()> {
    let outcome = graph
        .assert_edge(&assertion.from, &assertion.rel, &assertion.to)
        .await?;
    println!("{}", describe_outcome(assertion, &outcome));
    Ok(())
}

async fn cmd_concept(
    config: &Config,
    name: &str,
    related: bool,
    limit: usize,
) -> anyhow::Result<()> {
    let client = concept_client(config)?;

    if related {
        let terms = client.get_related(name, client.lang()).await?;
        if terms.is_empty() {
            println!("No related terms found.");
        }
        for term in terms.iter().take(limit) {
            println!("{:.3}  {}", term.weight, term.term());
        }
        return Ok(());
    }

    let edges = client.get_concept_edges(name, limit).await?;
    let triples = edges_to_triples(&edges, client.lang());
    if triples.is_empty() {
        println!("No relationships found.");
    } else {
        println!("{}", numbered_triples(&triples));
    }
    Ok(())
}

async fn cmd_relations(config: &Config, a: &str, b: &str) -> anyhow::Result<()> {
    let client = concept_client(config)?;
    let sentences = client.find_relations(a, b).await?;

    if sentences.is_empty() {
        println!("No relations found between '{}' and '{}'.", a, b);
    }
    for sentence in sentences {
        println!("{}", sentence);
    }
    Ok(())
}

async fn cmd_import(
    config: &Config,
    graph: GraphService,
    names: &[String],
    label: &Label,
    limit: usize,
    quiet: bool,
) -> anyhow::Result<()> {
    let trainer = Trainer::new(graph, concept_client(config)?).with_limit(limit);
    let suggestions = trainer.suggest(names).await;

    for (name, error) in &suggestions.failures {
        warn!(concept = %name, "Skipped: {}", error);
    }
    if !quiet {
        println!(
            "Importing {} relationships as '{}'...",
            suggestions.triples.len(),
            label
        );
    }

    let report = trainer.ingest(&suggestions.triples, label).await;
    println!("{}", describe_report(&report));
    Ok(())
}

async fn cmd_wiki(
    config: &Config,
    title: Option<&str>,
    id: Option<u64>,
    keep_all_sections: bool,
) -> anyhow::Result<()> {
    let filter = if keep_all_sections {
        SectionFilter::keep_all()
    } else {
        SectionFilter::from_config(&config.wiki)
    };
    let source = WikiSource::connect(&config.mysql).await.with_context(|| {
        format!(
            "Failed to connect to MySQL at {}:{}",
            config.mysql.host, config.mysql.port
        )
    })?;
    let reader = WikiReader::new(source, filter);

    let text = match (title, id) {
        (_, Some(id)) => reader.article_by_id(id).await?,
        (Some(title), None) => reader.article(title).await?,
        (None, None) => anyhow::bail!("Pass --title or --id"),
    };
    println!("{}", text);

    reader.source().close().await;
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(dry_run: bool, quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("brain Health Check");
        println!("==================");
        println!();
    }

    let mut all_ok = true;

    let config = match Config::load() {
        Ok(config) => {
            if !quiet {
                println!("[OK] Configuration: Valid");
            }
            config
        }
        Err(e) => {
            if !quiet {
                println!("[!!] Configuration: Error - {}", e);
                println!("     Falling back to defaults for the remaining checks");
            }
            all_ok = false;
            Config::default()
        }
    };

    if !quiet {
        match Config::config_path() {
            Ok(path) if path.exists() => println!("[OK] Config file: {}", path.display()),
            Ok(path) => println!("[--] Config file: {} (using defaults)", path.display()),
            Err(e) => println!("[!!] Config file: Error - {}", e),
        }
    }

    // Graph
    if dry_run {
        if !quiet {
            println!("[--] Neo4j: skipped (dry run)");
        }
    } else {
        let connected = match config.neo4j.resolved_credentials() {
            Ok(credentials) => neo4j_service(&config, &credentials)
                .await
                .map(|graph| (graph, credentials.uri)),
            Err(e) => Err(e),
        };
        match connected {
            Ok((graph, uri)) => match graph.health_check().await {
                Ok(()) => {
                    if !quiet {
                        println!("[OK] Neo4j: Connected ({})", uri);
                    }
                }
                Err(e) => {
                    all_ok = false;
                    if !quiet {
                        println!("[!!] Neo4j: Health check failed - {}", e);
                    }
                }
            },
            Err(e) => {
                all_ok = false;
                if !quiet {
                    println!("[!!] Neo4j: {}", e);
                }
            }
        }
    }

    // Wiki database
    match WikiSource::connect(&config.mysql).await {
        Ok(source) => {
            match source.health_check().await {
                Ok(()) => {
                    if !quiet {
                        println!(
                            "[OK] MySQL: Connected ({}:{}/{})",
                            config.mysql.host, config.mysql.port, config.mysql.database
                        );
                    }
                }
                Err(e) => {
                    all_ok = false;
                    if !quiet {
                        println!("[!!] MySQL: Health check failed - {}", e);
                    }
                }
            }
            source.close().await;
        }
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] MySQL: {}", e);
            }
        }
    }

    // ConceptNet
    match concept_client(&config) {
        Ok(client) => match client.get_concept("brain").await {
            Ok(_) => {
                if !quiet {
                    println!("[OK] ConceptNet: Reachable ({})", client.base_url());
                }
            }
            Err(e) => {
                all_ok = false;
                if !quiet {
                    println!("[!!] ConceptNet: {}", e);
                    if let Some(hint) = e.suggestion() {
                        println!("     {}", hint);
                    }
                }
            }
        },
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] ConceptNet: {}", e);
            }
        }
    }

    if !quiet {
        println!();
        if all_ok {
            println!("All checks passed!");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod main_tests;
