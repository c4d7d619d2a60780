//! Concept graph: nodes, relationships and the upsert workflow
//!
//! - `types`: validated labels and relationship types, edges, outcomes
//! - `confidence`: the strengthening rule for repeated assertions
//! - `repository`: storage trait implemented by Neo4j and memory backends
//! - `service`: create-or-strengthen workflow with keyword caching
//!
//! # Usage
//!
//! ```ignore
//! use brain_core::graph::{GraphService, Label, NodeRef, RelType};
//!
//! let person = Label::new("Person")?;
//! let outcome = service
//!     .assert_edge(
//!         &NodeRef::new(person.clone(), "Yang"),
//!         &RelType::new("KNOWS")?,
//!         &NodeRef::new(person, "Fangfang"),
//!     )
//!     .await?;
//! ```

mod confidence;
mod display;
mod memory;
mod neo4j;
mod repository;
mod service;
mod types;

pub use confidence::{
    ConfidencePolicy, DEFAULT_INCREASE_FACTOR, DEFAULT_INITIAL_CONFIDENCE, calculate_confidence,
};
pub use display::{format_edge, format_edges};
pub use memory::MemoryGraph;
pub use neo4j::Neo4jGraph;
pub use repository::GraphRepository;
pub use service::GraphService;
pub use types::{Edge, IngestReport, Label, NodeRef, RelType, Triple, UpsertOutcome};
