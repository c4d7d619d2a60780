//! brain core library
//!
//! A small knowledge-graph trainer:
//! - Graph storage in Neo4j (or memory) with confidence that grows on repetition
//! - ConceptNet lookups turned into relationship suggestions
//! - Plain-text articles from a MediaWiki MySQL import
//! - Prompt parsing and the training workflow used by the CLI

pub mod cache;
pub mod concept_net;
pub mod config;
pub mod error;
pub mod graph;
pub mod train;
pub mod wiki;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::concept_net::ConceptNetClient;
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::graph::{GraphService, Label, NodeRef, RelType, Triple, UpsertOutcome};
    pub use crate::train::{Assertion, Trainer};
}

#[cfg(test)]
mod train_tests;
