//! Interactive training helpers
//!
//! Prompt parsing lives in `input`; [`Trainer`] ties the graph service to a
//! [`ConceptSource`] for the assert → suggest → ingest loop.

mod input;
mod trainer;

pub use input::{
    ASSERTION_FORMAT, Assertion, IngestChoice, NODE_QUERY_FORMAT, NodeQuery, is_exit,
    numbered_triples, parse_selection,
};
pub use trainer::{ConceptSource, DEFAULT_SUGGESTION_LIMIT, Suggestions, Trainer};
