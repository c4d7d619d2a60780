//! Error types for brain

use thiserror::Error;

/// Result type alias using brain's Error
pub type Result<T> = std::result::Result<T, Error>;

/// brain error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Graph errors (E001-E099)
    #[error("Graph database error: {0}")]
    GraphError(#[from] neo4rs::Error),

    #[error("Unexpected graph result: {0}")]
    GraphDecode(String),

    #[error("Invalid {kind} '{value}': use letters, digits and underscores, not starting with a digit.")]
    InvalidIdentifier { kind: &'static str, value: String },

    #[error("Node '{0}' not found.")]
    NodeNotFound(String),

    // Network errors (E100-E199)
    #[error("Network error: {0}. Check your internet connection.")]
    NetworkError(#[from] reqwest::Error),

    #[error("ConceptNet error: {0}")]
    ConceptNetError(String),

    #[error("Concept '{0}' not found on ConceptNet.")]
    ConceptNotFound(String),

    /// Carries the server's `Retry-After` in seconds when it sent one
    #[error("Rate limited by ConceptNet{}", retry_hint(.0))]
    RateLimited(Option<u64>),

    // Wiki database errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Article '{0}' not found in the wiki database.")]
    ArticleNotFound(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    retry_after
        .map(|secs| format!(" (retry after {secs}s)"))
        .unwrap_or_default()
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::GraphError(_) => "E001",
            Self::GraphDecode(_) => "E002",
            Self::InvalidIdentifier { .. } => "E003",
            Self::NodeNotFound(_) => "E004",
            Self::NetworkError(_) => "E100",
            Self::ConceptNetError(_) => "E101",
            Self::ConceptNotFound(_) => "E102",
            Self::RateLimited(_) => "E103",
            Self::DatabaseError(_) => "E400",
            Self::ArticleNotFound(_) => "E401",
            Self::ConfigError(_) => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::GraphError(_) => Some("brain doctor".to_string()),
            Self::NodeNotFound(name) => Some(format!("brain edges {}", name)),
            Self::NetworkError(_) => Some("Check internet connection".to_string()),
            Self::ConceptNotFound(_) => Some("brain concept <name> --related".to_string()),
            Self::DatabaseError(_) => Some("brain config list".to_string()),
            Self::ConfigError(_) => Some("brain config list".to_string()),
            _ => None,
        }
    }

    /// Whether the error comes from a remote service rather than from the input
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NetworkError(_) | Self::RateLimited(_) | Self::GraphError(_)
        )
    }
}
