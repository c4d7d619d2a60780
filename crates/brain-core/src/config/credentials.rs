//! Neo4j credentials file (`{"uri": ..., "user": ..., "password": ...}`)

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Clone, Deserialize)]
pub struct Neo4jCredentials {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Neo4jCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Neo4jCredentials")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Load credentials from a JSON secret file
pub fn load_credentials(path: &Path) -> anyhow::Result<Neo4jCredentials> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse credentials file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_credentials() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"uri": "neo4j+s://example.databases.neo4j.io", "user": "neo4j", "password": "secret"}}"#
        )
        .unwrap();

        let creds = load_credentials(file.path()).unwrap();
        assert_eq!(creds.uri, "neo4j+s://example.databases.neo4j.io");
        assert_eq!(creds.user, "neo4j");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn test_load_credentials_missing_field() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"uri": "bolt://localhost:7687"}}"#).unwrap();

        let err = load_credentials(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse credentials file"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Neo4jCredentials {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "hunter2".to_string(),
        };
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("***"));
    }
}
