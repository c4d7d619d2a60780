//! Configuration management with file persistence

mod credentials;

pub use credentials::{Neo4jCredentials, load_credentials};

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Environment variable holding the Neo4j password
pub const NEO4J_PASSWORD_ENV: &str = "BRAIN_NEO4J_PASSWORD";

/// Environment variable naming a JSON credentials file for Neo4j
pub const NEO4J_CREDENTIALS_ENV: &str = "BRAIN_NEO4J_CREDENTIALS";

/// Environment variable holding the MySQL password
pub const MYSQL_PASSWORD_ENV: &str = "BRAIN_MYSQL_PASSWORD";

/// brain configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub neo4j: Neo4jConfig,
    pub mysql: MySqlConfig,
    pub concept_net: ConceptNetConfig,
    pub graph: GraphConfig,
    pub cache: CacheConfig,
    pub wiki: WikiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MySqlConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub database: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConceptNetConfig {
    pub base_url: String,
    pub lang: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub initial_confidence: f64,
    pub increase_factor: f64,
    pub default_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    pub excluded_sections: Vec<String>,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            database: "neo4j".to_string(),
        }
    }
}

impl Default for MySqlConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            database: "wiki".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for ConceptNetConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.conceptnet.io".to_string(),
            lang: "en".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            initial_confidence: 0.5,
            increase_factor: 0.10,
            default_label: "Concept".to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { size: 1000 }
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            excluded_sections: [
                "References",
                "External links",
                "See also",
                "Further reading",
                "Notes",
                "Bibliography",
                "Sources",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Neo4jConfig {
    /// Resolve uri, user and password from the credentials file or environment.
    ///
    /// A credentials file named by `BRAIN_NEO4J_CREDENTIALS` wins over the
    /// configured uri/user; the password otherwise comes from
    /// `BRAIN_NEO4J_PASSWORD`.
    pub fn resolved_credentials(&self) -> anyhow::Result<Neo4jCredentials> {
        self.credentials_from(
            env::var_os(NEO4J_CREDENTIALS_ENV).map(PathBuf::from),
            env::var(NEO4J_PASSWORD_ENV).ok(),
        )
    }

    /// Credentials from `credentials_file` when given, otherwise the
    /// configured uri/user with `password`
    pub fn credentials_from(
        &self,
        credentials_file: Option<PathBuf>,
        password: Option<String>,
    ) -> anyhow::Result<Neo4jCredentials> {
        if let Some(path) = credentials_file {
            return load_credentials(&path);
        }

        let password = password.ok_or_else(|| {
            anyhow!(
                "Neo4j password not set. Set {} or point {} at a credentials file.",
                NEO4J_PASSWORD_ENV,
                NEO4J_CREDENTIALS_ENV
            )
        })?;

        Ok(Neo4jCredentials {
            uri: self.uri.clone(),
            user: self.user.clone(),
            password,
        })
    }
}

impl MySqlConfig {
    /// Password from `BRAIN_MYSQL_PASSWORD`; `None` connects without one
    pub fn resolved_password(&self) -> Option<String> {
        env::var(MYSQL_PASSWORD_ENV).ok()
    }
}

impl ConceptNetConfig {
    /// Normalised ConceptNet language code (`EN` → `en`)
    ///
    /// Accepts ASCII letters, digits and `-`, as in `en`, `zh` or `pt-br`.
    pub fn parse_lang(value: &str) -> Option<String> {
        let lang = value.trim().to_ascii_lowercase();
        let valid = !lang.is_empty()
            && lang
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        valid.then_some(lang)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("BRAIN_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("brain")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.graph.initial_confidence) {
            return Err(anyhow!("graph.initial_confidence must be between 0.0 and 1.0"));
        }
        if !(0.0..=1.0).contains(&self.graph.increase_factor) {
            return Err(anyhow!("graph.increase_factor must be between 0.0 and 1.0"));
        }
        crate::graph::Label::new(&self.graph.default_label)
            .map_err(|e| anyhow!("graph.default_label: {}", e))?;
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "neo4j.uri" => Ok(self.neo4j.uri.clone()),
            "neo4j.user" => Ok(self.neo4j.user.clone()),
            "neo4j.database" => Ok(self.neo4j.database.clone()),

            "mysql.host" => Ok(self.mysql.host.clone()),
            "mysql.port" => Ok(self.mysql.port.to_string()),
            "mysql.user" => Ok(self.mysql.user.clone()),
            "mysql.database" => Ok(self.mysql.database.clone()),
            "mysql.max_connections" => Ok(self.mysql.max_connections.to_string()),

            "concept_net.base_url" => Ok(self.concept_net.base_url.clone()),
            "concept_net.lang" => Ok(self.concept_net.lang.clone()),
            "concept_net.timeout_secs" => Ok(self.concept_net.timeout_secs.to_string()),

            "graph.initial_confidence" => Ok(self.graph.initial_confidence.to_string()),
            "graph.increase_factor" => Ok(self.graph.increase_factor.to_string()),
            "graph.default_label" => Ok(self.graph.default_label.clone()),

            "cache.size" => Ok(self.cache.size.to_string()),

            "wiki.excluded_sections" => Ok(self.wiki.excluded_sections.join(", ")),

            // Passwords are never shown
            "neo4j.password" => Ok(if env::var(NEO4J_PASSWORD_ENV).is_ok() {
                "(set)".to_string()
            } else {
                format!("(not set - use {} env var)", NEO4J_PASSWORD_ENV)
            }),
            "mysql.password" => Ok(if env::var(MYSQL_PASSWORD_ENV).is_ok() {
                "(set)".to_string()
            } else {
                format!("(not set - use {} env var)", MYSQL_PASSWORD_ENV)
            }),

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `brain config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "neo4j.uri" => self.neo4j.uri = value.to_string(),
            "neo4j.user" => self.neo4j.user = value.to_string(),
            "neo4j.database" => self.neo4j.database = value.to_string(),

            "mysql.host" => self.mysql.host = value.to_string(),
            "mysql.port" => {
                self.mysql.port = value
                    .parse()
                    .with_context(|| format!("Invalid port value: {}", value))?;
            }
            "mysql.user" => self.mysql.user = value.to_string(),
            "mysql.database" => self.mysql.database = value.to_string(),
            "mysql.max_connections" => {
                self.mysql.max_connections = value
                    .parse()
                    .with_context(|| format!("Invalid max_connections value: {}", value))?;
            }

            "concept_net.base_url" => {
                self.concept_net.base_url = value.trim_end_matches('/').to_string();
            }
            "concept_net.lang" => {
                self.concept_net.lang = ConceptNetConfig::parse_lang(value).ok_or_else(|| {
                    anyhow!("Invalid language code '{}': use a code such as 'en'", value)
                })?;
            }
            "concept_net.timeout_secs" => {
                self.concept_net.timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
            }

            "graph.initial_confidence" => {
                let confidence: f64 = value
                    .parse()
                    .with_context(|| format!("Invalid initial_confidence value: {}", value))?;
                if !(0.0..=1.0).contains(&confidence) {
                    return Err(anyhow!("Initial confidence must be between 0.0 and 1.0"));
                }
                self.graph.initial_confidence = confidence;
            }
            "graph.increase_factor" => {
                let factor: f64 = value
                    .parse()
                    .with_context(|| format!("Invalid increase_factor value: {}", value))?;
                if !(0.0..=1.0).contains(&factor) {
                    return Err(anyhow!("Increase factor must be between 0.0 and 1.0"));
                }
                self.graph.increase_factor = factor;
            }
            "graph.default_label" => {
                crate::graph::Label::new(value).map_err(|e| anyhow!("{}", e))?;
                self.graph.default_label = value.to_string();
            }

            "cache.size" => {
                self.cache.size = value
                    .parse()
                    .with_context(|| format!("Invalid cache size value: {}", value))?;
            }

            "wiki.excluded_sections" => {
                self.wiki.excluded_sections = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }

            "neo4j.password" | "mysql.password" => {
                return Err(anyhow!(
                    "Passwords cannot be stored in configuration. \
                     Set the {} or {} environment variable instead.",
                    NEO4J_PASSWORD_ENV,
                    MYSQL_PASSWORD_ENV
                ));
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `brain config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = vec![
            "neo4j.uri",
            "neo4j.user",
            "neo4j.database",
            "neo4j.password",
            "mysql.host",
            "mysql.port",
            "mysql.user",
            "mysql.database",
            "mysql.max_connections",
            "mysql.password",
            "concept_net.base_url",
            "concept_net.lang",
            "concept_net.timeout_secs",
            "graph.initial_confidence",
            "graph.increase_factor",
            "graph.default_label",
            "cache.size",
            "wiki.excluded_sections",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}
