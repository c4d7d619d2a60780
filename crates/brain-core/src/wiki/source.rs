//! MediaWiki MySQL dump access
//!
//! Reads raw wikitext from the `text` table of an imported MediaWiki
//! database, either by `old_id` or by resolving an article title through
//! `page` and `revision`.

use std::time::Duration;

use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use tracing::{debug, info};

use crate::config::MySqlConfig;
use crate::error::{Error, Result};

const TEXT_BY_ID: &str = "SELECT CONVERT(old_text USING utf8) FROM text WHERE old_id = ?";

const TEXT_BY_TITLE: &str = "SELECT CONVERT(t.old_text USING utf8) \
     FROM page p \
     JOIN revision r ON r.rev_id = p.page_latest \
     JOIN text t ON t.old_id = r.rev_text_id \
     WHERE p.page_namespace = 0 AND p.page_title = ? \
     LIMIT 1";

/// Seconds to wait for a pooled connection
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// MediaWiki article store
#[derive(Debug, Clone)]
pub struct WikiSource {
    pool: MySqlPool,
}

impl WikiSource {
    /// Connect using `config`, with the password from the environment
    pub async fn connect(config: &MySqlConfig) -> Result<Self> {
        let password = config.resolved_password();

        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.database)
            .charset("utf8mb4");
        if let Some(password) = password.as_deref() {
            options = options.password(password);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .connect_with(options)
            .await?;

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "Connected to wiki database"
        );
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Raw wikitext stored under `old_id`
    pub async fn text_by_id(&self, old_id: u64) -> Result<Option<String>> {
        debug!(old_id, "Fetching wikitext by id");
        let text: Option<Option<String>> = sqlx::query_scalar(TEXT_BY_ID)
            .bind(old_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(text.flatten())
    }

    /// Latest wikitext of the main-namespace article called `title`
    pub async fn text_by_title(&self, title: &str) -> Result<Option<String>> {
        let key = page_title_key(title);
        if key.is_empty() {
            return Err(Error::InvalidInput("Article title cannot be empty".to_string()));
        }

        debug!(title = %key, "Fetching wikitext by title");
        let text: Option<Option<String>> = sqlx::query_scalar(TEXT_BY_TITLE)
            .bind(&key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(text.flatten())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// `page_title` form of an article title: trimmed, spaces as `_`, first letter uppercase
pub fn page_title_key(title: &str) -> String {
    let joined = title.split_whitespace().collect::<Vec<_>>().join("_");
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
