//! ConceptNet HTTP client
//!
//! Provides async access to the public ConceptNet 5 API with:
//! - Concept lookup (`/c/{lang}/{term}`), optionally following pagination
//! - Related terms (`/related/c/{lang}/{term}`)
//! - Relations between two concepts (`/query`)
//! - A shared response cache keyed by request URL
//! - Rate limit handling with exponential backoff
//!
//! Terms are percent-encoded as single path segments and query values, so
//! names such as `C#` or `r&b` address their own concept.

use std::time::Duration;

use reqwest::{Client as HttpClient, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::cache::{CacheStats, ResponseCache};
use crate::config::ConceptNetConfig;
use crate::error::{Error, Result};

use super::types::{ConceptEdge, ConceptPage, RelatedResponse, RelatedTerm};

/// Public ConceptNet API
pub const CONCEPTNET_BASE_URL: &str = "https://api.conceptnet.io";

/// Maximum number of attempts for rate-limited requests
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BACKOFF_BASE_MS: u64 = 1000;

/// ConceptNet client
///
/// Cheap to clone; clones share the HTTP connection pool and response cache.
#[derive(Clone)]
pub struct ConceptNetClient {
    http_client: HttpClient,
    base_url: Url,
    lang: String,
    cache: ResponseCache<String>,
}

impl std::fmt::Debug for ConceptNetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConceptNetClient")
            .field("base_url", &self.base_url())
            .field("lang", &self.lang)
            .field("cached", &self.cache.len())
            .finish()
    }
}

/// Builder for [`ConceptNetClient`]
#[derive(Default)]
pub struct ConceptNetClientBuilder {
    config: Option<ConceptNetConfig>,
    base_url: Option<String>,
    lang: Option<String>,
    timeout_secs: Option<u64>,
    cache: Option<ResponseCache<String>>,
}

impl ConceptNetClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take base url, language and timeout from configuration
    pub fn config(mut self, config: ConceptNetConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the base url (mainly for local mirrors)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Share an existing response cache
    pub fn cache(mut self, cache: ResponseCache<String>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> Result<ConceptNetClient> {
        let config = self.config.unwrap_or_default();
        let timeout_secs = self.timeout_secs.unwrap_or(config.timeout_secs);

        let raw_lang = self.lang.unwrap_or(config.lang);
        let lang = ConceptNetConfig::parse_lang(&raw_lang).ok_or_else(|| {
            Error::ConfigError(format!("Invalid ConceptNet language code: '{}'", raw_lang))
        })?;

        let raw_url = self.base_url.unwrap_or(config.base_url);
        let base_url = Url::parse(raw_url.trim())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                Error::ConfigError(format!("Invalid ConceptNet base url: '{}'", raw_url))
            })?;

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("brain/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::NetworkError)?;

        Ok(ConceptNetClient {
            http_client,
            base_url,
            lang,
            cache: self.cache.unwrap_or_else(|| ResponseCache::new(0)),
        })
    }
}

impl ConceptNetClient {
    pub fn new(config: ConceptNetConfig) -> Result<Self> {
        ConceptNetClientBuilder::new().config(config).build()
    }

    pub fn builder() -> ConceptNetClientBuilder {
        ConceptNetClientBuilder::new()
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Base url without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// ConceptNet URI of a concept in the client language
    pub fn concept_path(&self, name: &str) -> String {
        concept_path(&self.lang, name)
    }

    /// Request URL of a concept's first page
    pub fn concept_url(&self, name: &str) -> Result<Url> {
        let term = normalized_term(name)?;
        self.endpoint(&["c", &self.lang, &term])
    }

    /// First page of edges for a concept
    pub async fn get_concept(&self, name: &str) -> Result<ConceptPage> {
        let url = self.concept_url(name)?;
        self.get_json(&url).await
    }

    /// Edges for a concept, following `nextPage` until `max_edges` are collected
    pub async fn get_concept_edges(
        &self,
        name: &str,
        max_edges: usize,
    ) -> Result<Vec<ConceptEdge>> {
        let mut page = self.get_concept(name).await?;
        let mut edges = std::mem::take(&mut page.edges);

        while edges.len() < max_edges {
            let Some(next) = page.next_page() else {
                break;
            };
            let url = Url::parse(&format!("{}{}", self.base_url(), next)).map_err(|e| {
                Error::ConceptNetError(format!("Invalid next page link '{}': {}", next, e))
            })?;
            page = self.get_json(&url).await?;
            if page.edges.is_empty() {
                break;
            }
            edges.append(&mut page.edges);
        }

        edges.truncate(max_edges);
        Ok(edges)
    }

    /// Terms related to `name`, restricted to `filter_lang`
    pub async fn get_related(&self, name: &str, filter_lang: &str) -> Result<Vec<RelatedTerm>> {
        let filter_lang = ConceptNetConfig::parse_lang(filter_lang).ok_or_else(|| {
            Error::InvalidInput(format!("Invalid language code '{}'", filter_lang))
        })?;
        let term = normalized_term(name)?;

        let mut url = self.endpoint(&["related", "c", &self.lang, &term])?;
        url.query_pairs_mut()
            .append_pair("filter", &format!("/c/{}", filter_lang));

        let response: RelatedResponse = self.get_json(&url).await?;
        Ok(response.related)
    }

    /// Human-readable sentences for every edge between `a` and `b`
    pub async fn find_relations(&self, a: &str, b: &str) -> Result<Vec<String>> {
        normalized_term(a)?;
        normalized_term(b)?;

        let mut url = self.endpoint(&["query"])?;
        url.query_pairs_mut()
            .append_pair("node", &self.concept_path(a))
            .append_pair("other", &self.concept_path(b));

        let page: ConceptPage = self.get_json(&url).await?;
        Ok(page
            .edges
            .into_iter()
            .filter_map(|edge| edge.surface_text)
            .collect())
    }

    /// Base url extended by `segments`, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::ConfigError(format!("Invalid ConceptNet base url: '{}'", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET `url` through the cache with rate-limit retries
    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let key = url.as_str().to_string();
        let body = match self.cache.get(&key) {
            Some(body) => {
                debug!(url = %url, "ConceptNet cache hit");
                body
            }
            None => {
                let body = self.execute_request(url).await?;
                self.cache.insert(key, body.clone());
                body
            }
        };

        serde_json::from_str(&body).map_err(|e| {
            Error::ConceptNetError(format!("Failed to parse response from {}: {}", url, e))
        })
    }

    async fn execute_request(&self, url: &Url) -> Result<String> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.send_request(url).await {
                Ok(body) => return Ok(body),
                Err(Error::RateLimited(retry_after)) if attempts < MAX_RETRY_ATTEMPTS => {
                    let backoff = calculate_backoff(attempts, retry_after);
                    warn!(
                        attempt = attempts,
                        wait_ms = backoff,
                        "Rate limited by ConceptNet, retrying after backoff"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_request(&self, url: &Url) -> Result<String> {
        debug!(url = %url, "Sending ConceptNet request");

        let response = self
            .http_client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(Error::NetworkError)?;

        let status = response.status();
        if !status.is_success() {
            let resource = url
                .as_str()
                .strip_prefix(self.base_url())
                .unwrap_or(url.as_str());
            return handle_error_response(resource, status, response).await;
        }

        response.text().await.map_err(Error::NetworkError)
    }
}

async fn handle_error_response<T>(
    resource: &str,
    status: reqwest::StatusCode,
    response: reqwest::Response,
) -> Result<T> {
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();

    match status.as_u16() {
        404 => Err(Error::ConceptNotFound(resource.to_string())),
        429 => Err(Error::RateLimited(retry_after)),
        400 => Err(Error::ConceptNetError(format!("Bad request: {}", body))),
        500..=599 => Err(Error::ConceptNetError(format!(
            "Server error ({}): {}",
            status, body
        ))),
        _ => Err(Error::ConceptNetError(format!(
            "HTTP error {}: {}",
            status, body
        ))),
    }
}

/// `/c/{lang}/{term}` with the term lowercased and whitespace joined by `_`
pub fn concept_path(lang: &str, name: &str) -> String {
    format!("/c/{}/{}", lang, normalize_term(name))
}

/// ConceptNet URI form of a term: `Fallen Leaf` becomes `fallen_leaf`
pub fn normalize_term(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

fn normalized_term(name: &str) -> Result<String> {
    let term = normalize_term(name);
    if term.is_empty() {
        return Err(Error::InvalidInput("Concept name cannot be empty".to_string()));
    }
    Ok(term)
}

/// Wait before the next attempt: the server's `Retry-After` when given,
/// otherwise 1s, 2s, 4s, ...
fn calculate_backoff(attempt: u32, retry_after: Option<u64>) -> u64 {
    match retry_after {
        Some(secs) => secs.saturating_mul(1000),
        None => BACKOFF_BASE_MS.saturating_mul(2u64.pow(attempt.saturating_sub(1))),
    }
}
