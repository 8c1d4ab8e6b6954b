//! # Linkhop GitHub Source
//!
//! Fetches the alias table from a file committed to a GitHub repository,
//! through the raw content host.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use linkhop_source_github::{GitHubSource, GitHubSourceConfig};
//!
//! let source = GitHubSource::new(GitHubSourceConfig::new("acme/links", "main"))?;
//! let aliases = source.fetch().await?;
//! ```

use async_trait::async_trait;
use linkhop_core::error::{AliasError, AliasResult};
use linkhop_core::traits::AliasSource;
use linkhop_core::types::AliasMap;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Default raw content host.
pub const DEFAULT_RAW_BASE_URL: &str = "https://raw.githubusercontent.com";

/// Default name of the alias file at the repository root.
pub const DEFAULT_ALIASES_FILE: &str = "aliases.json";

/// Where to find the alias file.
#[derive(Debug, Clone)]
pub struct GitHubSourceConfig {
    /// Repository full name, `owner/name`.
    pub repository: String,
    /// Branch holding the alias file.
    pub branch: String,
    /// Path of the alias file inside the repository.
    pub aliases_file: String,
    /// Raw content host, without a trailing slash.
    pub raw_base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GitHubSourceConfig {
    /// Creates a config for `repository` at `branch` with default host and file.
    pub fn new(repository: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            branch: branch.into(),
            aliases_file: DEFAULT_ALIASES_FILE.to_string(),
            raw_base_url: DEFAULT_RAW_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the alias file path.
    pub fn aliases_file(mut self, file: impl Into<String>) -> Self {
        self.aliases_file = file.into();
        self
    }

    /// Sets the raw content host.
    pub fn raw_base_url(mut self, url: impl Into<String>) -> Self {
        self.raw_base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Alias source backed by a JSON file in a GitHub repository.
#[derive(Debug, Clone)]
pub struct GitHubSource {
    config: GitHubSourceConfig,
    http_client: Client,
}

impl GitHubSource {
    /// Creates a source with its own HTTP client.
    pub fn new(config: GitHubSourceConfig) -> AliasResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AliasError::source_unavailable(e.to_string()))?;

        Ok(Self::with_client(config, http_client))
    }

    /// Creates a source sharing an existing HTTP client.
    pub fn with_client(config: GitHubSourceConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Returns the file URL without the cache-busting query.
    pub fn file_url(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.raw_base_url.trim_end_matches('/'),
            self.config.repository,
            self.config.branch,
            self.config.aliases_file.trim_start_matches('/'),
        )
    }

    /// Returns the URL to request, with a timestamp so intermediate caches
    /// never serve a stale copy after a push.
    pub fn request_url(&self, ts: i64) -> String {
        format!("{}?ts={}", self.file_url(), ts)
    }
}

#[async_trait]
impl AliasSource for GitHubSource {
    async fn fetch(&self) -> AliasResult<AliasMap> {
        let url = self.request_url(chrono::Utc::now().timestamp_millis());
        info!(%url, "Loading aliases from url");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AliasError::source_unavailable(e.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| AliasError::source_unavailable(e.to_string()))?;
        debug!(bytes = body.len(), "Deserializing alias document");

        AliasMap::from_json_slice(&body).map_err(|e| {
            AliasError::source_unavailable(format!("invalid alias document at {url}: {e}"))
        })
    }

    fn describe(&self) -> String {
        format!("github:{}@{}", self.config.repository, self.config.branch)
    }
}
