//! Server configuration.

use linkhop_source_github::{DEFAULT_ALIASES_FILE, DEFAULT_RAW_BASE_URL, GitHubSourceConfig};
use linkhop_webhooks::{DEFAULT_WEBHOOK_PATH, SignatureAlgorithm, WebhookConfig, validate_path};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkhopConfig {
    /// Listener and logging.
    pub server: ServerConfig,
    /// Alias repository and webhook settings.
    pub github: GitHubConfig,
    /// Snapshot cache.
    pub cache: CacheConfig,
}

/// Server-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Host to bind to.
    pub host: String,
    /// Log level, used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// GitHub repository holding the aliases, and its webhook.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Repository full name, `owner/name`.
    pub repository: String,
    /// Tracked branch.
    pub branch: String,
    /// Webhook shared secret. Empty disables signature checks.
    pub hook_secret: String,
    /// Path the webhook endpoint is mounted on.
    pub webhook_path: String,
    /// `sha1` or `sha256`.
    pub signature_algorithm: String,
    /// Alias file path inside the repository.
    pub aliases_file: String,
    /// Raw content host.
    pub raw_base_url: String,
    /// Alias fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            repository: String::new(),
            branch: "master".to_string(),
            hook_secret: String::new(),
            webhook_path: DEFAULT_WEBHOOK_PATH.to_string(),
            signature_algorithm: SignatureAlgorithm::default().tag().to_string(),
            aliases_file: DEFAULT_ALIASES_FILE.to_string(),
            raw_base_url: DEFAULT_RAW_BASE_URL.to_string(),
            fetch_timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .field("hook_secret", &if self.hook_secret.is_empty() { "<empty>" } else { "<redacted>" })
            .field("webhook_path", &self.webhook_path)
            .field("signature_algorithm", &self.signature_algorithm)
            .field("aliases_file", &self.aliases_file)
            .field("raw_base_url", &self.raw_base_url)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .finish()
    }
}

/// Snapshot cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache file location.
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("cache").join("aliases.json"),
        }
    }
}

impl LinkhopConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Overrides file values with `LINKHOP_*` variables returned by `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(repository) = lookup("LINKHOP_GITHUB_REPOSITORY") {
            self.github.repository = repository;
        }
        if let Some(branch) = lookup("LINKHOP_GITHUB_BRANCH") {
            self.github.branch = branch;
        }
        if let Some(secret) = lookup("LINKHOP_GITHUB_HOOK_SECRET") {
            self.github.hook_secret = secret;
        }
        if let Some(path) = lookup("LINKHOP_CACHE_PATH") {
            self.cache.path = PathBuf::from(path);
        }
        if let Some(port) = lookup("LINKHOP_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("LINKHOP_PORT is not a port: {port}")))?;
        }
        Ok(())
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let repo = &self.github.repository;
        let well_formed = repo
            .split_once('/')
            .is_some_and(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'));
        if !well_formed {
            return Err(ConfigError::Invalid(format!(
                "github.repository must be 'owner/name', got '{repo}'"
            )));
        }
        if self.github.branch.is_empty() {
            return Err(ConfigError::Invalid("github.branch must not be empty".into()));
        }
        validate_path(&self.github.webhook_path)
            .map_err(|e| ConfigError::Invalid(format!("github.webhook_path: {e}")))?;
        self.signature_algorithm()?;
        Ok(())
    }

    /// Returns the configured signature algorithm.
    pub fn signature_algorithm(&self) -> Result<SignatureAlgorithm, ConfigError> {
        self.github
            .signature_algorithm
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("github.signature_algorithm: {e}")))
    }

    /// Builds the webhook configuration.
    pub fn webhook_config(&self) -> Result<WebhookConfig, ConfigError> {
        let config = WebhookConfig::new(&self.github.repository, &self.github.branch)
            .secret(&self.github.hook_secret)
            .algorithm(self.signature_algorithm()?)
            .path(&self.github.webhook_path);
        config
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("github.webhook_path: {e}")))?;
        Ok(config)
    }

    /// Builds the alias source configuration.
    pub fn source_config(&self) -> GitHubSourceConfig {
        GitHubSourceConfig::new(&self.github.repository, &self.github.branch)
            .aliases_file(&self.github.aliases_file)
            .raw_base_url(&self.github.raw_base_url)
            .timeout(Duration::from_secs(self.github.fetch_timeout_secs))
    }
}

/// Loads configuration from a TOML file, then applies environment overrides
/// and validates the result.
pub fn load_config(path: &Path) -> Result<LinkhopConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.display())))?;

    let mut config = LinkhopConfig::from_toml_str(&content)?;
    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
