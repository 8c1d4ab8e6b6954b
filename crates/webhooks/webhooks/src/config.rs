//! Webhook configuration.

use crate::signature::{SignatureAlgorithm, WebhookSigner};

/// Default path the webhook endpoint is mounted on.
pub const DEFAULT_WEBHOOK_PATH: &str = "/webhooks/github";

/// Characters the router treats as parameter or wildcard syntax.
const ROUTE_SYNTAX: [char; 4] = [':', '*', '{', '}'];

/// Checks that `path` can be mounted as a single literal route.
///
/// The path must start with `/` and must not contain router capture syntax,
/// which would either be refused by the router or match more than one path.
pub fn validate_path(path: &str) -> Result<(), String> {
    if !path.starts_with('/') {
        return Err(format!("webhook path must start with '/', got '{path}'"));
    }
    if let Some(c) = path.chars().find(|c| ROUTE_SYNTAX.contains(c)) {
        return Err(format!("webhook path must not contain '{c}', got '{path}'"));
    }
    Ok(())
}

/// Which pushes trigger a reload, and how their senders are authenticated.
#[derive(Clone)]
pub struct WebhookConfig {
    /// Repository full name, `owner/name`.
    pub repository: String,
    /// Tracked branch name, without `refs/heads/`.
    pub branch: String,
    /// Shared hook secret. Empty disables signature verification.
    pub secret: String,
    /// Signature algorithm expected from the sender.
    pub algorithm: SignatureAlgorithm,
    /// Path the webhook endpoint is mounted on.
    pub path: String,
}

impl WebhookConfig {
    /// Creates a configuration tracking `branch` of `repository` with no secret.
    pub fn new(repository: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            branch: branch.into(),
            secret: String::new(),
            algorithm: SignatureAlgorithm::default(),
            path: DEFAULT_WEBHOOK_PATH.to_string(),
        }
    }

    /// Sets the shared secret.
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    /// Sets the signature algorithm.
    pub fn algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the endpoint path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Checks that the configured endpoint path is a literal route.
    pub fn validate(&self) -> Result<(), String> {
        validate_path(&self.path)
    }

    /// Returns the full ref pushes must target, e.g. `refs/heads/main`.
    pub fn expected_ref(&self) -> String {
        format!("refs/heads/{}", self.branch)
    }

    /// Returns a signer for this configuration.
    pub fn signer(&self) -> WebhookSigner {
        WebhookSigner::new(self.secret.clone()).with_algorithm(self.algorithm)
    }
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .field("secret", &if self.secret.is_empty() { "<empty>" } else { "<redacted>" })
            .field("algorithm", &self.algorithm)
            .field("path", &self.path)
            .finish()
    }
}
