//! Redirect resolution for inbound request paths.

use std::sync::Arc;

use tracing::{debug, info};

use crate::registry::AliasRegistry;

/// Outcome of resolving a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Redirect the client to this target URL.
    Redirect(String),
    /// No alias matched; hand the request to the next handler.
    PassThrough,
}

/// Maps request paths onto the alias registry.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    registry: Arc<AliasRegistry>,
}

impl RedirectResolver {
    /// Creates a resolver backed by `registry`.
    pub fn new(registry: Arc<AliasRegistry>) -> Self {
        Self { registry }
    }

    /// Resolves a raw request path. A missing path is treated as empty.
    pub async fn resolve(&self, path: Option<&str>) -> Resolution {
        let alias = normalize_path(path.unwrap_or_default());
        debug!(alias, "Resolving redirect");

        match self.registry.resolve(alias).await {
            Some(target) => {
                info!(alias, target = %target, "Redirecting");
                Resolution::Redirect(target)
            }
            None => {
                info!(alias, "Redirect not found");
                Resolution::PassThrough
            }
        }
    }
}

/// Strips a single leading `/`. Everything else is kept verbatim.
pub fn normalize_path(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}
