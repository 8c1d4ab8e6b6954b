//! # Linkhop Memory Source
//!
//! An in-memory alias source for Linkhop, primarily intended for testing and
//! development purposes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use linkhop_source_memory::MemorySource;
//!
//! let source = MemorySource::with_aliases([("gh", "https://github.com")].into_iter().collect());
//! let registry = AliasRegistry::bootstrap(Arc::new(source.clone()), "cache/aliases.json").await?;
//!
//! source.set_aliases([("gh", "https://github.com/linkhop")].into_iter().collect()).await;
//! registry.reload_from_source().await?;
//! ```

use async_trait::async_trait;
use linkhop_core::error::{AliasError, AliasResult};
use linkhop_core::traits::AliasSource;
use linkhop_core::types::AliasMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// In-memory alias source.
///
/// Clones share state, so a test can keep one handle to reprogram the source
/// while the registry owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    aliases: Arc<RwLock<AliasMap>>,
    failure: Arc<RwLock<Option<String>>>,
    latency: Arc<RwLock<Duration>>,
    fetches: Arc<AtomicUsize>,
}

impl MemorySource {
    /// Creates a source serving an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source serving `aliases`.
    pub fn with_aliases(aliases: AliasMap) -> Self {
        Self {
            aliases: Arc::new(RwLock::new(aliases)),
            ..Self::default()
        }
    }

    /// Replaces the map served by subsequent fetches.
    pub async fn set_aliases(&self, aliases: AliasMap) {
        *self.aliases.write().await = aliases;
    }

    /// Makes subsequent fetches fail with `message`.
    pub async fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().await = Some(message.into());
    }

    /// Clears an injected failure.
    pub async fn recover(&self) {
        *self.failure.write().await = None;
    }

    /// Delays every fetch by `latency`.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = latency;
    }

    /// Returns how many fetches have been attempted.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AliasSource for MemorySource {
    async fn fetch(&self) -> AliasResult<AliasMap> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let latency = *self.latency.read().await;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if let Some(message) = self.failure.read().await.clone() {
            tracing::debug!(%message, "Memory source returning injected failure");
            return Err(AliasError::source_unavailable(message));
        }

        Ok(self.aliases.read().await.clone())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
