//! The alias registry.
//!
//! The registry owns the single alias map visible to readers. Readers take a
//! shared lock just long enough to look a key up; a reload fetches and decodes
//! the new map with no lock held, then takes the exclusive lock only to swap
//! the `Arc` pointer. Readers therefore observe either the old or the new map
//! in full.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::cache::SnapshotCache;
use crate::error::AliasResult;
use crate::traits::AliasSource;
use crate::types::AliasMap;

/// Process-wide holder of the current [`AliasMap`].
///
/// Created once at startup through [`AliasRegistry::bootstrap`] and shared
/// behind an `Arc` for the lifetime of the process.
pub struct AliasRegistry {
    aliases: RwLock<Arc<AliasMap>>,
    source: Arc<dyn AliasSource>,
    cache: SnapshotCache,
    /// Serializes reloads so only one fetch + persist runs at a time.
    reload_lock: Mutex<()>,
}

impl AliasRegistry {
    /// Creates the registry and loads its initial map.
    ///
    /// If the snapshot cache exists and decodes, it is adopted without
    /// contacting the source. Otherwise the source is fetched synchronously;
    /// if that fails too the registry starts empty and every lookup misses
    /// until the next successful reload.
    ///
    /// The only error returned is failure to create the cache directory.
    pub async fn bootstrap(
        source: Arc<dyn AliasSource>,
        cache_path: impl Into<PathBuf>,
    ) -> AliasResult<Self> {
        let cache = SnapshotCache::new(cache_path);
        cache.ensure_dir().await?;

        let registry = Self {
            aliases: RwLock::new(Arc::new(AliasMap::new())),
            source,
            cache,
            reload_lock: Mutex::new(()),
        };

        info!("Loading aliases from cache file");
        debug!(path = %registry.cache.path().display(), "Cache file path");

        match registry.cache.load().await {
            Ok(aliases) => {
                info!(count = aliases.len(), "Aliases loaded from cache file");
                registry.publish(aliases).await;
            }
            Err(e) => {
                info!(error = %e, "No usable cache file, falling back to alias source");
                if let Err(e) = registry.reload_from_source().await {
                    warn!(error = %e, "Starting with an empty alias map");
                }
            }
        }

        debug!("Alias registry initialized");
        Ok(registry)
    }

    /// Looks up the redirect target for `alias`.
    ///
    /// Returns `None` when the alias is unmapped or mapped to an empty target.
    pub async fn resolve(&self, alias: &str) -> Option<String> {
        let aliases = self.aliases.read().await;
        aliases
            .get(alias)
            .filter(|target| !target.is_empty())
            .map(str::to_owned)
    }

    /// Fetches a fresh map from the source and publishes it.
    ///
    /// On success the new map replaces the current one atomically and is
    /// written to the snapshot cache; the number of aliases published is
    /// returned. On failure the current map is left untouched.
    ///
    /// A failed cache write is logged but does not fail the reload, since the
    /// new map is already live.
    pub async fn reload_from_source(&self) -> AliasResult<usize> {
        let _reload = self.reload_lock.lock().await;

        info!("Loading aliases from provider");
        debug!(source = %self.source.describe(), "Provider");

        let aliases = match self.source.fetch().await {
            Ok(aliases) => aliases,
            Err(e) => {
                warn!(error = %e, "Alias reload failed, keeping previous aliases");
                return Err(e);
            }
        };

        let count = aliases.len();
        let aliases = self.publish(aliases).await;
        info!(count, "Aliases reloaded");

        debug!(path = %self.cache.path().display(), "Updating local cache with provided aliases");
        if let Err(e) = self.cache.store(&aliases).await {
            error!(error = %e, "Failed to persist alias snapshot");
        }

        Ok(count)
    }

    /// Returns the map currently visible to readers.
    pub async fn snapshot(&self) -> Arc<AliasMap> {
        self.aliases.read().await.clone()
    }

    /// Returns the number of aliases currently published.
    pub async fn len(&self) -> usize {
        self.aliases.read().await.len()
    }

    /// Returns true if no aliases are currently published.
    pub async fn is_empty(&self) -> bool {
        self.aliases.read().await.is_empty()
    }

    /// Returns the snapshot cache file path.
    pub fn cache_path(&self) -> &Path {
        self.cache.path()
    }

    async fn publish(&self, aliases: AliasMap) -> Arc<AliasMap> {
        let aliases = Arc::new(aliases);
        *self.aliases.write().await = aliases.clone();
        aliases
    }
}

impl std::fmt::Debug for AliasRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliasRegistry")
            .field("source", &self.source.describe())
            .field("cache", &self.cache.path())
            .finish_non_exhaustive()
    }
}
