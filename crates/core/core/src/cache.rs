//! Local snapshot of the last successfully loaded alias map.
//!
//! The snapshot is a single flat JSON object. Writes go through a temporary
//! file in the same directory followed by a rename, so a reader never sees a
//! truncated file.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AliasError, AliasResult};
use crate::types::AliasMap;

/// Snapshot cache file backing an [`AliasRegistry`](crate::AliasRegistry).
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    /// Creates a cache handle for the given file path. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the directory that will hold the cache file.
    pub async fn ensure_dir(&self) -> AliasResult<()> {
        let Some(parent) = self.parent_dir() else {
            return Ok(());
        };

        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AliasError::CacheDirectory {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Reads and decodes the snapshot.
    pub async fn load(&self) -> AliasResult<AliasMap> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| AliasError::cache_unreadable(&self.path, e.to_string()))?;

        AliasMap::from_json_slice(&bytes)
            .map_err(|e| AliasError::cache_unreadable(&self.path, e.to_string()))
    }

    /// Replaces the snapshot with `aliases`.
    pub async fn store(&self, aliases: &AliasMap) -> AliasResult<()> {
        let content = aliases
            .to_json_vec()
            .map_err(|e| AliasError::cache_write(&self.path, e.to_string()))?;

        let path = self.path.clone();
        let dir = self.parent_dir().map(Path::to_path_buf);

        tokio::task::spawn_blocking(move || write_atomic(&path, dir.as_deref(), &content))
            .await
            .map_err(|e| AliasError::cache_write(&self.path, e.to_string()))??;

        debug!(path = %self.path.display(), count = aliases.len(), "Snapshot cache updated");
        Ok(())
    }

    fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }
}

/// Writes `content` to `path` via a temp file in `dir` and an atomic rename.
fn write_atomic(path: &Path, dir: Option<&Path>, content: &[u8]) -> AliasResult<()> {
    let dir = dir.unwrap_or_else(|| Path::new("."));

    let mut temp_file = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| AliasError::cache_write(path, e.to_string()))?;

    temp_file
        .write_all(content)
        .and_then(|()| temp_file.as_file().sync_all())
        .map_err(|e| AliasError::cache_write(path, e.to_string()))?;

    temp_file
        .persist(path)
        .map_err(|e| AliasError::cache_write(path, e.error.to_string()))?;

    Ok(())
}
