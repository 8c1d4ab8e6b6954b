//! Error types for Linkhop.
//!
//! This module defines the `AliasError` enum which represents every failure
//! the alias registry can run into while fetching, caching or publishing an
//! alias map.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for alias registry operations.
///
/// All variants except [`AliasError::CacheDirectory`] are recoverable: the
/// registry keeps serving its previous map and the caller may retry later.
#[derive(Debug, Error)]
pub enum AliasError {
    // ==================== Source Errors ====================
    /// The alias source could not be reached or returned an unusable document.
    #[error("Alias source unavailable: {message}")]
    SourceUnavailable { message: String },

    // ==================== Cache Errors ====================
    /// The snapshot cache file is missing or could not be decoded.
    #[error("Cache file '{}' unreadable: {message}", .path.display())]
    CacheUnreadable { path: PathBuf, message: String },

    /// Writing the snapshot cache file failed.
    #[error("Failed to write cache file '{}': {message}", .path.display())]
    CacheWrite { path: PathBuf, message: String },

    /// The directory holding the snapshot cache could not be created.
    #[error("Cache directory '{}' could not be created: {message}", .path.display())]
    CacheDirectory { path: PathBuf, message: String },
}

impl AliasError {
    /// Creates a new source unavailable error.
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
        }
    }

    /// Creates a new cache unreadable error.
    pub fn cache_unreadable(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CacheUnreadable {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new cache write error.
    pub fn cache_write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CacheWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns true if the process can keep serving after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::CacheDirectory { .. })
    }
}

/// A Result type alias using AliasError.
pub type AliasResult<T> = Result<T, AliasError>;

impl From<serde_json::Error> for AliasError {
    fn from(err: serde_json::Error) -> Self {
        Self::SourceUnavailable {
            message: err.to_string(),
        }
    }
}
