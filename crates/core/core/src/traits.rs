//! Core traits for Linkhop.
//!
//! This module defines the trait interface that alias sources must implement
//! to feed the registry.

use async_trait::async_trait;

use crate::error::AliasResult;
use crate::types::AliasMap;

/// A remote source of truth for the alias table.
///
/// Implementations fetch the *complete* current mapping on every call. Any
/// transport or decoding failure is reported as
/// [`AliasError::SourceUnavailable`](crate::AliasError::SourceUnavailable);
/// the registry does not distinguish between them.
#[async_trait]
pub trait AliasSource: Send + Sync {
    /// Fetches the full alias map.
    async fn fetch(&self) -> AliasResult<AliasMap>;

    /// Returns a short human-readable description used in logs.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}
