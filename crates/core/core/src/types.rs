//! Core data types for Linkhop.
//!
//! This module defines [`AliasMap`], the immutable table of short paths to
//! redirect targets that the registry publishes as a whole.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A complete mapping of alias paths to redirect target URLs.
///
/// Keys are stored exactly as received: case-sensitive, without a leading
/// slash. An `AliasMap` is never edited once built; reloading produces a new
/// map that replaces the old one wholesale.
///
/// On the wire (remote source and snapshot cache) it is a flat JSON object of
/// strings.
///
/// # Example
///
/// ```rust
/// use linkhop_core::AliasMap;
///
/// let map: AliasMap = [("gh", "https://github.com")].into_iter().collect();
/// assert_eq!(map.get("gh"), Some("https://github.com"));
/// assert_eq!(map.get("GH"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasMap(HashMap<String, String>);

impl AliasMap {
    /// Creates an empty alias map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the target for `alias`, if present.
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.0.get(alias).map(String::as_str)
    }

    /// Returns true if `alias` is mapped.
    pub fn contains(&self, alias: &str) -> bool {
        self.0.contains_key(alias)
    }

    /// Returns the number of aliases.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the map holds no aliases.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decodes a map from a flat JSON object.
    pub fn from_json_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Encodes the map as a flat JSON object.
    pub fn to_json_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.0)
    }
}

impl From<HashMap<String, String>> for AliasMap {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for AliasMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
