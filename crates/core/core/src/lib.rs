//! # Linkhop Core
//!
//! This crate provides the alias registry at the heart of Linkhop: the
//! immutable [`AliasMap`], the [`AliasSource`] trait that remote sources
//! implement, the concurrency-safe [`AliasRegistry`] with its local snapshot
//! cache, and the [`RedirectResolver`] that turns request paths into
//! redirects.
//!
//! ## Example
//!
//! ```rust,ignore
//! use linkhop_core::{AliasRegistry, RedirectResolver, Resolution};
//!
//! let registry = Arc::new(AliasRegistry::bootstrap(source, "cache/aliases.json").await?);
//! let resolver = RedirectResolver::new(registry.clone());
//!
//! if let Resolution::Redirect(target) = resolver.resolve(Some("/gh")).await {
//!     println!("-> {target}");
//! }
//! ```

pub mod cache;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod traits;
pub mod types;

// Re-export commonly used items at the crate root
pub use cache::SnapshotCache;
pub use error::{AliasError, AliasResult};
pub use registry::AliasRegistry;
pub use resolver::{normalize_path, RedirectResolver, Resolution};
pub use traits::AliasSource;
pub use types::AliasMap;
