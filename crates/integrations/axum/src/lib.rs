//! # Linkhop Axum Integration
//!
//! This crate wires Linkhop into Axum:
//! - The webhook endpoint that triggers alias reloads
//! - A redirect layer that answers aliased paths and passes the rest through
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use axum::Router;
//! use linkhop_axum::linkhop_router;
//!
//! let next = Router::new().fallback(|| async { "not an alias" });
//! let app = linkhop_router(webhook_handler, resolver, next);
//! axum::serve(listener, app).await?;
//! ```

mod layer;
mod routes;

pub use layer::{RedirectLayer, RedirectMiddleware};
pub use routes::{webhook_routes, MAX_WEBHOOK_BODY};

use axum::Router;
use linkhop_core::RedirectResolver;
use linkhop_webhooks::WebhookHandler;

/// Builds the full request chain: webhook endpoint first, then alias
/// redirects, then `next` for anything left unresolved.
pub fn linkhop_router(handler: WebhookHandler, resolver: RedirectResolver, next: Router) -> Router {
    webhook_routes(handler).fallback_service(next.layer(RedirectLayer::new(resolver)))
}
