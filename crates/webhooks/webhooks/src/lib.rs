//! # Linkhop Webhooks
//!
//! Inbound webhook pipeline for Linkhop:
//! - HMAC signature verification over the raw body
//! - Push event decoding and repository/branch filtering
//! - A per-request state machine that schedules background alias reloads
//!
//! ## Example
//!
//! ```rust,ignore
//! use linkhop_webhooks::{WebhookConfig, WebhookHandler, WebhookRequest};
//!
//! let config = WebhookConfig::new("acme/links", "main").secret("s3cret");
//! let handler = WebhookHandler::new(config, registry.clone());
//!
//! let outcome = handler.handle(
//!     WebhookRequest::new("POST", &body)
//!         .signature(headers.get("X-Hub-Signature"))
//!         .event_type(headers.get("X-GitHub-Event")),
//! );
//! respond(outcome.status_code());
//! ```

mod config;
mod error;
mod event;
mod handler;
mod signature;

pub use config::{validate_path, WebhookConfig, DEFAULT_WEBHOOK_PATH};
pub use error::{SignatureError, WebhookError};
pub use event::{is_push_event, is_relevant_push, NotificationEvent, EVENT_HEADER, PUSH_EVENT};
pub use handler::{IgnoreReason, WebhookHandler, WebhookOutcome, WebhookRequest};
pub use signature::{verify, SignatureAlgorithm, WebhookSigner};
