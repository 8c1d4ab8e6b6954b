//! Route mounting for the webhook endpoint.

use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::routing::any;
use linkhop_webhooks::{EVENT_HEADER, WebhookHandler, WebhookRequest};

/// GitHub caps webhook payloads at 25 MB.
pub const MAX_WEBHOOK_BODY: usize = 25 * 1024 * 1024;

/// Creates an Axum router serving the webhook endpoint at the configured path.
///
/// Every method is routed to the handler so that non-POST requests receive
/// `405` from the webhook pipeline itself.
///
/// # Panics
///
/// Panics if the configured path fails [`linkhop_webhooks::validate_path`];
/// check it with [`linkhop_webhooks::WebhookConfig::validate`] first.
pub fn webhook_routes<S>(handler: WebhookHandler) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let path = handler.config().path.clone();

    Router::new()
        .route(&path, any(webhook_endpoint))
        .layer(DefaultBodyLimit::max(MAX_WEBHOOK_BODY))
        .with_state(handler)
}

async fn webhook_endpoint(
    State(handler): State<WebhookHandler>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = headers
        .get(handler.signature_header())
        .and_then(|v| v.to_str().ok());
    let event_type = headers.get(EVENT_HEADER).and_then(|v| v.to_str().ok());

    let outcome = handler.handle(
        WebhookRequest::new(method.as_str(), &body)
            .signature(signature)
            .event_type(event_type),
    );

    StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
