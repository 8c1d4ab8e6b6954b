//! Webhook request handling.
//!
//! Each request walks the same one-shot pipeline: method check, signature
//! check, event type check, repository/branch check. Only a relevant push
//! schedules a reload, and the reload runs as a detached task so the response
//! never waits on the alias source.

use std::sync::Arc;

use linkhop_core::AliasRegistry;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::WebhookConfig;
use crate::error::WebhookError;
use crate::event::{NotificationEvent, is_push_event, is_relevant_push};
use crate::signature::WebhookSigner;

/// The transport-independent view of an inbound webhook request.
#[derive(Debug, Clone, Copy)]
pub struct WebhookRequest<'a> {
    /// HTTP method.
    pub method: &'a str,
    /// Value of the signature header, if sent.
    pub signature: Option<&'a str>,
    /// Value of the event type header, if sent.
    pub event_type: Option<&'a str>,
    /// Raw body bytes, exactly as received.
    pub body: &'a [u8],
}

impl<'a> WebhookRequest<'a> {
    /// Creates a request with no signature or event headers.
    pub fn new(method: &'a str, body: &'a [u8]) -> Self {
        Self {
            method,
            signature: None,
            event_type: None,
            body,
        }
    }

    /// Sets the signature header value.
    pub fn signature(mut self, signature: Option<&'a str>) -> Self {
        self.signature = signature;
        self
    }

    /// Sets the event type header value.
    pub fn event_type(mut self, event_type: Option<&'a str>) -> Self {
        self.event_type = event_type;
        self
    }
}

/// Why an authenticated notification was accepted without reloading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The event type is not `push`.
    NotPushEvent,
    /// The body lacks `repository.full_name` or `ref`.
    MalformedPayload,
    /// A push to some other repository or branch.
    OtherRepositoryOrBranch,
}

/// Terminal outcome for one webhook request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The request is rejected.
    Rejected(WebhookError),
    /// The request is accepted and nothing happens.
    Ignored(IgnoreReason),
    /// The request is accepted and a reload has been dispatched.
    ReloadScheduled,
}

impl WebhookOutcome {
    /// Returns the HTTP status code to answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Rejected(err) => err.status_code(),
            Self::Ignored(_) | Self::ReloadScheduled => 200,
        }
    }
}

/// Decides, per request, whether to trigger an alias reload.
///
/// The handler holds no per-request state; everything that persists lives in
/// the [`AliasRegistry`].
#[derive(Debug, Clone)]
pub struct WebhookHandler {
    config: Arc<WebhookConfig>,
    signer: WebhookSigner,
    registry: Arc<AliasRegistry>,
}

impl WebhookHandler {
    /// Creates a handler that reloads `registry`.
    pub fn new(config: WebhookConfig, registry: Arc<AliasRegistry>) -> Self {
        let signer = config.signer();
        if signer.is_insecure() {
            warn!("GitHub hook secret not defined! Signature verification is disabled.");
        }

        Self {
            config: Arc::new(config),
            signer,
            registry,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    /// Returns the name of the header carrying the signature.
    pub fn signature_header(&self) -> &'static str {
        self.config.algorithm.header_name()
    }

    /// Classifies `request` and, for a relevant push, dispatches a reload.
    pub fn handle(&self, request: WebhookRequest<'_>) -> WebhookOutcome {
        info!("Received notification from github");

        let outcome = self.classify(request);
        if outcome == WebhookOutcome::ReloadScheduled {
            info!("Fetching updated aliases");
            self.spawn_reload();
        }
        outcome
    }

    /// Classifies `request` without side effects.
    pub fn classify(&self, request: WebhookRequest<'_>) -> WebhookOutcome {
        debug!("Verifying request method");
        if !request.method.eq_ignore_ascii_case("POST") {
            info!(method = request.method, "Github notification uses an invalid method");
            return WebhookOutcome::Rejected(WebhookError::UnsupportedMethod {
                method: request.method.to_string(),
            });
        }

        debug!("Verifying signature");
        if self.signer.is_insecure() {
            warn!("GitHub hook secret not defined! Skipping signature verification.");
        }
        if let Err(e) = self.signer.verify_header(request.signature, request.body) {
            info!(error = %e, "Github notification has an invalid signature");
            return WebhookOutcome::Rejected(e.into());
        }

        debug!("Verifying event type");
        if !is_push_event(request.event_type) {
            info!(event = ?request.event_type, "Github notification is not a push event");
            return WebhookOutcome::Ignored(IgnoreReason::NotPushEvent);
        }

        debug!("Parsing event body");
        let Some(event) = NotificationEvent::parse(request.event_type, request.body) else {
            info!("Github notification body is not a usable push payload");
            return WebhookOutcome::Ignored(IgnoreReason::MalformedPayload);
        };

        debug!("Verifying repository and branch");
        if !is_relevant_push(&event, &self.config) {
            info!(
                repository = %event.repository,
                git_ref = %event.git_ref,
                "Github notification is for different branch or repository"
            );
            return WebhookOutcome::Ignored(IgnoreReason::OtherRepositoryOrBranch);
        }

        WebhookOutcome::ReloadScheduled
    }

    /// Reloads the registry on a detached task.
    ///
    /// The task logs its own result; nothing awaits it on the request path.
    pub fn spawn_reload(&self) -> JoinHandle<()> {
        let registry = self.registry.clone();
        tokio::spawn(async move {
            match registry.reload_from_source().await {
                Ok(count) => info!(count, "Background alias reload finished"),
                Err(e) => error!(error = %e, "Background alias reload failed"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkhop_source_memory::MemorySource;

    const PUSH_MAIN: &[u8] = br#"{"ref":"refs/heads/main","repository":{"full_name":"org/repo"}}"#;

    async fn handler(secret: &str) -> (tempfile::TempDir, WebhookHandler) {
        let dir = tempfile::tempdir().unwrap();
        let registry = AliasRegistry::bootstrap(
            Arc::new(MemorySource::new()),
            dir.path().join("aliases.json"),
        )
        .await
        .unwrap();
        let config = WebhookConfig::new("org/repo", "main").secret(secret);
        (dir, WebhookHandler::new(config, Arc::new(registry)))
    }

    fn signed(secret: &str, body: &[u8]) -> String {
        WebhookSigner::new(secret).sign_header(body).unwrap()
    }

    #[tokio::test]
    async fn test_wrong_method_is_rejected_first() {
        let (_dir, handler) = handler("s").await;
        let outcome = handler.classify(WebhookRequest::new("GET", b""));

        assert_eq!(outcome.status_code(), 405);
        assert!(matches!(
            outcome,
            WebhookOutcome::Rejected(WebhookError::UnsupportedMethod { .. })
        ));
    }

    #[tokio::test]
    async fn test_method_is_case_insensitive() {
        let (_dir, handler) = handler("").await;
        let outcome =
            handler.classify(WebhookRequest::new("post", PUSH_MAIN).event_type(Some("push")));
        assert_eq!(outcome, WebhookOutcome::ReloadScheduled);
    }

    #[tokio::test]
    async fn test_missing_signature_is_rejected() {
        let (_dir, handler) = handler("s").await;
        let outcome =
            handler.classify(WebhookRequest::new("POST", PUSH_MAIN).event_type(Some("push")));
        assert_eq!(outcome.status_code(), 400);
    }

    #[tokio::test]
    async fn test_non_push_event_is_ignored() {
        let (_dir, handler) = handler("s").await;
        let sig = signed("s", PUSH_MAIN);
        let outcome = handler.classify(
            WebhookRequest::new("POST", PUSH_MAIN)
                .signature(Some(&sig))
                .event_type(Some("ping")),
        );
        assert_eq!(outcome, WebhookOutcome::Ignored(IgnoreReason::NotPushEvent));
        assert_eq!(outcome.status_code(), 200);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_ignored() {
        let (_dir, handler) = handler("s").await;
        let body = b"{\"zen\":\"Keep it logically awesome.\"}";
        let sig = signed("s", body);
        let outcome = handler.classify(
            WebhookRequest::new("POST", body)
                .signature(Some(&sig))
                .event_type(Some("push")),
        );
        assert_eq!(outcome, WebhookOutcome::Ignored(IgnoreReason::MalformedPayload));
    }

    #[tokio::test]
    async fn test_other_branch_is_ignored() {
        let (_dir, handler) = handler("s").await;
        let body = br#"{"ref":"refs/heads/dev","repository":{"full_name":"org/repo"}}"#;
        let sig = signed("s", body);
        let outcome = handler.classify(
            WebhookRequest::new("POST", body)
                .signature(Some(&sig))
                .event_type(Some("push")),
        );
        assert_eq!(
            outcome,
            WebhookOutcome::Ignored(IgnoreReason::OtherRepositoryOrBranch)
        );
    }

    #[tokio::test]
    async fn test_relevant_push_schedules_reload() {
        let (_dir, handler) = handler("s").await;
        let sig = signed("s", PUSH_MAIN);
        let outcome = handler.classify(
            WebhookRequest::new("POST", PUSH_MAIN)
                .signature(Some(&sig))
                .event_type(Some("push")),
        );
        assert_eq!(outcome, WebhookOutcome::ReloadScheduled);
    }

    #[tokio::test]
    async fn test_signature_header_follows_algorithm() {
        let (_dir, handler) = handler("s").await;
        assert_eq!(handler.config().path, "/webhooks/github");
        assert_eq!(handler.signature_header(), "X-Hub-Signature");
    }
}
