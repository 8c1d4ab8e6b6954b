//! End-to-end tests: webhook requests driving registry reloads.

use linkhop_core::{AliasMap, AliasRegistry};
use linkhop_source_memory::MemorySource;
use linkhop_webhooks::{
    IgnoreReason, WebhookConfig, WebhookHandler, WebhookOutcome, WebhookRequest, WebhookSigner,
};
use std::sync::Arc;
use std::time::Duration;

const PUSH_MAIN: &[u8] =
    br#"{"ref":"refs/heads/main","before":"0000","repository":{"id":1,"full_name":"org/repo"}}"#;

struct Fixture {
    _dir: tempfile::TempDir,
    source: MemorySource,
    registry: Arc<AliasRegistry>,
}

fn aliases(pairs: &[(&str, &str)]) -> AliasMap {
    pairs.iter().copied().collect()
}

async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let source = MemorySource::with_aliases(aliases(&[("old", "https://old.example")]));
    let registry = AliasRegistry::bootstrap(Arc::new(source.clone()), dir.path().join("aliases.json"))
        .await
        .unwrap();

    source
        .set_aliases(aliases(&[("new", "https://new.example")]))
        .await;

    Fixture {
        _dir: dir,
        source,
        registry: Arc::new(registry),
    }
}

async fn wait_for_alias(registry: &AliasRegistry, alias: &str) -> Option<String> {
    for _ in 0..100 {
        if let Some(target) = registry.resolve(alias).await {
            return Some(target);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    None
}

#[tokio::test]
async fn test_signed_push_reloads_registry_after_responding() {
    let fx = fixture().await;
    fx.source.set_latency(Duration::from_millis(200)).await;
    let handler = WebhookHandler::new(
        WebhookConfig::new("org/repo", "main").secret("s3cret"),
        fx.registry.clone(),
    );
    let sig = WebhookSigner::new("s3cret").sign_header(PUSH_MAIN).unwrap();

    let outcome = handler.handle(
        WebhookRequest::new("POST", PUSH_MAIN)
            .signature(Some(&sig))
            .event_type(Some("push")),
    );

    assert_eq!(outcome, WebhookOutcome::ReloadScheduled);
    assert_eq!(outcome.status_code(), 200);
    // The response is decided while the fetch is still sleeping.
    assert_eq!(fx.registry.resolve("old").await.as_deref(), Some("https://old.example"));

    assert_eq!(
        wait_for_alias(&fx.registry, "new").await.as_deref(),
        Some("https://new.example")
    );
    assert_eq!(fx.registry.resolve("old").await, None);
}

#[tokio::test]
async fn test_bad_signature_leaves_registry_untouched() {
    let fx = fixture().await;
    let handler = WebhookHandler::new(
        WebhookConfig::new("org/repo", "main").secret("s3cret"),
        fx.registry.clone(),
    );
    let forged = WebhookSigner::new("guess").sign_header(PUSH_MAIN).unwrap();

    for signature in [Some(forged.as_str()), None, Some("sha1=nothex")] {
        let outcome = handler.handle(
            WebhookRequest::new("POST", PUSH_MAIN)
                .signature(signature)
                .event_type(Some("push")),
        );
        assert_eq!(outcome.status_code(), 400);
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fx.source.fetch_count(), 1);
    assert_eq!(fx.registry.resolve("old").await.as_deref(), Some("https://old.example"));
}

#[tokio::test]
async fn test_empty_secret_accepts_any_signature() {
    let fx = fixture().await;
    let handler = WebhookHandler::new(WebhookConfig::new("org/repo", "main"), fx.registry.clone());

    let outcome = handler.handle(
        WebhookRequest::new("POST", PUSH_MAIN)
            .signature(Some("definitely not a signature"))
            .event_type(Some("push")),
    );

    assert_eq!(outcome, WebhookOutcome::ReloadScheduled);
    assert_eq!(
        wait_for_alias(&fx.registry, "new").await.as_deref(),
        Some("https://new.example")
    );
}

#[tokio::test]
async fn test_ignored_events_do_not_reload() {
    let fx = fixture().await;
    let handler = WebhookHandler::new(WebhookConfig::new("org/repo", "dev"), fx.registry.clone());

    let pull_request = handler.handle(
        WebhookRequest::new("POST", PUSH_MAIN).event_type(Some("pull_request")),
    );
    let wrong_branch =
        handler.handle(WebhookRequest::new("POST", PUSH_MAIN).event_type(Some("push")));

    assert_eq!(pull_request, WebhookOutcome::Ignored(IgnoreReason::NotPushEvent));
    assert_eq!(
        wrong_branch,
        WebhookOutcome::Ignored(IgnoreReason::OtherRepositoryOrBranch)
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fx.source.fetch_count(), 1);
}

#[tokio::test]
async fn test_failed_background_reload_keeps_serving() {
    let fx = fixture().await;
    fx.source.fail_with("raw host down").await;
    let handler = WebhookHandler::new(WebhookConfig::new("org/repo", "main"), fx.registry.clone());

    handler.spawn_reload().await.unwrap();

    assert_eq!(fx.source.fetch_count(), 2);
    assert_eq!(fx.registry.resolve("old").await.as_deref(), Some("https://old.example"));
}
