//! HTTP-level tests for the Linkhop router.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use linkhop_axum::linkhop_router;
use linkhop_core::{AliasMap, AliasRegistry, RedirectResolver};
use linkhop_source_memory::MemorySource;
use linkhop_webhooks::{WebhookConfig, WebhookHandler, WebhookSigner};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const SECRET: &str = "s3cret";
const PUSH_MAIN: &[u8] = br#"{"ref":"refs/heads/main","repository":{"full_name":"org/repo"}}"#;

struct TestApp {
    _dir: tempfile::TempDir,
    app: Router,
    source: MemorySource,
    registry: Arc<AliasRegistry>,
}

async fn test_app(secret: &str) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("aliases.json");
    std::fs::write(
        &cache,
        br#"{"gh":"https://github.com","webhooks/github":"https://nope.example","bad":"https://x.example/\n"}"#,
    )
    .unwrap();

    let source = MemorySource::new();
    let registry = Arc::new(
        AliasRegistry::bootstrap(Arc::new(source.clone()), &cache)
            .await
            .unwrap(),
    );

    let handler = WebhookHandler::new(
        WebhookConfig::new("org/repo", "main").secret(secret),
        registry.clone(),
    );
    let next = Router::new().fallback(|| async { (StatusCode::NOT_FOUND, "next") });
    let app = linkhop_router(handler, RedirectResolver::new(registry.clone()), next);

    TestApp {
        _dir: dir,
        app,
        source,
        registry,
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn push(signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhooks/github")
        .header("X-GitHub-Event", "push")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        builder = builder.header("X-Hub-Signature", signature);
    }
    builder.body(Body::from(PUSH_MAIN)).unwrap()
}

#[tokio::test]
async fn test_alias_redirects() {
    let t = test_app(SECRET).await;

    let response = t.app.oneshot(get("/gh")).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "https://github.com");
}

#[tokio::test]
async fn test_unknown_path_passes_through() {
    let t = test_app(SECRET).await;

    let response = t.app.clone().oneshot(get("/unknown")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = t.app.oneshot(get("/gh/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_location_passes_through() {
    let t = test_app(SECRET).await;

    let response = t.app.oneshot(get("/bad")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_on_webhook_path_is_method_not_allowed() {
    let t = test_app(SECRET).await;

    let response = t.app.oneshot(get("/webhooks/github")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_bad_signature_is_bad_request() {
    let t = test_app(SECRET).await;
    let forged = WebhookSigner::new("wrong").sign_header(PUSH_MAIN).unwrap();

    let response = t.app.clone().oneshot(push(Some(&forged))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = t.app.oneshot(push(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(t.source.fetch_count(), 0);
    assert_eq!(t.registry.resolve("gh").await.as_deref(), Some("https://github.com"));
}

#[tokio::test]
async fn test_signed_push_reloads_aliases() {
    let t = test_app(SECRET).await;
    let fresh: AliasMap = [("docs", "https://docs.rs")].into_iter().collect();
    t.source.set_aliases(fresh).await;
    let signature = WebhookSigner::new(SECRET).sign_header(PUSH_MAIN).unwrap();

    let response = t.app.clone().oneshot(push(Some(&signature))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut reloaded = false;
    for _ in 0..100 {
        if t.registry.resolve("docs").await.is_some() {
            reloaded = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(reloaded, "registry was not reloaded");

    let response = t.app.oneshot(get("/docs")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "https://docs.rs");
}

#[tokio::test]
async fn test_empty_secret_accepts_malformed_signature() {
    let t = test_app("").await;

    let response = t.app.oneshot(push(Some("sha1=zz"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for _ in 0..100 {
        if t.source.fetch_count() == 1 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("reload was not triggered");
}

#[tokio::test]
async fn test_webhook_path_is_never_treated_as_alias() {
    let t = test_app(SECRET).await;
    let signature = WebhookSigner::new(SECRET).sign_header(PUSH_MAIN).unwrap();

    let response = t.app.oneshot(push(Some(&signature))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::LOCATION).is_none());
}
