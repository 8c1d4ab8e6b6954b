//! Redirect middleware layer for Axum.

use axum::body::Body;
use axum::http::header::{HeaderValue, LOCATION};
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;
use linkhop_core::{RedirectResolver, Resolution};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::warn;

/// Layer that answers aliased paths with a redirect and passes every other
/// request through to the wrapped service.
#[derive(Clone)]
pub struct RedirectLayer {
    resolver: RedirectResolver,
}

impl RedirectLayer {
    /// Creates a new redirect layer.
    pub fn new(resolver: RedirectResolver) -> Self {
        Self { resolver }
    }
}

impl<S> Layer<S> for RedirectLayer {
    type Service = RedirectMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RedirectMiddleware {
            inner,
            resolver: self.resolver.clone(),
        }
    }
}

/// Middleware service produced by [`RedirectLayer`].
#[derive(Clone)]
pub struct RedirectMiddleware<S> {
    inner: S,
    resolver: RedirectResolver,
}

impl<S> Service<Request<Body>> for RedirectMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let resolver = self.resolver.clone();
        // Keep the service that was polled ready, leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            if let Resolution::Redirect(target) = resolver.resolve(Some(req.uri().path())).await {
                match HeaderValue::try_from(target) {
                    Ok(location) => return Ok(redirect(location)),
                    Err(e) => warn!(error = %e, "Alias target is not a valid Location header"),
                }
            }

            inner.call(req).await
        })
    }
}

fn redirect(location: HeaderValue) -> Response<Body> {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}
