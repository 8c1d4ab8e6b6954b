//! # Linkhop Server
//!
//! Standalone redirect server: resolves short aliases to their targets and
//! reloads the alias table when GitHub reports a push to the tracked branch.

mod config;

pub use config::{load_config, CacheConfig, ConfigError, GitHubConfig, LinkhopConfig, ServerConfig};

use axum::Router;
use axum::http::StatusCode;
use linkhop_axum::linkhop_router;
use linkhop_core::{AliasError, AliasRegistry, AliasSource, RedirectResolver};
use linkhop_source_github::GitHubSource;
use linkhop_webhooks::WebhookHandler;
use std::sync::Arc;

/// Error raised while starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Alias registry error: {0}")]
    Registry(#[from] AliasError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The redirect server.
pub struct LinkhopServer {
    /// Server configuration.
    pub config: LinkhopConfig,
    registry: Arc<AliasRegistry>,
    handler: WebhookHandler,
}

impl LinkhopServer {
    /// Creates a server fetching aliases from the configured GitHub repository.
    pub async fn new(config: LinkhopConfig) -> Result<Self, ServerError> {
        config.validate()?;
        let source = GitHubSource::new(config.source_config())?;
        Self::with_source(config, Arc::new(source)).await
    }

    /// Creates a server fetching aliases from `source`.
    pub async fn with_source(
        config: LinkhopConfig,
        source: Arc<dyn AliasSource>,
    ) -> Result<Self, ServerError> {
        let webhook_config = config.webhook_config()?;
        let registry = Arc::new(AliasRegistry::bootstrap(source, &config.cache.path).await?);
        let handler = WebhookHandler::new(webhook_config, registry.clone());

        Ok(Self {
            config,
            registry,
            handler,
        })
    }

    /// Returns the alias registry.
    pub fn registry(&self) -> &Arc<AliasRegistry> {
        &self.registry
    }

    /// Builds the request chain: webhook, then redirects, then 404.
    pub fn router(&self) -> Router {
        let next = Router::new().fallback(|| async { (StatusCode::NOT_FOUND, "Not Found") });
        linkhop_router(
            self.handler.clone(),
            RedirectResolver::new(self.registry.clone()),
            next,
        )
    }

    /// Starts the server and runs until Ctrl-C or SIGTERM.
    pub async fn run(&self) -> Result<(), ServerError> {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        let aliases = self.registry.len().await;
        tracing::info!("Starting Linkhop server on {}", addr);
        tracing::info!(
            repository = %self.config.github.repository,
            branch = %self.config.github.branch,
            aliases,
            cache = %self.registry.cache_path().display(),
            "Server ready"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
