//! Linkhop Server binary.

use linkhop_server::{load_config, LinkhopServer};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "linkhop.toml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config path: first argument, then LINKHOP_CONFIG, then the default.
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("LINKHOP_CONFIG").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = load_config(&config_path)?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::debug!(path = %config_path.display(), "Configuration loaded");

    let server = LinkhopServer::new(config).await?;
    server.run().await?;

    Ok(())
}
