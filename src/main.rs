//! The catalog backend's web server.

use catalog_backend::{config::Config, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// # Errors
///
/// See implementation.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    let default_filter = if config.mode.is_development() {
        "catalog_backend=debug,tower_http=debug,info"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    info!(?config, "loaded configuration");

    let address = config.address.clone();
    let state = AppState::new(config)?;

    let listener = TcpListener::bind(&address).await?;

    info!("listening on {address}");

    axum::serve(listener, catalog_backend::router(state)).await?;

    Ok(())
}
