use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::application::routes::app_router;
use crate::application::state::{AppState, AppStateConfig};
use crate::infrastructure::database::Database;

pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub thumbnail_directory: PathBuf,
    pub unsplash_api_url: String,
    pub unsplash_access_key: String,
    pub provider_timeout: Duration,
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let database = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    tokio::fs::create_dir_all(&config.thumbnail_directory)
        .await
        .with_context(|| {
            format!(
                "failed to create thumbnail directory {}",
                config.thumbnail_directory.display()
            )
        })?;

    let state = AppState::from_database(
        &database,
        AppStateConfig {
            unsplash_api_url: config.unsplash_api_url.clone(),
            unsplash_access_key: config.unsplash_access_key,
            thumbnail_directory: config.thumbnail_directory.clone(),
            provider_timeout: config.provider_timeout,
        },
    );

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_address))?;

    let app = app_router(state);

    info!(
        address = %config.bind_address,
        database = %config.database_url,
        thumbnails = %config.thumbnail_directory.display(),
        provider = %config.unsplash_api_url,
        "starting HTTP server"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    info!("server shutdown complete");

    Ok(())
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if signal handlers fail
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
