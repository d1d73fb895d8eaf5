use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use thumbfetch::application::{ServerConfig, serve};
use thumbfetch::infrastructure::client::ThumbfetchClient;
use thumbfetch::presentation::cli::{Cli, Commands, ServeCommand, images};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before clap parses env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(cmd) => run_server(cmd).await,
        Commands::Search(cmd) => {
            let client = ThumbfetchClient::from_base_url(&cli.api_url)?;
            images::search(&client, cmd).await
        }
        Commands::Thumbnail(cmd) => {
            let client = ThumbfetchClient::from_base_url(&cli.api_url)?;
            images::thumbnail(&client, cmd).await
        }
        Commands::Metadata(cmd) => {
            let client = ThumbfetchClient::from_base_url(&cli.api_url)?;
            images::metadata(&client, cmd).await
        }
        Commands::Health => {
            let client = ThumbfetchClient::from_base_url(&cli.api_url)?;
            images::health(&client).await
        }
    }
}

async fn run_server(command: ServeCommand) -> Result<()> {
    if command.unsplash_access_key.trim().is_empty() {
        anyhow::bail!("UNSPLASH_ACCESS_KEY must not be empty");
    }

    let config = ServerConfig {
        bind_address: command.bind_address,
        database_url: command.database_url,
        thumbnail_directory: command.thumbnail_directory,
        unsplash_api_url: command.unsplash_api_url,
        unsplash_access_key: command.unsplash_access_key,
        provider_timeout: Duration::from_secs(command.provider_timeout_secs.max(1)),
    };

    serve(config).await
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if logging cannot be initialized
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}
