pub mod images;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::infrastructure::unsplash::UNSPLASH_SEARCH_URL;
use images::{MetadataCommand, SearchCommand, ThumbnailCommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Find random stock photos and cache their thumbnails", long_about = None)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "THUMBFETCH_URL",
        default_value = "http://localhost:8000"
    )]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Ask the server for a random image and cache its thumbnail
    Search(SearchCommand),

    /// Download a cached thumbnail
    Thumbnail(ThumbnailCommand),

    /// Show the stored metadata for a unique link
    Metadata(MetadataCommand),

    /// Check that the server is up
    Health,
}

#[derive(Debug, Args)]
pub struct ServeCommand {
    #[arg(
        long,
        env = "THUMBFETCH_DATABASE_URL",
        default_value = "sqlite://thumbfetch.db"
    )]
    pub database_url: String,

    #[arg(long, env = "THUMBFETCH_BIND_ADDRESS", default_value = "127.0.0.1:8000")]
    pub bind_address: SocketAddr,

    /// Directory thumbnails are written to and served from
    #[arg(
        long,
        env = "THUMBFETCH_THUMBNAIL_DIRECTORY",
        default_value = "thumbnails"
    )]
    pub thumbnail_directory: PathBuf,

    #[arg(long, env = "UNSPLASH_ACCESS_KEY", hide_env_values = true)]
    pub unsplash_access_key: String,

    #[arg(long, env = "UNSPLASH_API_URL", default_value = UNSPLASH_SEARCH_URL)]
    pub unsplash_api_url: String,

    /// Timeout for each outbound request, in seconds
    #[arg(long, env = "THUMBFETCH_PROVIDER_TIMEOUT_SECS", default_value_t = 30)]
    pub provider_timeout_secs: u64,
}

pub(crate) fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
