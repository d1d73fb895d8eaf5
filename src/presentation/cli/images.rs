use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Args;

use super::print_json;
use crate::domain::images::{Color, ImageQuery, Orientation, UniqueLink};
use crate::infrastructure::client::ThumbfetchClient;

#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Free-text search term
    #[arg(long)]
    pub term: String,
    /// One of black_and_white, black, white, yellow, orange, red, purple, magenta, green, teal, blue
    #[arg(long)]
    pub color: Option<String>,
    /// One of landscape, portrait, squarish
    #[arg(long)]
    pub orientation: Option<String>,
}

impl SearchCommand {
    pub fn into_query(self) -> Result<ImageQuery> {
        let color = self
            .color
            .map(|value| {
                value
                    .parse::<Color>()
                    .map_err(|()| anyhow!("unknown color: {value}"))
            })
            .transpose()?;
        let orientation = self
            .orientation
            .map(|value| {
                value
                    .parse::<Orientation>()
                    .map_err(|()| anyhow!("unknown orientation: {value}"))
            })
            .transpose()?;

        Ok(ImageQuery {
            search_term: self.term,
            color,
            orientation,
        })
    }
}

#[derive(Debug, Args)]
pub struct ThumbnailCommand {
    #[arg(long)]
    pub link: String,
    /// Where to write the JPEG (defaults to the link name in the current directory)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct MetadataCommand {
    #[arg(long)]
    pub link: String,
}

fn parse_link(value: &str) -> Result<UniqueLink> {
    UniqueLink::parse(value).ok_or_else(|| anyhow!("invalid unique link: {value}"))
}

pub async fn search(client: &ThumbfetchClient, command: SearchCommand) -> Result<()> {
    let query = command.into_query()?;
    let image = client.random_image(&query).await?;
    print_json(&image)
}

pub async fn thumbnail(client: &ThumbfetchClient, command: ThumbnailCommand) -> Result<()> {
    let link = parse_link(&command.link)?;
    let output = command
        .output
        .unwrap_or_else(|| PathBuf::from(link.as_str()));

    let bytes = client.thumbnail(&link).await?;
    tokio::fs::write(&output, &bytes)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;
    eprintln!("Wrote {} bytes to {}", bytes.len(), output.display());
    Ok(())
}

pub async fn metadata(client: &ThumbfetchClient, command: MetadataCommand) -> Result<()> {
    let link = parse_link(&command.link)?;
    let image = client.metadata(&link).await?;
    print_json(&image)
}

pub async fn health(client: &ThumbfetchClient) -> Result<()> {
    let health = client.health().await?;
    print_json(&health)
}
