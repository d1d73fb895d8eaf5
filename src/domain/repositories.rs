use std::io;

use async_trait::async_trait;

use super::{ProviderError, RepositoryError};
use crate::domain::images::{ImageMetadata, ImageQuery, NewImageMetadata, UniqueLink};

#[async_trait]
pub trait ImageMetadataRepository: Send + Sync {
    async fn insert(&self, metadata: NewImageMetadata) -> Result<ImageMetadata, RepositoryError>;
    async fn get_by_unique_link(&self, link: &UniqueLink)
    -> Result<ImageMetadata, RepositoryError>;
}

#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Total number of matches the provider reports for `query`.
    async fn count(&self, query: &ImageQuery) -> Result<u64, ProviderError>;

    /// URL of one pseudo-randomly chosen match, or `None` when nothing matches.
    async fn fetch_random(&self, query: &ImageQuery) -> Result<Option<String>, ProviderError>;
}

#[async_trait]
pub trait ThumbnailStore: Send + Sync {
    /// Download `image_url` and store a thumbnail named `link`.
    ///
    /// Failures are logged by the implementation; callers only see `false`.
    async fn create_thumbnail(&self, image_url: &str, link: &UniqueLink) -> bool;
    async fn read(&self, link: &UniqueLink) -> io::Result<Vec<u8>>;
    async fn remove(&self, link: &UniqueLink) -> io::Result<()>;
}
