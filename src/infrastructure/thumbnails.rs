use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::images::UniqueLink;
use crate::domain::repositories::ThumbnailStore;

/// Bounding box every thumbnail is shrunk into.
pub const DEFAULT_MAX_SIZE: (u32, u32) = (100, 100);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
/// Largest source image accepted from an image host.
pub const MAX_DOWNLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("failed to download image: {0}")]
    Download(String),
    #[error("image exceeds {0} bytes")]
    TooLarge(usize),
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode thumbnail: {0}")]
    Encode(#[source] image::ImageError),
    #[error("thumbnail processing task failed: {0}")]
    Task(String),
    #[error("failed to write thumbnail: {0}")]
    Write(#[source] io::Error),
}

/// Decode `bytes`, shrink to fit within `max_size` keeping the aspect ratio,
/// and re-encode as JPEG. Images already inside the box keep their size.
pub fn make_thumbnail(bytes: &[u8], max_size: (u32, u32)) -> Result<Vec<u8>, ThumbnailError> {
    let img = image::load_from_memory(bytes).map_err(ThumbnailError::Decode)?;

    let (max_width, max_height) = max_size;
    let img = if img.width() > max_width || img.height() > max_height {
        img.thumbnail(max_width, max_height)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Cursor::new(Vec::new());
    rgb.write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(ThumbnailError::Encode)?;
    Ok(buf.into_inner())
}

/// Thumbnails stored as JPEG files in a single local directory.
#[derive(Clone)]
pub struct FsThumbnailStore {
    client: reqwest::Client,
    directory: PathBuf,
    max_size: (u32, u32),
    timeout: Duration,
    max_download_bytes: usize,
}

impl FsThumbnailStore {
    pub fn new(client: reqwest::Client, directory: impl Into<PathBuf>) -> Self {
        Self {
            client,
            directory: directory.into(),
            max_size: DEFAULT_MAX_SIZE,
            timeout: DOWNLOAD_TIMEOUT,
            max_download_bytes: MAX_DOWNLOAD_BYTES,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_download_bytes(mut self, max_download_bytes: usize) -> Self {
        self.max_download_bytes = max_download_bytes;
        self
    }

    pub fn path_for(&self, link: &UniqueLink) -> PathBuf {
        self.directory.join(link.as_str())
    }

    /// Download `image_url` and write its thumbnail to `destination`.
    ///
    /// Returns `false` on any failure after logging the cause. A partially
    /// written file is removed.
    pub async fn create_thumbnail(
        &self,
        image_url: &str,
        destination: &Path,
        max_size: (u32, u32),
    ) -> bool {
        match self.try_create(image_url, destination, max_size).await {
            Ok(()) => {
                debug!(url = image_url, path = %destination.display(), "thumbnail written");
                true
            }
            Err(err) => {
                warn!(
                    url = image_url,
                    path = %destination.display(),
                    error = %err,
                    "failed to create thumbnail"
                );
                if matches!(err, ThumbnailError::Write(_)) {
                    let _ = tokio::fs::remove_file(destination).await;
                }
                false
            }
        }
    }

    async fn try_create(
        &self,
        image_url: &str,
        destination: &Path,
        max_size: (u32, u32),
    ) -> Result<(), ThumbnailError> {
        let response = self
            .client
            .get(image_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ThumbnailError::Download(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ThumbnailError::Download(format!(
                "image host returned status {status}"
            )));
        }

        let bytes = self.read_limited(response).await?;
        if bytes.is_empty() {
            return Err(ThumbnailError::Download("empty response body".to_string()));
        }

        let encoded = tokio::task::spawn_blocking(move || make_thumbnail(&bytes, max_size))
            .await
            .map_err(|e| ThumbnailError::Task(e.to_string()))??;

        tokio::fs::write(destination, encoded)
            .await
            .map_err(ThumbnailError::Write)
    }

    /// Collect the body, giving up once it exceeds `max_download_bytes`.
    async fn read_limited(
        &self,
        mut response: reqwest::Response,
    ) -> Result<Vec<u8>, ThumbnailError> {
        let limit = self.max_download_bytes;
        if let Some(length) = response.content_length()
            && length > limit as u64
        {
            return Err(ThumbnailError::TooLarge(limit));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ThumbnailError::Download(e.to_string()))?
        {
            if body.len() + chunk.len() > limit {
                return Err(ThumbnailError::TooLarge(limit));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait]
impl ThumbnailStore for FsThumbnailStore {
    async fn create_thumbnail(&self, image_url: &str, link: &UniqueLink) -> bool {
        let destination = self.path_for(link);
        FsThumbnailStore::create_thumbnail(self, image_url, &destination, self.max_size).await
    }

    async fn read(&self, link: &UniqueLink) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.path_for(link)).await
    }

    async fn remove(&self, link: &UniqueLink) -> io::Result<()> {
        tokio::fs::remove_file(self.path_for(link)).await
    }
}
