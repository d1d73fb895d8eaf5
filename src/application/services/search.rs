use std::sync::Arc;

use tracing::{info, warn};

use super::{SearchError, UniqueLinkGenerator};
use crate::domain::images::{ImageMetadata, ImageQuery, NewImageMetadata};
use crate::domain::repositories::{ImageMetadataRepository, ImageProvider, ThumbnailStore};

/// Runs one search end to end: pick an image, cache its thumbnail, record it.
#[derive(Clone)]
pub struct SearchService {
    provider: Arc<dyn ImageProvider>,
    thumbnails: Arc<dyn ThumbnailStore>,
    links: UniqueLinkGenerator,
    repo: Arc<dyn ImageMetadataRepository>,
}

impl SearchService {
    pub fn new(
        provider: Arc<dyn ImageProvider>,
        thumbnails: Arc<dyn ThumbnailStore>,
        repo: Arc<dyn ImageMetadataRepository>,
    ) -> Self {
        Self {
            provider,
            links: UniqueLinkGenerator::new(Arc::clone(&thumbnails)),
            thumbnails,
            repo,
        }
    }

    #[tracing::instrument(skip(self, query), fields(search_term = %query.search_term))]
    pub async fn handle_search(&self, query: &ImageQuery) -> Result<ImageMetadata, SearchError> {
        let image_url = self.provider.fetch_random(query).await?;
        let Some(image_url) = image_url else {
            info!("provider returned no image");
            return Err(SearchError::NoImageFound);
        };

        let link = self
            .links
            .generate_unique_link(query, Some(&image_url))
            .await?;

        let new = NewImageMetadata::new(query, image_url, link.clone());
        match self.repo.insert(new).await {
            Ok(metadata) => {
                info!(unique_link = %metadata.unique_link, id = %metadata.id, "image metadata stored");
                Ok(metadata)
            }
            Err(err) => {
                // the record never committed, so the thumbnail must not outlive it
                if let Err(remove_err) = self.thumbnails.remove(&link).await {
                    warn!(
                        unique_link = %link,
                        error = %remove_err,
                        "failed to remove orphaned thumbnail"
                    );
                }
                Err(SearchError::from(err))
            }
        }
    }
}
