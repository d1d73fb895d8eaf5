use std::sync::Arc;

use tracing::warn;

use super::SearchError;
use crate::domain::images::{ImageQuery, UniqueLink};
use crate::domain::repositories::ThumbnailStore;

/// Binds a search term to a freshly generated thumbnail.
#[derive(Clone)]
pub struct UniqueLinkGenerator {
    thumbnails: Arc<dyn ThumbnailStore>,
}

impl UniqueLinkGenerator {
    pub fn new(thumbnails: Arc<dyn ThumbnailStore>) -> Self {
        Self { thumbnails }
    }

    /// Name a new thumbnail `{search_term}_{token}.jpg` and create it from
    /// `image_url`. The returned link is only valid once the file exists.
    pub async fn generate_unique_link(
        &self,
        query: &ImageQuery,
        image_url: Option<&str>,
    ) -> Result<UniqueLink, SearchError> {
        let image_url = image_url.ok_or(SearchError::NoImageFound)?;
        let link = UniqueLink::generate(&query.search_term);

        if self.thumbnails.create_thumbnail(image_url, &link).await {
            Ok(link)
        } else {
            warn!(unique_link = %link, url = image_url, "thumbnail creation failed");
            Err(SearchError::ThumbnailCreationFailed)
        }
    }
}
