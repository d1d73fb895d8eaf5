use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::application::services::SearchService;
use crate::domain::repositories::{ImageMetadataRepository, ImageProvider, ThumbnailStore};
use crate::infrastructure::database::Database;
use crate::infrastructure::repositories::SqlImageMetadataRepository;
use crate::infrastructure::thumbnails::FsThumbnailStore;
use crate::infrastructure::unsplash::{ProviderConfig, UnsplashProvider};

/// Everything that varies between production and test environments.
/// Repositories and services are built from the database pool.
pub struct AppStateConfig {
    pub unsplash_api_url: String,
    pub unsplash_access_key: String,
    pub thumbnail_directory: PathBuf,
    pub provider_timeout: Duration,
}

#[derive(Clone)]
pub struct AppState {
    pub image_repo: Arc<dyn ImageMetadataRepository>,
    pub thumbnails: Arc<dyn ThumbnailStore>,
    pub search_service: SearchService,
}

impl AppState {
    pub fn from_database(database: &Database, config: AppStateConfig) -> Self {
        #[allow(clippy::expect_used)]
        let http_client = reqwest::ClientBuilder::new()
            .timeout(config.provider_timeout)
            .build()
            .expect("failed to build HTTP client");

        let image_repo: Arc<dyn ImageMetadataRepository> =
            Arc::new(SqlImageMetadataRepository::new(database.clone_pool()));

        let provider: Arc<dyn ImageProvider> = Arc::new(UnsplashProvider::new(
            http_client.clone(),
            ProviderConfig {
                api_url: config.unsplash_api_url,
                access_key: config.unsplash_access_key,
                timeout: config.provider_timeout,
            },
        ));

        let thumbnails: Arc<dyn ThumbnailStore> = Arc::new(
            FsThumbnailStore::new(http_client, config.thumbnail_directory)
                .with_timeout(config.provider_timeout),
        );

        let search_service = SearchService::new(
            provider,
            Arc::clone(&thumbnails),
            Arc::clone(&image_repo),
        );

        Self {
            image_repo,
            thumbnails,
            search_service,
        }
    }
}
