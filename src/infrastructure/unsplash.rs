use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::ProviderError;
use crate::domain::images::ImageQuery;
use crate::domain::repositories::ImageProvider;

pub const UNSPLASH_SEARCH_URL: &str = "https://api.unsplash.com/search/photos";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Unsplash answers pages past 200 with an empty result list.
pub const MAX_PAGE: u64 = 200;

const USER_AGENT: &str = "thumbfetch/1.0";

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_url: String,
    pub access_key: String,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(api_url: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            access_key: access_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Clone)]
pub struct UnsplashProvider {
    client: reqwest::Client,
    config: ProviderConfig,
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
}

impl UnsplashProvider {
    pub fn new(client: reqwest::Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    /// Query parameters shared by the count and page requests. Filters are
    /// only sent when the caller set them.
    pub fn search_params(&self, query: &ImageQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("client_id", self.config.access_key.clone()),
            ("query", query.search_term.clone()),
        ];
        if let Some(orientation) = query.orientation {
            params.push(("orientation", orientation.as_str().to_string()));
        }
        if let Some(color) = query.color {
            params.push(("color", color.as_str().to_string()));
        }
        params
    }

    async fn search(
        &self,
        params: &[(&'static str, String)],
    ) -> Result<SearchResponse, ProviderError> {
        let response = self
            .client
            .get(&self.config.api_url)
            .query(params)
            .header("User-Agent", USER_AGENT)
            .header("Accept-Version", "v1")
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::unavailable(format!("request timed out: {e}"))
                } else {
                    ProviderError::unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(unreadable body)".to_string());
            warn!(%status, body = %body, "image provider returned non-success status");
            return Err(ProviderError::unavailable(format!(
                "provider returned status {status}"
            )));
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| ProviderError::unavailable(format!("invalid provider response: {e}")))
    }
}

/// Pick a page uniformly from `[1, min(total, MAX_PAGE)]`, or `None` when
/// there is nothing to pick from.
pub fn random_page(total: u64) -> Option<u64> {
    if total == 0 {
        return None;
    }
    let upper = total.min(MAX_PAGE);
    Some(rand::rng().random_range(1..=upper))
}

#[async_trait]
impl ImageProvider for UnsplashProvider {
    #[tracing::instrument(skip(self, query), fields(search_term = %query.search_term))]
    async fn count(&self, query: &ImageQuery) -> Result<u64, ProviderError> {
        let params = self.search_params(query);
        let response = self.search(&params).await?;
        debug!(total = response.total, "provider reported total matches");
        Ok(response.total)
    }

    #[tracing::instrument(skip(self, query), fields(search_term = %query.search_term))]
    async fn fetch_random(&self, query: &ImageQuery) -> Result<Option<String>, ProviderError> {
        let total = self.count(query).await?;
        let Some(page) = random_page(total) else {
            return Ok(None);
        };

        let mut params = self.search_params(query);
        params.push(("page", page.to_string()));
        params.push(("per_page", "1".to_string()));

        let response = self.search(&params).await?;
        let url = response.results.into_iter().next().map(|r| r.urls.regular);
        if url.is_none() {
            warn!(page, total, "provider returned an empty page");
        }
        Ok(url)
    }
}
