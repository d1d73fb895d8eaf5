use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Url};

use crate::application::errors::ErrorResponse;
use crate::application::routes::health::HealthResponse;
use crate::application::routes::images::ImageResponse;
use crate::domain::images::{ImageQuery, UniqueLink};

/// Thin HTTP client for a running thumbfetch server.
pub struct ThumbfetchClient {
    base_url: Url,
    http: Client,
}

impl ThumbfetchClient {
    pub fn new(base_url: Url) -> Result<Self> {
        let mut normalized = base_url;
        if !normalized.path().ends_with('/') {
            normalized.set_path(&format!("{}/", normalized.path().trim_end_matches('/')));
        }

        let http = Client::builder()
            .user_agent("thumbfetch-cli/1.0")
            .build()
            .context("failed to configure HTTP client")?;

        Ok(Self {
            base_url: normalized,
            http,
        })
    }

    pub fn from_base_url(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url).with_context(|| format!("invalid API url: {base_url}"))?;
        Self::new(url)
    }

    pub async fn random_image(&self, query: &ImageQuery) -> Result<ImageResponse> {
        let url = self.endpoint("image/random/")?;
        let response = self.http.post(url).json(query).send().await?;
        self.handle_response(response).await
    }

    pub async fn thumbnail(&self, link: &UniqueLink) -> Result<Vec<u8>> {
        let url = self.segments_endpoint(&["image", "thumbnail", link.as_str()])?;
        let response = self.http.get(url).send().await?;
        if response.status().is_success() {
            let bytes = response
                .bytes()
                .await
                .context("failed to read thumbnail body")?;
            Ok(bytes.to_vec())
        } else {
            Err(self.response_error(response).await)
        }
    }

    pub async fn metadata(&self, link: &UniqueLink) -> Result<ImageResponse> {
        let url = self.segments_endpoint(&["image", "metadata", link.as_str()])?;
        let response = self.http.get(url).send().await?;
        self.handle_response(response).await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.endpoint("health")?;
        let response = self.http.get(url).send().await?;
        self.handle_response(response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid API path: {path}"))
    }

    /// Like [`Self::endpoint`] but percent-encodes each segment, so links
    /// containing `#`, `?` or `%` stay inside the path.
    fn segments_endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("API url cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn handle_response<T>(&self, response: reqwest::Response) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        if response.status().is_success() {
            response
                .json::<T>()
                .await
                .context("failed to deserialize response body")
        } else {
            Err(self.response_error(response).await)
        }
    }

    async fn response_error(&self, response: reqwest::Response) -> anyhow::Error {
        let status = response.status();
        let bytes = response.bytes().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_slice::<ErrorResponse>(&bytes) {
            return anyhow!("request failed ({status}): {}", err.detail);
        }

        let message = String::from_utf8_lossy(&bytes);
        anyhow!("request failed ({status}): {message}")
    }
}
