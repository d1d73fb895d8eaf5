use std::io;

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::application::errors::{ApiError, AppError, IMAGE_NOT_FOUND, THUMBNAIL_NOT_FOUND};
use crate::application::routes::support::JsonPayload;
use crate::application::state::AppState;
use crate::domain::images::{
    Color, ImageMetadata, ImageQuery, MAX_SEARCH_TERM_BYTES, Orientation, UniqueLink,
};

pub(super) fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/image/random/", post(random_image))
        .route("/image/random", post(random_image))
        .route("/image/thumbnail/{unique_link}", get(get_thumbnail))
        .route("/image/metadata/{unique_link}", get(get_metadata))
}

/// Public shape of a stored search; the internal id is not exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResponse {
    pub search_term: String,
    pub color: Option<Color>,
    pub orientation: Option<Orientation>,
    pub image_original_url: String,
    pub unique_link: String,
    pub created_at: DateTime<Utc>,
}

impl From<ImageMetadata> for ImageResponse {
    fn from(metadata: ImageMetadata) -> Self {
        Self {
            search_term: metadata.search_term,
            color: metadata.color,
            orientation: metadata.orientation,
            image_original_url: metadata.image_original_url,
            unique_link: metadata.unique_link.into_inner(),
            created_at: metadata.created_at,
        }
    }
}

#[tracing::instrument(skip(state, query))]
pub(crate) async fn random_image(
    State(state): State<AppState>,
    JsonPayload(query): JsonPayload<ImageQuery>,
) -> Result<Json<ImageResponse>, ApiError> {
    let query = query.normalize();
    if query.search_term.is_empty() {
        return Err(AppError::validation("search_term must not be empty").into());
    }
    if query.search_term.len() > MAX_SEARCH_TERM_BYTES {
        return Err(AppError::validation(format!(
            "search_term must be at most {MAX_SEARCH_TERM_BYTES} bytes"
        ))
        .into());
    }

    let metadata = state
        .search_service
        .handle_search(&query)
        .await
        .map_err(AppError::from)?;

    info!(unique_link = %metadata.unique_link, "random image cached");
    Ok(Json(ImageResponse::from(metadata)))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn get_thumbnail(
    State(state): State<AppState>,
    Path(unique_link): Path<String>,
) -> Result<Response, ApiError> {
    let link = UniqueLink::parse(&unique_link).ok_or(AppError::NotFound(THUMBNAIL_NOT_FOUND))?;

    let data = match state.thumbnails.read(&link).await {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(THUMBNAIL_NOT_FOUND).into());
        }
        Err(err) => {
            warn!(unique_link = %link, error = %err, "failed to read thumbnail");
            return Err(AppError::unexpected(format!("failed to read thumbnail: {err}")).into());
        }
    };

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/jpeg")
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(Body::from(data))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn get_metadata(
    State(state): State<AppState>,
    Path(unique_link): Path<String>,
) -> Result<Json<ImageResponse>, ApiError> {
    let link = UniqueLink::parse(&unique_link).ok_or(AppError::NotFound(IMAGE_NOT_FOUND))?;

    let metadata = state
        .image_repo
        .get_by_unique_link(&link)
        .await
        .map_err(AppError::from)?;

    Ok(Json(ImageResponse::from(metadata)))
}
