use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::application::services::SearchError;
use crate::domain::RepositoryError;

pub const NO_IMAGE_FOUND: &str = "No image found";
pub const THUMBNAIL_NOT_FOUND: &str = "Thumbnail not found";
pub const IMAGE_NOT_FOUND: &str = "Image not found";

/// Body of every error response: `{"detail": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    BadGateway(String),
    #[error("{0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AppError::NotFound(IMAGE_NOT_FOUND),
            RepositoryError::Conflict(message) | RepositoryError::Unexpected(message) => {
                AppError::Unexpected(message)
            }
        }
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::NoImageFound | SearchError::ThumbnailCreationFailed => {
                AppError::NotFound(NO_IMAGE_FOUND)
            }
            SearchError::ProviderUnavailable(err) => AppError::BadGateway(err.to_string()),
            SearchError::DuplicateLink(message) => AppError::Unexpected(message),
            SearchError::Persistence(err) => AppError::Unexpected(err.to_string()),
        }
    }
}

/// HTTP-facing wrapper so handlers can `?` an [`AppError`].
#[derive(Debug)]
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self.0 {
            AppError::NotFound(detail) => (StatusCode::NOT_FOUND, detail.to_string()),
            AppError::Validation(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            AppError::BadGateway(message) => {
                error!(error = %message, "upstream image provider failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Image provider unavailable".to_string(),
                )
            }
            AppError::Unexpected(message) => {
                error!(error = %message, "unexpected error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
