use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::application::errors::{ApiError, AppError};

/// JSON body extractor whose rejections use the `{"detail": ...}` error shape.
#[derive(Debug)]
pub struct JsonPayload<T>(pub T);

impl<S, T> FromRequest<S> for JsonPayload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(payload)) => Ok(Self(payload)),
            Err(rejection) => {
                let message = rejection.body_text();
                warn!(error = %message, "failed to parse JSON payload");
                Err(AppError::validation(message).into())
            }
        }
    }
}
