mod links;
mod search;

pub use links::UniqueLinkGenerator;
pub use search::SearchService;

use thiserror::Error;

use crate::domain::{ProviderError, RepositoryError};

/// Every way the search pipeline can fail.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    ProviderUnavailable(#[from] ProviderError),
    #[error("no image found for the provided search term")]
    NoImageFound,
    #[error("failed to create thumbnail")]
    ThumbnailCreationFailed,
    #[error("duplicate unique link: {0}")]
    DuplicateLink(String),
    #[error("failed to persist image metadata: {0}")]
    Persistence(#[source] RepositoryError),
}

impl From<RepositoryError> for SearchError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(message) => SearchError::DuplicateLink(message),
            other => SearchError::Persistence(other),
        }
    }
}
