pub mod errors;
pub mod ids;
pub mod images;
pub mod repositories;

pub use errors::{ProviderError, RepositoryError};
