use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query_as;

use crate::domain::RepositoryError;
use crate::domain::ids::ImageMetadataId;
use crate::domain::images::{Color, ImageMetadata, NewImageMetadata, Orientation, UniqueLink};
use crate::domain::repositories::ImageMetadataRepository;
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlImageMetadataRepository {
    pool: DatabasePool,
}

impl SqlImageMetadataRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: ImageMetadataRecord) -> Result<ImageMetadata, RepositoryError> {
        let color = record
            .color
            .as_deref()
            .map(|value| {
                value.parse::<Color>().map_err(|()| {
                    RepositoryError::unexpected(format!("invalid stored color: {value}"))
                })
            })
            .transpose()?;
        let orientation = record
            .orientation
            .as_deref()
            .map(|value| {
                value.parse::<Orientation>().map_err(|()| {
                    RepositoryError::unexpected(format!("invalid stored orientation: {value}"))
                })
            })
            .transpose()?;

        Ok(ImageMetadata {
            id: ImageMetadataId::from(record.id),
            unique_link: UniqueLink::parse(&record.unique_link).ok_or_else(|| {
                RepositoryError::unexpected(format!(
                    "invalid stored unique link: {}",
                    record.unique_link
                ))
            })?,
            image_original_url: record.image_original_url,
            search_term: record.search_term,
            color,
            orientation,
            created_at: record.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ImageMetadataRecord {
    id: i64,
    unique_link: String,
    image_original_url: String,
    search_term: String,
    color: Option<String>,
    orientation: Option<String>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl ImageMetadataRepository for SqlImageMetadataRepository {
    async fn insert(&self, metadata: NewImageMetadata) -> Result<ImageMetadata, RepositoryError> {
        let created_at = Utc::now();

        let record = query_as::<_, ImageMetadataRecord>(
            r"INSERT INTO image_metadata
                  (unique_link, image_original_url, search_term, color, orientation, created_at)
               VALUES (?, ?, ?, ?, ?, ?)
               RETURNING id, unique_link, image_original_url, search_term, color, orientation, created_at",
        )
        .bind(metadata.unique_link.as_str())
        .bind(&metadata.image_original_url)
        .bind(&metadata.search_term)
        .bind(metadata.color.map(|c| c.as_str()))
        .bind(metadata.orientation.map(|o| o.as_str()))
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err
                && db_err.is_unique_violation()
            {
                return RepositoryError::conflict("An image with this unique link already exists");
            }
            RepositoryError::unexpected(err.to_string())
        })?;

        Self::into_domain(record)
    }

    async fn get_by_unique_link(
        &self,
        link: &UniqueLink,
    ) -> Result<ImageMetadata, RepositoryError> {
        let record = query_as::<_, ImageMetadataRecord>(
            r"SELECT id, unique_link, image_original_url, search_term, color, orientation, created_at
               FROM image_metadata
               WHERE unique_link = ?",
        )
        .bind(link.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        Self::into_domain(record)
    }
}
