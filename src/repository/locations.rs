//! Locations repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::location::Location};

/// Store operations for organization locations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Location>>;

    async fn list(&self) -> AppResult<Vec<Location>>;
}

#[derive(Clone)]
pub struct LocationsRepository {
    pool: Pool<Postgres>,
}

impl LocationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationStore for LocationsRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(location)
    }

    async fn list(&self) -> AppResult<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>("SELECT * FROM locations ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(locations)
    }
}
