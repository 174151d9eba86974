//! Categories repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::category::{Category, CreateCategory},
};

/// Store operations for asset categories
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Category>>;

    async fn list(&self) -> AppResult<Vec<Category>>;

    /// True when a category with this name or prefix already exists
    async fn name_or_prefix_exists(&self, name: &str, prefix: &str) -> AppResult<bool>;

    /// Insert; `None` when the write committed zero rows
    async fn insert(&self, category: &CreateCategory) -> AppResult<Option<Category>>;
}

#[derive(Clone)]
pub struct CategoriesRepository {
    pool: Pool<Postgres>,
}

impl CategoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for CategoriesRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    async fn list(&self) -> AppResult<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    async fn name_or_prefix_exists(&self, name: &str, prefix: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE LOWER(name) = LOWER($1) OR UPPER(prefix) = UPPER($2))",
        )
        .bind(name)
        .bind(prefix)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, category: &CreateCategory) -> AppResult<Option<Category>> {
        let created = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, prefix, created_at)
            VALUES ($1, UPPER($2), NOW())
            RETURNING *
            "#,
        )
        .bind(&category.name)
        .bind(&category.prefix)
        .fetch_optional(&self.pool)
        .await?;

        Ok(created)
    }
}
