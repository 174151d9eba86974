//! Assets repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        asset::{Asset, AssetDetails, AssetListRow, AssetQuery, AssetRow, NewAsset},
        enums::AssetStatus,
    },
    query::{self, Page},
};

/// Store operations the asset workflows depend on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Find a non-deleted asset by id
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Asset>>;

    /// True when a non-deleted asset with this id exists
    async fn exists(&self, id: i32) -> AppResult<bool>;

    /// Paged listing; `(items, total)` with total over the filtered set
    async fn list(&self, q: &AssetQuery) -> AppResult<Page<AssetDetails>>;

    /// Highest generated code carrying this prefix, if any
    async fn last_code_for_prefix(&self, prefix: &str) -> AppResult<Option<String>>;

    /// Insert; `None` when the write committed zero rows
    async fn insert(&self, asset: &NewAsset) -> AppResult<Option<Asset>>;

    /// Full-row update; returns affected row count
    async fn update(&self, asset: &Asset) -> AppResult<u64>;

    /// Flip only the lifecycle state; returns affected row count
    async fn set_state(&self, id: i32, state: AssetStatus) -> AppResult<u64>;

    /// Soft delete; returns affected row count
    async fn soft_delete(&self, id: i32) -> AppResult<u64>;
}

#[derive(Clone)]
pub struct AssetsRepository {
    pool: Pool<Postgres>,
}

impl AssetsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetStore for AssetsRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Asset>> {
        let row = sqlx::query_as::<_, AssetRow>(
            "SELECT * FROM assets WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Asset::from))
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM assets WHERE id = $1 AND is_deleted = FALSE)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list(&self, q: &AssetQuery) -> AppResult<Page<AssetDetails>> {
        let sel = query::compose_assets(q)?;
        let from = "FROM assets a JOIN categories c ON a.category_id = c.id";

        let count_sql = format!("SELECT COUNT(*) {} {}", from, sel.where_sql());
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for bind in sel.binds() {
            count_query = count_query.bind(bind);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let select_sql = format!(
            r#"
            SELECT a.id, a.code, a.name, a.category_id, c.name as category_name,
                   a.location_id, a.specification, a.installed_date, a.state,
                   a.is_deleted, a.created_at, a.updated_at
            {} {} {}
            LIMIT {} OFFSET {}
            "#,
            from,
            sel.where_sql(),
            sel.order_sql(),
            sel.limit(),
            sel.offset()
        );
        let mut select_query = sqlx::query_as::<_, AssetListRow>(&select_sql);
        for bind in sel.binds() {
            select_query = select_query.bind(bind);
        }
        let rows = select_query.fetch_all(&self.pool).await?;

        Ok(Page {
            items: rows.into_iter().map(AssetDetails::from).collect(),
            total,
        })
    }

    async fn last_code_for_prefix(&self, prefix: &str) -> AppResult<Option<String>> {
        let code: Option<String> = sqlx::query_scalar(
            "SELECT code FROM assets WHERE code LIKE $1 ORDER BY code DESC LIMIT 1",
        )
        .bind(format!("{}%", prefix))
        .fetch_optional(&self.pool)
        .await?;

        Ok(code)
    }

    async fn insert(&self, asset: &NewAsset) -> AppResult<Option<Asset>> {
        let row = sqlx::query_as::<_, AssetRow>(
            r#"
            INSERT INTO assets (code, name, category_id, location_id, specification,
                                installed_date, state, is_deleted, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, NOW())
            RETURNING *
            "#,
        )
        .bind(&asset.code)
        .bind(&asset.name)
        .bind(asset.category_id)
        .bind(asset.location_id)
        .bind(&asset.specification)
        .bind(asset.installed_date)
        .bind(i16::from(asset.state))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Asset::from))
    }

    async fn update(&self, asset: &Asset) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE assets
            SET name = $1, specification = $2, installed_date = $3, state = $4,
                updated_at = NOW()
            WHERE id = $5 AND is_deleted = FALSE
            "#,
        )
        .bind(&asset.name)
        .bind(&asset.specification)
        .bind(asset.installed_date)
        .bind(i16::from(asset.state))
        .bind(asset.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn set_state(&self, id: i32, state: AssetStatus) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE assets SET state = $1, updated_at = NOW() WHERE id = $2 AND is_deleted = FALSE",
        )
        .bind(i16::from(state))
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn soft_delete(&self, id: i32) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE assets SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
