//! Asset model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::enums::AssetStatus;

/// Internal row structure for database queries
#[derive(Debug, Clone, FromRow)]
pub struct AssetRow {
    id: i32,
    code: String,
    name: String,
    category_id: i32,
    location_id: i32,
    specification: Option<String>,
    installed_date: NaiveDate,
    state: i16,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<AssetRow> for Asset {
    fn from(row: AssetRow) -> Self {
        Asset {
            id: row.id,
            code: row.code,
            name: row.name,
            category_id: row.category_id,
            location_id: row.location_id,
            specification: row.specification,
            installed_date: row.installed_date,
            state: AssetStatus::from(row.state),
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Asset model from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: i32,
    /// Generated code, category prefix + 6-digit sequence (e.g. LA000001)
    pub code: String,
    pub name: String,
    pub category_id: i32,
    pub location_id: i32,
    pub specification: Option<String>,
    pub installed_date: NaiveDate,
    pub state: AssetStatus,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Asset listing row with its category name
#[derive(Debug, Clone, FromRow)]
pub struct AssetListRow {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub category_id: i32,
    pub category_name: String,
    pub location_id: i32,
    pub specification: Option<String>,
    pub installed_date: NaiveDate,
    pub state: i16,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Asset with its category name, for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDetails {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub category_id: i32,
    pub category_name: String,
    pub location_id: i32,
    pub specification: Option<String>,
    pub installed_date: NaiveDate,
    pub state: AssetStatus,
}

impl From<AssetListRow> for AssetDetails {
    fn from(row: AssetListRow) -> Self {
        AssetDetails {
            id: row.id,
            code: row.code,
            name: row.name,
            category_id: row.category_id,
            category_name: row.category_name,
            location_id: row.location_id,
            specification: row.specification,
            installed_date: row.installed_date,
            state: AssetStatus::from(row.state),
        }
    }
}

/// Insert shape produced by the asset workflow (code already generated)
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub code: String,
    pub name: String,
    pub category_id: i32,
    pub location_id: i32,
    pub specification: Option<String>,
    pub installed_date: NaiveDate,
    pub state: AssetStatus,
}

/// Create asset request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAsset {
    #[validate(length(min = 2, max = 100, message = "Asset name must be 2-100 characters"))]
    pub name: String,
    pub category_id: i32,
    pub location_id: i32,
    #[validate(length(max = 500, message = "Specification must be at most 500 characters"))]
    pub specification: Option<String>,
    pub installed_date: NaiveDate,
    /// Initial state; only Available and NotAvailable are accepted
    pub state: Option<String>,
}

/// Update asset request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAsset {
    #[validate(length(min = 2, max = 100, message = "Asset name must be 2-100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "Specification must be at most 500 characters"))]
    pub specification: Option<String>,
    pub installed_date: Option<NaiveDate>,
    pub state: Option<String>,
}

/// Asset listing query parameters
#[derive(Debug, Default, Deserialize)]
pub struct AssetQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub category_id: Option<i32>,
    pub location_id: Option<i32>,
    /// Specific state, or absent/"all" for the default view
    /// (Available, NotAvailable, Assigned)
    pub state: Option<String>,
    /// Record forced to the front of page one, regardless of ordering
    pub priority_id: Option<i32>,
}
