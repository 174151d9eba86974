//! Asset category reference data

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Category model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    /// Two-letter prefix used for generated asset codes (e.g. "LA")
    pub prefix: String,
    pub created_at: DateTime<Utc>,
}

/// Create category request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(length(min = 2, max = 50, message = "Category name must be 2-50 characters"))]
    pub name: String,
    #[validate(length(equal = 2, message = "Category prefix must be exactly 2 characters"))]
    pub prefix: String,
}
