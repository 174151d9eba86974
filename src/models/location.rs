//! Organization location reference data

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Location model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
