//! User model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Internal row structure for database queries
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    id: i32,
    staff_code: String,
    username: String,
    password_hash: Option<String>,
    first_name: String,
    last_name: String,
    date_of_birth: Option<NaiveDate>,
    joined_date: NaiveDate,
    role_id: i32,
    location_id: i32,
    must_change_password: bool,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            staff_code: row.staff_code,
            username: row.username,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            date_of_birth: row.date_of_birth,
            joined_date: row.joined_date,
            role_id: row.role_id,
            location_id: row.location_id,
            must_change_password: row.must_change_password,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    /// Generated staff code (e.g. SD0001)
    pub staff_code: String,
    /// Generated unique username
    pub username: String,
    /// Opaque credential hash, produced and verified by the auth layer
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub joined_date: NaiveDate,
    pub role_id: i32,
    pub location_id: i32,
    /// First-login flag: the user must change the generated password
    pub must_change_password: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Role reference data
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: i32,
    pub name: String,
}

/// Insert shape produced by the user workflow (codes already generated)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub staff_code: String,
    pub username: String,
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub joined_date: NaiveDate,
    pub role_id: i32,
    pub location_id: i32,
}

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub joined_date: NaiveDate,
    pub role_id: i32,
    pub location_id: i32,
    /// Opaque credential hash issued by the auth layer
    pub password_hash: Option<String>,
}

/// User listing query parameters
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub role_id: Option<i32>,
    pub location_id: Option<i32>,
    /// Record forced to the front of page one, regardless of ordering
    pub priority_id: Option<i32>,
}
