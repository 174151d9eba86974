//! Assignment model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::enums::AssignmentStatus;

/// Internal row structure for database queries
#[derive(Debug, Clone, FromRow)]
pub struct AssignmentRow {
    id: i32,
    asset_id: i32,
    assigned_to_id: i32,
    assigned_by_id: i32,
    assigned_date: NaiveDate,
    note: Option<String>,
    state: i16,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<AssignmentRow> for Assignment {
    fn from(row: AssignmentRow) -> Self {
        Assignment {
            id: row.id,
            asset_id: row.asset_id,
            assigned_to_id: row.assigned_to_id,
            assigned_by_id: row.assigned_by_id,
            assigned_date: row.assigned_date,
            note: row.note,
            state: AssignmentStatus::from(row.state),
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Assignment model from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i32,
    pub asset_id: i32,
    pub assigned_to_id: i32,
    pub assigned_by_id: i32,
    pub assigned_date: NaiveDate,
    pub note: Option<String>,
    pub state: AssignmentStatus,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Assignment listing row with asset and user columns joined in
#[derive(Debug, Clone, FromRow)]
pub struct AssignmentListRow {
    pub id: i32,
    pub asset_id: i32,
    pub asset_code: String,
    pub asset_name: String,
    pub assigned_to_id: i32,
    pub assigned_to: String,
    pub assigned_by_id: i32,
    pub assigned_by: String,
    pub assigned_date: NaiveDate,
    pub note: Option<String>,
    pub state: i16,
}

/// Assignment with its asset and user names, for listings and detail views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentDetails {
    pub id: i32,
    pub asset_id: i32,
    pub asset_code: String,
    pub asset_name: String,
    pub assigned_to_id: i32,
    pub assigned_to: String,
    pub assigned_by_id: i32,
    pub assigned_by: String,
    pub assigned_date: NaiveDate,
    pub note: Option<String>,
    pub state: AssignmentStatus,
}

impl From<AssignmentListRow> for AssignmentDetails {
    fn from(row: AssignmentListRow) -> Self {
        AssignmentDetails {
            id: row.id,
            asset_id: row.asset_id,
            asset_code: row.asset_code,
            asset_name: row.asset_name,
            assigned_to_id: row.assigned_to_id,
            assigned_to: row.assigned_to,
            assigned_by_id: row.assigned_by_id,
            assigned_by: row.assigned_by,
            assigned_date: row.assigned_date,
            note: row.note,
            state: AssignmentStatus::from(row.state),
        }
    }
}

/// Insert shape produced by the assignment workflow
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub asset_id: i32,
    pub assigned_to_id: i32,
    pub assigned_by_id: i32,
    pub assigned_date: NaiveDate,
    pub note: Option<String>,
    pub state: AssignmentStatus,
}

/// Create assignment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssignment {
    pub asset_id: i32,
    pub assigned_to_id: i32,
    pub assigned_by_id: i32,
    pub assigned_date: NaiveDate,
    #[validate(length(max = 500, message = "Note must be at most 500 characters"))]
    pub note: Option<String>,
}

/// Update assignment request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAssignment {
    pub assigned_to_id: Option<i32>,
    pub asset_id: Option<i32>,
    pub assigned_by_id: Option<i32>,
    pub assigned_date: Option<NaiveDate>,
    /// Raw status override; values outside the enumeration are ignored
    pub state: Option<i16>,
    #[validate(length(max = 500, message = "Note must be at most 500 characters"))]
    pub note: Option<String>,
}

/// Assignment listing query parameters
#[derive(Debug, Default, Deserialize)]
pub struct AssignmentQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    /// Specific state, or absent/"all" for the default view
    /// (WaitingForAcceptance, Accepted)
    pub state: Option<String>,
    pub assigned_date: Option<NaiveDate>,
    /// Record forced to the front of page one, regardless of ordering
    pub priority_id: Option<i32>,
}
