//! Return request model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::enums::ReturnRequestStatus;

/// Internal row structure for database queries
#[derive(Debug, Clone, FromRow)]
pub struct ReturnRequestRow {
    id: i32,
    assignment_id: i32,
    requested_by_id: i32,
    acceptor_id: Option<i32>,
    return_date: NaiveDate,
    state: i16,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ReturnRequestRow> for ReturnRequest {
    fn from(row: ReturnRequestRow) -> Self {
        ReturnRequest {
            id: row.id,
            assignment_id: row.assignment_id,
            requested_by_id: row.requested_by_id,
            acceptor_id: row.acceptor_id,
            return_date: row.return_date,
            state: ReturnRequestStatus::from(row.state),
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Return request model from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub id: i32,
    pub assignment_id: i32,
    pub requested_by_id: i32,
    /// Admin who completed the request; set on completion
    pub acceptor_id: Option<i32>,
    /// Requested date at creation, replaced by the completion date
    pub return_date: NaiveDate,
    pub state: ReturnRequestStatus,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Return request listing row with joined asset and user columns
#[derive(Debug, Clone, FromRow)]
pub struct ReturnRequestListRow {
    pub id: i32,
    pub assignment_id: i32,
    pub asset_code: String,
    pub asset_name: String,
    pub requested_by: String,
    pub accepted_by: Option<String>,
    pub assigned_date: NaiveDate,
    pub return_date: NaiveDate,
    pub state: i16,
}

/// Return request with joined names, for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnRequestDetails {
    pub id: i32,
    pub assignment_id: i32,
    pub asset_code: String,
    pub asset_name: String,
    pub requested_by: String,
    pub accepted_by: Option<String>,
    pub assigned_date: NaiveDate,
    pub return_date: NaiveDate,
    pub state: ReturnRequestStatus,
}

impl From<ReturnRequestListRow> for ReturnRequestDetails {
    fn from(row: ReturnRequestListRow) -> Self {
        ReturnRequestDetails {
            id: row.id,
            assignment_id: row.assignment_id,
            asset_code: row.asset_code,
            asset_name: row.asset_name,
            requested_by: row.requested_by,
            accepted_by: row.accepted_by,
            assigned_date: row.assigned_date,
            return_date: row.return_date,
            state: ReturnRequestStatus::from(row.state),
        }
    }
}

/// Insert shape produced by the return workflow
#[derive(Debug, Clone)]
pub struct NewReturnRequest {
    pub assignment_id: i32,
    pub requested_by_id: i32,
    pub return_date: NaiveDate,
    pub state: ReturnRequestStatus,
}

/// Batched mutation applied when a return request is completed: the request,
/// its assignment and its asset advance in a single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnCompletion {
    pub return_request_id: i32,
    pub acceptor_id: i32,
    pub returned_date: NaiveDate,
    pub assignment_id: i32,
    pub asset_id: i32,
}

/// Return request listing query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ReturnRequestQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    /// Specific state, or absent/"all" for every state
    pub state: Option<String>,
    pub return_date: Option<NaiveDate>,
    /// Record forced to the front of page one, regardless of ordering
    pub priority_id: Option<i32>,
}
