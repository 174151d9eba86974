//! Return request workflow service.
//!
//! A return request is raised against an accepted assignment and resolved by
//! an admin: completion advances the request, its assignment and its asset
//! in one commit; cancellation soft-deletes the request and is idempotent.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{AssignmentStatus, ReturnRequestStatus},
        return_request::{
            NewReturnRequest, ReturnCompletion, ReturnRequest, ReturnRequestDetails,
            ReturnRequestQuery,
        },
    },
    query::Page,
    repository::{AssetStore, AssignmentStore, ReturnRequestStore},
};

#[derive(Clone)]
pub struct ReturnsService {
    returns: Arc<dyn ReturnRequestStore>,
    assignments: Arc<dyn AssignmentStore>,
    assets: Arc<dyn AssetStore>,
}

impl ReturnsService {
    pub fn new(
        returns: Arc<dyn ReturnRequestStore>,
        assignments: Arc<dyn AssignmentStore>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            returns,
            assignments,
            assets,
        }
    }

    /// List return requests with filtering, ordering and pagination
    pub async fn list(&self, query: &ReturnRequestQuery) -> AppResult<Page<ReturnRequestDetails>> {
        self.returns.list(query).await
    }

    /// Raise a return request for an accepted assignment.
    ///
    /// An assignment carries at most one pending request at a time.
    pub async fn create(&self, assignment_id: i32, requested_by_id: i32) -> AppResult<ReturnRequest> {
        let assignment = self
            .assignments
            .find_by_id(assignment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Assignment with id {} not found", assignment_id))
            })?;

        if assignment.state != AssignmentStatus::Accepted {
            return Err(AppError::AssignmentNotEligible(format!(
                "Assignment {} has not been accepted",
                assignment_id
            )));
        }

        if self
            .returns
            .find_pending_for_assignment(assignment_id)
            .await?
            .is_some()
        {
            return Err(AppError::AssignmentNotEligible(format!(
                "Assignment {} already has a pending return request",
                assignment_id
            )));
        }

        let request = NewReturnRequest {
            assignment_id,
            requested_by_id,
            return_date: Utc::now().date_naive(),
            state: ReturnRequestStatus::WaitingForReturning,
        };

        let created = self
            .returns
            .insert(&request)
            .await?
            .ok_or_else(|| AppError::PersistenceFailure("return request insert".to_string()))?;

        tracing::info!(
            return_request_id = created.id,
            assignment_id,
            "return request created"
        );

        Ok(created)
    }

    /// Complete a pending return request.
    ///
    /// The request moves to Completed with today's date, its assignment to
    /// Returned, and the asset back to Available, flushed in one commit.
    pub async fn complete(&self, id: i32, acceptor_id: i32) -> AppResult<ReturnRequest> {
        let request = self
            .returns
            .find_by_id(id)
            .await?
            .filter(|r| !r.is_deleted)
            .ok_or_else(|| {
                AppError::NotFound(format!("Return request with id {} not found", id))
            })?;

        if request.state != ReturnRequestStatus::WaitingForReturning {
            return Err(AppError::InvalidStatus(format!(
                "Return request {} is not waiting for returning",
                id
            )));
        }

        let assignment = self
            .assignments
            .find_by_id(request.assignment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Assignment with id {} not found",
                    request.assignment_id
                ))
            })?;

        let asset = self
            .assets
            .find_by_id(assignment.asset_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Asset with id {} not found", assignment.asset_id))
            })?;

        let returned_date = Utc::now().date_naive();
        let completion = ReturnCompletion {
            return_request_id: id,
            acceptor_id,
            returned_date,
            assignment_id: assignment.id,
            asset_id: asset.id,
        };

        let rows = self.returns.complete(&completion).await?;
        if rows == 0 {
            return Err(AppError::PersistenceFailure("return completion".to_string()));
        }

        tracing::info!(
            return_request_id = id,
            assignment_id = assignment.id,
            asset_id = asset.id,
            "return request completed"
        );

        Ok(ReturnRequest {
            state: ReturnRequestStatus::Completed,
            acceptor_id: Some(acceptor_id),
            return_date: returned_date,
            ..request
        })
    }

    /// Cancel a pending return request.
    ///
    /// Completed requests cannot be cancelled. Cancelling an already
    /// cancelled request affects no rows and reports `false`.
    pub async fn cancel(&self, id: i32) -> AppResult<bool> {
        let request = self
            .returns
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Return request with id {} not found", id))
            })?;

        if request.state == ReturnRequestStatus::Completed {
            return Err(AppError::CannotCancelCompleted(format!(
                "Return request {} has been completed",
                id
            )));
        }

        let rows = self.returns.soft_delete(id).await?;

        tracing::info!(return_request_id = id, affected = rows, "return request cancelled");

        Ok(rows > 0)
    }
}
