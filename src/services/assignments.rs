//! Assignment workflow service.
//!
//! Orchestrates the assignment state machine together with the asset it
//! holds. Operations that advance both entities commit each write
//! separately, in a fixed order; when a later write fails the earlier
//! commits are left in place and the error names the step that failed, so
//! callers can remediate instead of silently retrying.

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        assignment::{
            Assignment, AssignmentDetails, AssignmentQuery, CreateAssignment, NewAssignment,
            UpdateAssignment,
        },
        enums::{AssetStatus, AssignmentStatus},
    },
    query::Page,
    repository::{AssetStore, AssignmentStore, UserStore},
};

#[derive(Clone)]
pub struct AssignmentsService {
    assignments: Arc<dyn AssignmentStore>,
    assets: Arc<dyn AssetStore>,
    users: Arc<dyn UserStore>,
}

/// Accepted flag arrives as a string from the response form
fn parse_accepted_flag(raw: &str) -> AppResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(AppError::Validation(format!(
            "Accepted flag must be 'true' or 'false', got '{}'",
            other
        ))),
    }
}

impl AssignmentsService {
    pub fn new(
        assignments: Arc<dyn AssignmentStore>,
        assets: Arc<dyn AssetStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            assignments,
            assets,
            users,
        }
    }

    /// Get assignment details by id
    pub async fn get(&self, id: i32) -> AppResult<AssignmentDetails> {
        self.assignments
            .get_details(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assignment with id {} not found", id)))
    }

    /// List assignments with filtering, ordering and pagination
    pub async fn list(&self, query: &AssignmentQuery) -> AppResult<Page<AssignmentDetails>> {
        self.assignments.list(query).await
    }

    /// Create an assignment against an available asset.
    ///
    /// Two sequential commits: the assignment insert, then the asset state
    /// flip. A zero-row second commit leaves the assignment in place and
    /// surfaces a persistence failure naming that step.
    pub async fn create(&self, req: CreateAssignment) -> AppResult<Assignment> {
        req.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        match self.assets.find_by_id(req.asset_id).await? {
            Some(a) if a.state == AssetStatus::Available => {}
            _ => {
                return Err(AppError::AssetUnavailable(format!(
                    "Asset {} is not available for assignment",
                    req.asset_id
                )))
            }
        }

        let assignee = self
            .users
            .find_by_id(req.assigned_to_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User with id {} not found", req.assigned_to_id))
            })?;
        if assignee.is_deleted {
            return Err(AppError::UserDisabled(format!(
                "User {} is disabled",
                assignee.username
            )));
        }

        let assigner = self
            .users
            .find_by_id(req.assigned_by_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User with id {} not found", req.assigned_by_id))
            })?;
        if assigner.is_deleted {
            return Err(AppError::UserDisabled(format!(
                "User {} is disabled",
                assigner.username
            )));
        }

        // Re-check both targets right before the insert; either may have
        // vanished since the loads above.
        if !self.assets.exists(req.asset_id).await? {
            return Err(AppError::NotFound(format!(
                "Asset with id {} not found",
                req.asset_id
            )));
        }
        if !self.users.exists(req.assigned_to_id).await? {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                req.assigned_to_id
            )));
        }

        let new_assignment = NewAssignment {
            asset_id: req.asset_id,
            assigned_to_id: req.assigned_to_id,
            assigned_by_id: req.assigned_by_id,
            assigned_date: req.assigned_date,
            note: req.note,
            state: AssignmentStatus::WaitingForAcceptance,
        };

        let created = self
            .assignments
            .insert(&new_assignment)
            .await?
            .ok_or_else(|| AppError::PersistenceFailure("assignment insert".to_string()))?;

        let rows = self
            .assets
            .set_state(req.asset_id, AssetStatus::Assigned)
            .await?;
        if rows == 0 {
            return Err(AppError::PersistenceFailure(
                "assignment created but asset status update failed".to_string(),
            ));
        }

        tracing::info!(
            assignment_id = created.id,
            asset_id = created.asset_id,
            assigned_to_id = created.assigned_to_id,
            "assignment created"
        );

        Ok(created)
    }

    /// Update an assignment, optionally moving it to a different asset.
    ///
    /// The full-replace path runs three sequential commits: the assignment
    /// row, the release of the previous asset, the claim of the new one.
    /// Each failing commit raises a distinct persistence failure and leaves
    /// the earlier commits in place.
    pub async fn update(&self, id: i32, req: UpdateAssignment) -> AppResult<Assignment> {
        req.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut assignment = self
            .assignments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assignment with id {} not found", id)))?;

        if let Some(user_id) = req.assigned_to_id {
            if !self.users.exists(user_id).await? {
                return Err(AppError::NotFound(format!(
                    "User with id {} not found",
                    user_id
                )));
            }
            assignment.assigned_to_id = user_id;
        }

        if let Some(user_id) = req.assigned_by_id {
            assignment.assigned_by_id = user_id;
        }

        let mut asset_swap = None;
        if let Some(asset_id) = req.asset_id {
            if asset_id != assignment.asset_id {
                let replacement = self.assets.find_by_id(asset_id).await?;
                match replacement {
                    Some(a) if a.state == AssetStatus::Available => {
                        asset_swap = Some((assignment.asset_id, asset_id));
                        assignment.asset_id = asset_id;
                    }
                    _ => {
                        return Err(AppError::AssetUnavailable(format!(
                            "Asset {} is not available for assignment",
                            asset_id
                        )))
                    }
                }
            }
        }

        if let Some(date) = req.assigned_date {
            assignment.assigned_date = date;
        }
        // Status override only applies inside the enumeration; other raw
        // values are dropped without an error.
        if let Some(raw) = req.state {
            if let Some(state) = AssignmentStatus::from_raw(raw) {
                assignment.state = state;
            }
        }
        assignment.note = req.note;

        let rows = self.assignments.update(&assignment).await?;
        if rows == 0 {
            return Err(AppError::PersistenceFailure("assignment update".to_string()));
        }

        if let Some((previous_asset_id, new_asset_id)) = asset_swap {
            let rows = self
                .assets
                .set_state(previous_asset_id, AssetStatus::Available)
                .await?;
            if rows == 0 {
                return Err(AppError::PersistenceFailure(
                    "assignment updated but previous asset release failed".to_string(),
                ));
            }

            let rows = self
                .assets
                .set_state(new_asset_id, AssetStatus::Assigned)
                .await?;
            if rows == 0 {
                return Err(AppError::PersistenceFailure(
                    "assignment updated but replacement asset claim failed".to_string(),
                ));
            }

            tracing::info!(
                assignment_id = id,
                previous_asset_id,
                new_asset_id,
                "assignment moved to replacement asset"
            );
        }

        Ok(assignment)
    }

    /// Record the assignee's response: accept or decline.
    ///
    /// Declining releases the asset back to Available in the same operation.
    pub async fn respond(&self, id: i32, responder_id: i32, accepted: &str) -> AppResult<Assignment> {
        let accepted = parse_accepted_flag(accepted)?;

        let mut assignment = self
            .assignments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assignment with id {} not found", id)))?;

        if assignment.assigned_to_id != responder_id {
            return Err(AppError::NotYourAssignment(format!(
                "Assignment {} is not assigned to user {}",
                id, responder_id
            )));
        }

        let asset = self
            .assets
            .find_by_id(assignment.asset_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Asset with id {} not found", assignment.asset_id))
            })?;
        if asset.state != AssetStatus::Assigned {
            return Err(AppError::AssetNotAssigned(format!(
                "Asset {} is not in the assigned state",
                asset.code
            )));
        }

        assignment.state = if accepted {
            AssignmentStatus::Accepted
        } else {
            AssignmentStatus::Declined
        };

        let rows = self.assignments.set_state(id, assignment.state).await?;
        if rows == 0 {
            return Err(AppError::PersistenceFailure("assignment response".to_string()));
        }

        if !accepted {
            let rows = self
                .assets
                .set_state(assignment.asset_id, AssetStatus::Available)
                .await?;
            if rows == 0 {
                return Err(AppError::PersistenceFailure(
                    "assignment declined but asset release failed".to_string(),
                ));
            }
        }

        tracing::info!(
            assignment_id = id,
            accepted,
            "assignment response recorded"
        );

        Ok(assignment)
    }

    /// Delete an assignment that has not been accepted.
    ///
    /// A missing assignment is an expected empty case here, not an error:
    /// the call reports `false` instead.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let assignment = match self.assignments.find_by_id(id).await? {
            Some(a) => a,
            None => return Ok(false),
        };

        if assignment.state == AssignmentStatus::Accepted {
            return Err(AppError::CannotDeleteAccepted(format!(
                "Assignment {} has been accepted",
                id
            )));
        }

        let rows = self
            .assignments
            .retire(id, assignment.asset_id)
            .await?;

        tracing::info!(assignment_id = id, "assignment deleted");

        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use mockall::predicate::eq;

    use crate::models::asset::Asset;
    use crate::models::user::User;
    use crate::repository::assets::MockAssetStore;
    use crate::repository::assignments::MockAssignmentStore;
    use crate::repository::users::MockUserStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_asset(id: i32, state: AssetStatus) -> Asset {
        Asset {
            id,
            code: format!("LA{:06}", id),
            name: "Laptop".to_string(),
            category_id: 1,
            location_id: 1,
            specification: None,
            installed_date: date(2023, 1, 9),
            state,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn sample_user(id: i32, deleted: bool) -> User {
        User {
            id,
            staff_code: format!("SD{:04}", id),
            username: format!("user{}", id),
            password_hash: None,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            date_of_birth: Some(date(1990, 5, 20)),
            joined_date: date(2022, 3, 7),
            role_id: 2,
            location_id: 1,
            must_change_password: false,
            is_deleted: deleted,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn sample_assignment(id: i32, asset_id: i32, state: AssignmentStatus) -> Assignment {
        Assignment {
            id,
            asset_id,
            assigned_to_id: 2,
            assigned_by_id: 3,
            assigned_date: date(2024, 6, 3),
            note: None,
            state,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn create_request() -> CreateAssignment {
        CreateAssignment {
            asset_id: 1,
            assigned_to_id: 2,
            assigned_by_id: 3,
            assigned_date: date(2024, 6, 3),
            note: None,
        }
    }

    fn service(
        assignments: MockAssignmentStore,
        assets: MockAssetStore,
        users: MockUserStore,
    ) -> AssignmentsService {
        AssignmentsService::new(Arc::new(assignments), Arc::new(assets), Arc::new(users))
    }

    #[tokio::test]
    async fn create_assigns_available_asset() {
        let mut assignments = MockAssignmentStore::new();
        let mut assets = MockAssetStore::new();
        let mut users = MockUserStore::new();

        assets
            .expect_find_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(sample_asset(id, AssetStatus::Available))));
        users
            .expect_find_by_id()
            .with(eq(2))
            .returning(|id| Ok(Some(sample_user(id, false))));
        users
            .expect_find_by_id()
            .with(eq(3))
            .returning(|id| Ok(Some(sample_user(id, false))));
        assets.expect_exists().with(eq(1)).returning(|_| Ok(true));
        users.expect_exists().with(eq(2)).returning(|_| Ok(true));
        assignments
            .expect_insert()
            .withf(|a| a.state == AssignmentStatus::WaitingForAcceptance && a.asset_id == 1)
            .returning(|a| {
                Ok(Some(sample_assignment(10, a.asset_id, a.state)))
            });
        assets
            .expect_set_state()
            .with(eq(1), eq(AssetStatus::Assigned))
            .returning(|_, _| Ok(1));

        let created = service(assignments, assets, users)
            .create(create_request())
            .await
            .unwrap();

        assert_eq!(created.state, AssignmentStatus::WaitingForAcceptance);
        assert_eq!(created.asset_id, 1);
    }

    #[tokio::test]
    async fn create_rejects_asset_not_available() {
        // Second create against the same asset sees it already Assigned
        for state in [
            AssetStatus::NotAvailable,
            AssetStatus::Assigned,
            AssetStatus::WaitingForRecycling,
            AssetStatus::Recycled,
        ] {
            let assignments = MockAssignmentStore::new();
            let mut assets = MockAssetStore::new();
            let users = MockUserStore::new();

            assets
                .expect_find_by_id()
                .with(eq(1))
                .returning(move |id| Ok(Some(sample_asset(id, state))));

            let err = service(assignments, assets, users)
                .create(create_request())
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::AssetUnavailable(_)));
        }
    }

    #[tokio::test]
    async fn create_rejects_missing_asset() {
        let assignments = MockAssignmentStore::new();
        let mut assets = MockAssetStore::new();
        let users = MockUserStore::new();

        assets.expect_find_by_id().returning(|_| Ok(None));

        let err = service(assignments, assets, users)
            .create(create_request())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AssetUnavailable(_)));
    }

    #[tokio::test]
    async fn create_rejects_disabled_assignee() {
        let assignments = MockAssignmentStore::new();
        let mut assets = MockAssetStore::new();
        let mut users = MockUserStore::new();

        assets
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_asset(id, AssetStatus::Available))));
        users
            .expect_find_by_id()
            .with(eq(2))
            .returning(|id| Ok(Some(sample_user(id, true))));

        let err = service(assignments, assets, users)
            .create(create_request())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserDisabled(_)));
    }

    #[tokio::test]
    async fn create_fails_when_asset_vanishes_before_insert() {
        let assignments = MockAssignmentStore::new();
        let mut assets = MockAssetStore::new();
        let mut users = MockUserStore::new();

        assets
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_asset(id, AssetStatus::Available))));
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id, false))));
        assets.expect_exists().returning(|_| Ok(false));

        let err = service(assignments, assets, users)
            .create(create_request())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_surfaces_failed_asset_flip_after_insert() {
        let mut assignments = MockAssignmentStore::new();
        let mut assets = MockAssetStore::new();
        let mut users = MockUserStore::new();

        assets
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_asset(id, AssetStatus::Available))));
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id, false))));
        assets.expect_exists().returning(|_| Ok(true));
        users.expect_exists().returning(|_| Ok(true));
        assignments
            .expect_insert()
            .returning(|a| Ok(Some(sample_assignment(10, a.asset_id, a.state))));
        assets.expect_set_state().returning(|_, _| Ok(0));

        let err = service(assignments, assets, users)
            .create(create_request())
            .await
            .unwrap_err();
        match err {
            AppError::PersistenceFailure(step) => {
                assert_eq!(step, "assignment created but asset status update failed");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn respond_accept_marks_accepted() {
        let mut assignments = MockAssignmentStore::new();
        let mut assets = MockAssetStore::new();
        let users = MockUserStore::new();

        assignments
            .expect_find_by_id()
            .with(eq(10))
            .returning(|id| {
                Ok(Some(sample_assignment(
                    id,
                    1,
                    AssignmentStatus::WaitingForAcceptance,
                )))
            });
        assets
            .expect_find_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(sample_asset(id, AssetStatus::Assigned))));
        assignments
            .expect_set_state()
            .with(eq(10), eq(AssignmentStatus::Accepted))
            .returning(|_, _| Ok(1));

        let updated = service(assignments, assets, users)
            .respond(10, 2, "true")
            .await
            .unwrap();
        assert_eq!(updated.state, AssignmentStatus::Accepted);
    }

    #[tokio::test]
    async fn respond_rejects_other_users() {
        let mut assignments = MockAssignmentStore::new();
        let assets = MockAssetStore::new();
        let users = MockUserStore::new();

        assignments.expect_find_by_id().returning(|id| {
            Ok(Some(sample_assignment(
                id,
                1,
                AssignmentStatus::WaitingForAcceptance,
            )))
        });

        let err = service(assignments, assets, users)
            .respond(10, 99, "true")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotYourAssignment(_)));
    }

    #[tokio::test]
    async fn respond_requires_assigned_asset() {
        let mut assignments = MockAssignmentStore::new();
        let mut assets = MockAssetStore::new();
        let users = MockUserStore::new();

        assignments.expect_find_by_id().returning(|id| {
            Ok(Some(sample_assignment(
                id,
                1,
                AssignmentStatus::WaitingForAcceptance,
            )))
        });
        assets
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_asset(id, AssetStatus::Available))));

        let err = service(assignments, assets, users)
            .respond(10, 2, "true")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AssetNotAssigned(_)));
    }

    #[tokio::test]
    async fn respond_decline_releases_asset() {
        let mut assignments = MockAssignmentStore::new();
        let mut assets = MockAssetStore::new();
        let users = MockUserStore::new();

        assignments.expect_find_by_id().returning(|id| {
            Ok(Some(sample_assignment(
                id,
                1,
                AssignmentStatus::WaitingForAcceptance,
            )))
        });
        assets
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_asset(id, AssetStatus::Assigned))));
        assignments
            .expect_set_state()
            .with(eq(10), eq(AssignmentStatus::Declined))
            .returning(|_, _| Ok(1));
        assets
            .expect_set_state()
            .with(eq(1), eq(AssetStatus::Available))
            .returning(|_, _| Ok(1));

        let updated = service(assignments, assets, users)
            .respond(10, 2, "false")
            .await
            .unwrap();
        assert_eq!(updated.state, AssignmentStatus::Declined);
    }

    #[tokio::test]
    async fn respond_rejects_malformed_flag() {
        let assignments = MockAssignmentStore::new();
        let assets = MockAssetStore::new();
        let users = MockUserStore::new();

        let err = service(assignments, assets, users)
            .respond(10, 2, "maybe")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_refuses_accepted_assignment() {
        let mut assignments = MockAssignmentStore::new();
        let assets = MockAssetStore::new();
        let users = MockUserStore::new();

        assignments
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_assignment(id, 1, AssignmentStatus::Accepted))));

        let err = service(assignments, assets, users)
            .delete(10)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CannotDeleteAccepted(_)));
    }

    #[tokio::test]
    async fn delete_retires_waiting_assignment() {
        let mut assignments = MockAssignmentStore::new();
        let assets = MockAssetStore::new();
        let users = MockUserStore::new();

        assignments.expect_find_by_id().returning(|id| {
            Ok(Some(sample_assignment(
                id,
                1,
                AssignmentStatus::WaitingForAcceptance,
            )))
        });
        assignments
            .expect_retire()
            .with(eq(10), eq(1))
            .returning(|_, _| Ok(1));

        let deleted = service(assignments, assets, users).delete(10).await.unwrap();
        assert!(deleted);
    }

    #[tokio::test]
    async fn delete_missing_assignment_is_not_an_error() {
        let mut assignments = MockAssignmentStore::new();
        let assets = MockAssetStore::new();
        let users = MockUserStore::new();

        assignments.expect_find_by_id().returning(|_| Ok(None));

        let deleted = service(assignments, assets, users).delete(10).await.unwrap();
        assert!(!deleted);
    }

    #[tokio::test]
    async fn update_swaps_assets_with_sequential_commits() {
        let mut assignments = MockAssignmentStore::new();
        let mut assets = MockAssetStore::new();
        let users = MockUserStore::new();

        assignments.expect_find_by_id().returning(|id| {
            Ok(Some(sample_assignment(
                id,
                1,
                AssignmentStatus::WaitingForAcceptance,
            )))
        });
        assets
            .expect_find_by_id()
            .with(eq(5))
            .returning(|id| Ok(Some(sample_asset(id, AssetStatus::Available))));
        assignments
            .expect_update()
            .withf(|a| a.asset_id == 5)
            .returning(|_| Ok(1));
        assets
            .expect_set_state()
            .with(eq(1), eq(AssetStatus::Available))
            .returning(|_, _| Ok(1));
        assets
            .expect_set_state()
            .with(eq(5), eq(AssetStatus::Assigned))
            .returning(|_, _| Ok(1));

        let req = UpdateAssignment {
            asset_id: Some(5),
            ..Default::default()
        };
        let updated = service(assignments, assets, users)
            .update(10, req)
            .await
            .unwrap();
        assert_eq!(updated.asset_id, 5);
    }

    #[tokio::test]
    async fn update_rejects_unavailable_replacement_asset() {
        let mut assignments = MockAssignmentStore::new();
        let mut assets = MockAssetStore::new();
        let users = MockUserStore::new();

        assignments.expect_find_by_id().returning(|id| {
            Ok(Some(sample_assignment(
                id,
                1,
                AssignmentStatus::WaitingForAcceptance,
            )))
        });
        assets
            .expect_find_by_id()
            .with(eq(5))
            .returning(|id| Ok(Some(sample_asset(id, AssetStatus::Assigned))));

        let req = UpdateAssignment {
            asset_id: Some(5),
            ..Default::default()
        };
        let err = service(assignments, assets, users)
            .update(10, req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AssetUnavailable(_)));
    }

    #[tokio::test]
    async fn update_ignores_out_of_range_status_override() {
        let mut assignments = MockAssignmentStore::new();
        let assets = MockAssetStore::new();
        let users = MockUserStore::new();

        assignments.expect_find_by_id().returning(|id| {
            Ok(Some(sample_assignment(
                id,
                1,
                AssignmentStatus::WaitingForAcceptance,
            )))
        });
        assignments
            .expect_update()
            .withf(|a| a.state == AssignmentStatus::WaitingForAcceptance)
            .returning(|_| Ok(1));

        let req = UpdateAssignment {
            state: Some(99),
            ..Default::default()
        };
        let updated = service(assignments, assets, users)
            .update(10, req)
            .await
            .unwrap();
        assert_eq!(updated.state, AssignmentStatus::WaitingForAcceptance);
    }

    #[tokio::test]
    async fn update_surfaces_failed_release_step_by_name() {
        let mut assignments = MockAssignmentStore::new();
        let mut assets = MockAssetStore::new();
        let users = MockUserStore::new();

        assignments.expect_find_by_id().returning(|id| {
            Ok(Some(sample_assignment(
                id,
                1,
                AssignmentStatus::WaitingForAcceptance,
            )))
        });
        assets
            .expect_find_by_id()
            .with(eq(5))
            .returning(|id| Ok(Some(sample_asset(id, AssetStatus::Available))));
        assignments.expect_update().returning(|_| Ok(1));
        assets
            .expect_set_state()
            .with(eq(1), eq(AssetStatus::Available))
            .returning(|_, _| Ok(0));

        let req = UpdateAssignment {
            asset_id: Some(5),
            ..Default::default()
        };
        let err = service(assignments, assets, users)
            .update(10, req)
            .await
            .unwrap_err();
        match err {
            AppError::PersistenceFailure(step) => {
                assert_eq!(step, "assignment updated but previous asset release failed");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn accepted_flag_parsing() {
        assert!(parse_accepted_flag("true").unwrap());
        assert!(parse_accepted_flag(" TRUE ").unwrap());
        assert!(!parse_accepted_flag("false").unwrap());
        assert!(parse_accepted_flag("1").is_err());
    }
}
