//! Assignments repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        assignment::{
            Assignment, AssignmentDetails, AssignmentListRow, AssignmentQuery, AssignmentRow,
            NewAssignment,
        },
        enums::{AssetStatus, AssignmentStatus},
    },
    query::{self, Page},
};

/// Store operations the assignment workflows depend on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Find a non-deleted assignment by id
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Assignment>>;

    /// Detail view with asset and user names joined in
    async fn get_details(&self, id: i32) -> AppResult<Option<AssignmentDetails>>;

    /// Paged listing; `(items, total)` with total over the filtered set
    async fn list(&self, q: &AssignmentQuery) -> AppResult<Page<AssignmentDetails>>;

    /// Insert; `None` when the write committed zero rows
    async fn insert(&self, assignment: &NewAssignment) -> AppResult<Option<Assignment>>;

    /// Full-row update; returns affected row count
    async fn update(&self, assignment: &Assignment) -> AppResult<u64>;

    /// Flip only the lifecycle state; returns affected row count
    async fn set_state(&self, id: i32, state: AssignmentStatus) -> AppResult<u64>;

    /// Soft-delete the assignment and release its asset, one commit;
    /// returns affected row count for the assignment row
    async fn retire(&self, assignment_id: i32, asset_id: i32) -> AppResult<u64>;

    /// Non-deleted assignments holding the user (waiting or accepted)
    async fn count_active_for_user(&self, user_id: i32) -> AppResult<i64>;

    /// Non-deleted assignments referencing the asset, any state
    async fn count_for_asset(&self, asset_id: i32) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct AssignmentsRepository {
    pool: Pool<Postgres>,
}

impl AssignmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const DETAILS_SELECT: &str = r#"
    SELECT asg.id, asg.asset_id, a.code as asset_code, a.name as asset_name,
           asg.assigned_to_id, u.username as assigned_to,
           asg.assigned_by_id, ub.username as assigned_by,
           asg.assigned_date, asg.note, asg.state
    FROM assignments asg
    JOIN assets a ON asg.asset_id = a.id
    JOIN users u ON asg.assigned_to_id = u.id
    JOIN users ub ON asg.assigned_by_id = ub.id
"#;

#[async_trait]
impl AssignmentStore for AssignmentsRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Assignment>> {
        let row = sqlx::query_as::<_, AssignmentRow>(
            "SELECT * FROM assignments WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Assignment::from))
    }

    async fn get_details(&self, id: i32) -> AppResult<Option<AssignmentDetails>> {
        let sql = format!("{} WHERE asg.id = $1 AND asg.is_deleted = FALSE", DETAILS_SELECT);
        let row = sqlx::query_as::<_, AssignmentListRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(AssignmentDetails::from))
    }

    async fn list(&self, q: &AssignmentQuery) -> AppResult<Page<AssignmentDetails>> {
        let sel = query::compose_assignments(q)?;
        let from = r#"FROM assignments asg
            JOIN assets a ON asg.asset_id = a.id
            JOIN users u ON asg.assigned_to_id = u.id
            JOIN users ub ON asg.assigned_by_id = ub.id"#;

        let count_sql = format!("SELECT COUNT(*) {} {}", from, sel.where_sql());
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for bind in sel.binds() {
            count_query = count_query.bind(bind);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let select_sql = format!(
            r#"
            SELECT asg.id, asg.asset_id, a.code as asset_code, a.name as asset_name,
                   asg.assigned_to_id, u.username as assigned_to,
                   asg.assigned_by_id, ub.username as assigned_by,
                   asg.assigned_date, asg.note, asg.state
            {} {} {}
            LIMIT {} OFFSET {}
            "#,
            from,
            sel.where_sql(),
            sel.order_sql(),
            sel.limit(),
            sel.offset()
        );
        let mut select_query = sqlx::query_as::<_, AssignmentListRow>(&select_sql);
        for bind in sel.binds() {
            select_query = select_query.bind(bind);
        }
        let rows = select_query.fetch_all(&self.pool).await?;

        Ok(Page {
            items: rows.into_iter().map(AssignmentDetails::from).collect(),
            total,
        })
    }

    async fn insert(&self, assignment: &NewAssignment) -> AppResult<Option<Assignment>> {
        let row = sqlx::query_as::<_, AssignmentRow>(
            r#"
            INSERT INTO assignments (asset_id, assigned_to_id, assigned_by_id,
                                     assigned_date, note, state, is_deleted, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, NOW())
            RETURNING *
            "#,
        )
        .bind(assignment.asset_id)
        .bind(assignment.assigned_to_id)
        .bind(assignment.assigned_by_id)
        .bind(assignment.assigned_date)
        .bind(&assignment.note)
        .bind(i16::from(assignment.state))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Assignment::from))
    }

    async fn update(&self, assignment: &Assignment) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE assignments
            SET asset_id = $1, assigned_to_id = $2, assigned_by_id = $3,
                assigned_date = $4, note = $5, state = $6, updated_at = NOW()
            WHERE id = $7 AND is_deleted = FALSE
            "#,
        )
        .bind(assignment.asset_id)
        .bind(assignment.assigned_to_id)
        .bind(assignment.assigned_by_id)
        .bind(assignment.assigned_date)
        .bind(&assignment.note)
        .bind(i16::from(assignment.state))
        .bind(assignment.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn set_state(&self, id: i32, state: AssignmentStatus) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE assignments SET state = $1, updated_at = NOW() WHERE id = $2 AND is_deleted = FALSE",
        )
        .bind(i16::from(state))
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn retire(&self, assignment_id: i32, asset_id: i32) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE assignments SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(assignment_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE assets SET state = $1, updated_at = NOW() WHERE id = $2")
            .bind(i16::from(AssetStatus::Available))
            .bind(asset_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }

    async fn count_active_for_user(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM assignments
            WHERE assigned_to_id = $1 AND is_deleted = FALSE AND state IN ($2, $3)
            "#,
        )
        .bind(user_id)
        .bind(i16::from(AssignmentStatus::WaitingForAcceptance))
        .bind(i16::from(AssignmentStatus::Accepted))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_for_asset(&self, asset_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assignments WHERE asset_id = $1 AND is_deleted = FALSE",
        )
        .bind(asset_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
