//! Return requests repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        enums::{AssetStatus, AssignmentStatus, ReturnRequestStatus},
        return_request::{
            NewReturnRequest, ReturnCompletion, ReturnRequest, ReturnRequestDetails,
            ReturnRequestListRow, ReturnRequestQuery, ReturnRequestRow,
        },
    },
    query::{self, Page},
};

/// Store operations the return workflows depend on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReturnRequestStore: Send + Sync {
    /// Find by id, soft-deleted rows included (cancellation is idempotent)
    async fn find_by_id(&self, id: i32) -> AppResult<Option<ReturnRequest>>;

    /// Pending (non-deleted, waiting) request for an assignment, if any
    async fn find_pending_for_assignment(&self, assignment_id: i32)
        -> AppResult<Option<ReturnRequest>>;

    /// Paged listing; `(items, total)` with total over the filtered set
    async fn list(&self, q: &ReturnRequestQuery) -> AppResult<Page<ReturnRequestDetails>>;

    /// Insert; `None` when the write committed zero rows
    async fn insert(&self, request: &NewReturnRequest) -> AppResult<Option<ReturnRequest>>;

    /// Complete the request, its assignment and its asset in one commit;
    /// returns affected row count for the request row
    async fn complete(&self, completion: &ReturnCompletion) -> AppResult<u64>;

    /// Soft delete; zero rows when already deleted
    async fn soft_delete(&self, id: i32) -> AppResult<u64>;
}

#[derive(Clone)]
pub struct ReturnRequestsRepository {
    pool: Pool<Postgres>,
}

impl ReturnRequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReturnRequestStore for ReturnRequestsRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<ReturnRequest>> {
        let row = sqlx::query_as::<_, ReturnRequestRow>(
            "SELECT * FROM return_requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ReturnRequest::from))
    }

    async fn find_pending_for_assignment(
        &self,
        assignment_id: i32,
    ) -> AppResult<Option<ReturnRequest>> {
        let row = sqlx::query_as::<_, ReturnRequestRow>(
            r#"
            SELECT * FROM return_requests
            WHERE assignment_id = $1 AND is_deleted = FALSE AND state = $2
            "#,
        )
        .bind(assignment_id)
        .bind(i16::from(ReturnRequestStatus::WaitingForReturning))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ReturnRequest::from))
    }

    async fn list(&self, q: &ReturnRequestQuery) -> AppResult<Page<ReturnRequestDetails>> {
        let sel = query::compose_return_requests(q)?;
        let from = r#"FROM return_requests rr
            JOIN assignments asg ON rr.assignment_id = asg.id
            JOIN assets a ON asg.asset_id = a.id
            JOIN users u ON rr.requested_by_id = u.id
            LEFT JOIN users acc ON rr.acceptor_id = acc.id"#;

        let count_sql = format!("SELECT COUNT(*) {} {}", from, sel.where_sql());
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for bind in sel.binds() {
            count_query = count_query.bind(bind);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let select_sql = format!(
            r#"
            SELECT rr.id, rr.assignment_id, a.code as asset_code, a.name as asset_name,
                   u.username as requested_by, acc.username as accepted_by,
                   asg.assigned_date, rr.return_date, rr.state
            {} {} {}
            LIMIT {} OFFSET {}
            "#,
            from,
            sel.where_sql(),
            sel.order_sql(),
            sel.limit(),
            sel.offset()
        );
        let mut select_query = sqlx::query_as::<_, ReturnRequestListRow>(&select_sql);
        for bind in sel.binds() {
            select_query = select_query.bind(bind);
        }
        let rows = select_query.fetch_all(&self.pool).await?;

        Ok(Page {
            items: rows.into_iter().map(ReturnRequestDetails::from).collect(),
            total,
        })
    }

    async fn insert(&self, request: &NewReturnRequest) -> AppResult<Option<ReturnRequest>> {
        let row = sqlx::query_as::<_, ReturnRequestRow>(
            r#"
            INSERT INTO return_requests (assignment_id, requested_by_id, return_date,
                                         state, is_deleted, created_at)
            VALUES ($1, $2, $3, $4, FALSE, NOW())
            RETURNING *
            "#,
        )
        .bind(request.assignment_id)
        .bind(request.requested_by_id)
        .bind(request.return_date)
        .bind(i16::from(request.state))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ReturnRequest::from))
    }

    async fn complete(&self, completion: &ReturnCompletion) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE return_requests
            SET state = $1, acceptor_id = $2, return_date = $3, updated_at = NOW()
            WHERE id = $4 AND is_deleted = FALSE
            "#,
        )
        .bind(i16::from(ReturnRequestStatus::Completed))
        .bind(completion.acceptor_id)
        .bind(completion.returned_date)
        .bind(completion.return_request_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE assignments SET state = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(i16::from(AssignmentStatus::Returned))
        .bind(completion.assignment_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE assets SET state = $1, updated_at = NOW() WHERE id = $2")
            .bind(i16::from(AssetStatus::Available))
            .bind(completion.asset_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }

    async fn soft_delete(&self, id: i32) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE return_requests SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
