//! Users repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::user::{NewUser, Role, User, UserQuery, UserRow},
    query::{self, Page},
};

/// Store operations the user workflows depend on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find by id, soft-deleted rows included (callers inspect the flag)
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// True when a non-deleted user with this id exists
    async fn exists(&self, id: i32) -> AppResult<bool>;

    /// Paged listing; `(items, total)` with total over the filtered set
    async fn list(&self, q: &UserQuery) -> AppResult<Page<User>>;

    /// Highest generated staff code, if any
    async fn last_staff_code(&self) -> AppResult<Option<String>>;

    /// Every username starting with this prefix, soft-deleted rows included
    async fn usernames_starting_with(&self, prefix: &str) -> AppResult<Vec<String>>;

    /// Insert; `None` when the write committed zero rows
    async fn insert(&self, user: &NewUser) -> AppResult<Option<User>>;

    /// Soft delete; returns affected row count
    async fn soft_delete(&self, id: i32) -> AppResult<u64>;

    /// True when the role exists
    async fn role_exists(&self, role_id: i32) -> AppResult<bool>;

    /// All roles, for reference listings
    async fn get_roles(&self) -> AppResult<Vec<Role>>;
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UsersRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND is_deleted = FALSE)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list(&self, q: &UserQuery) -> AppResult<Page<User>> {
        let sel = query::compose_users(q)?;
        let from = "FROM users u JOIN roles r ON u.role_id = r.id";

        let count_sql = format!("SELECT COUNT(*) {} {}", from, sel.where_sql());
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for bind in sel.binds() {
            count_query = count_query.bind(bind);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let select_sql = format!(
            "SELECT u.* {} {} {} LIMIT {} OFFSET {}",
            from,
            sel.where_sql(),
            sel.order_sql(),
            sel.limit(),
            sel.offset()
        );
        let mut select_query = sqlx::query_as::<_, UserRow>(&select_sql);
        for bind in sel.binds() {
            select_query = select_query.bind(bind);
        }
        let rows = select_query.fetch_all(&self.pool).await?;

        Ok(Page {
            items: rows.into_iter().map(User::from).collect(),
            total,
        })
    }

    async fn last_staff_code(&self) -> AppResult<Option<String>> {
        let code: Option<String> =
            sqlx::query_scalar("SELECT staff_code FROM users ORDER BY staff_code DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(code)
    }

    async fn usernames_starting_with(&self, prefix: &str) -> AppResult<Vec<String>> {
        let usernames: Vec<String> =
            sqlx::query_scalar("SELECT username FROM users WHERE username LIKE $1")
                .bind(format!("{}%", prefix))
                .fetch_all(&self.pool)
                .await?;

        Ok(usernames)
    }

    async fn insert(&self, user: &NewUser) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (staff_code, username, password_hash, first_name, last_name,
                               date_of_birth, joined_date, role_id, location_id,
                               must_change_password, is_deleted, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, FALSE, NOW())
            RETURNING *
            "#,
        )
        .bind(&user.staff_code)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.date_of_birth)
        .bind(user.joined_date)
        .bind(user.role_id)
        .bind(user.location_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn soft_delete(&self, id: i32) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn role_exists(&self, role_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM roles WHERE id = $1)")
            .bind(role_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn get_roles(&self) -> AppResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>("SELECT id, name FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(roles)
    }
}
