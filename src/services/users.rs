//! User management service.
//!
//! Creation generates the staff code and username; disabling a user is
//! refused while they still hold an assignment, and otherwise revokes their
//! outstanding tokens along with the soft delete.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Weekday};
use unicode_normalization::UnicodeNormalization;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, NewUser, Role, User, UserQuery},
    query::Page,
    repository::{AssignmentStore, LocationStore, UserStore},
    services::tokens::TokenRevoker,
};

/// Width of the numeric tail of generated staff codes
const STAFF_CODE_WIDTH: usize = 4;
const STAFF_CODE_PREFIX: &str = "SD";

const MINIMUM_AGE_YEARS: i32 = 18;

/// Next staff code, continuing from the highest issued one
fn next_staff_code(last_code: Option<&str>) -> String {
    let next = last_code
        .and_then(|code| code.strip_prefix(STAFF_CODE_PREFIX))
        .and_then(|tail| tail.parse::<u32>().ok())
        .map_or(1, |n| n + 1);
    format!("{}{:0width$}", STAFF_CODE_PREFIX, next, width = STAFF_CODE_WIDTH)
}

/// Fold a name to lowercase ASCII letters, dropping diacritics
fn ascii_fold(name: &str) -> String {
    name.nfd()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Username base: folded first name plus the initial of each last-name word
fn username_base(first_name: &str, last_name: &str) -> String {
    let mut base = ascii_fold(first_name);
    for word in last_name.split_whitespace() {
        let folded = ascii_fold(word);
        if let Some(initial) = folded.chars().next() {
            base.push(initial);
        }
    }
    base
}

/// Disambiguate against taken usernames: the base itself, then the base with
/// the smallest free numeric suffix.
fn resolve_username(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|u| u == base) {
        return base.to_string();
    }
    let mut suffix = 1u32;
    loop {
        let candidate = format!("{}{}", base, suffix);
        if !taken.iter().any(|u| u == &candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn age_on(date: NaiveDate, birth: NaiveDate) -> i32 {
    let mut age = date.year() - birth.year();
    if (date.month(), date.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

#[derive(Clone)]
pub struct UsersService {
    users: Arc<dyn UserStore>,
    assignments: Arc<dyn AssignmentStore>,
    locations: Arc<dyn LocationStore>,
    tokens: Arc<dyn TokenRevoker>,
}

impl UsersService {
    pub fn new(
        users: Arc<dyn UserStore>,
        assignments: Arc<dyn AssignmentStore>,
        locations: Arc<dyn LocationStore>,
        tokens: Arc<dyn TokenRevoker>,
    ) -> Self {
        Self {
            users,
            assignments,
            locations,
            tokens,
        }
    }

    /// Get user by id
    pub async fn get(&self, id: i32) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// List users with filtering, ordering and pagination
    pub async fn list(&self, query: &UserQuery) -> AppResult<Page<User>> {
        self.users.list(query).await
    }

    /// All roles, for form population
    pub async fn get_roles(&self) -> AppResult<Vec<Role>> {
        self.users.get_roles().await
    }

    /// Create a user with generated staff code and username
    pub async fn create(&self, req: CreateUser) -> AppResult<User> {
        req.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(birth) = req.date_of_birth {
            if age_on(req.joined_date, birth) < MINIMUM_AGE_YEARS {
                return Err(AppError::Validation(
                    "User is under 18. Please select a different date".to_string(),
                ));
            }
        }
        if matches!(req.joined_date.weekday(), Weekday::Sat | Weekday::Sun) {
            return Err(AppError::Validation(
                "Joined date is Saturday or Sunday. Please select a different date".to_string(),
            ));
        }

        if !self.users.role_exists(req.role_id).await? {
            return Err(AppError::NotFound(format!(
                "Role with id {} not found",
                req.role_id
            )));
        }
        self.locations
            .find_by_id(req.location_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Location with id {} not found", req.location_id))
            })?;

        let last_code = self.users.last_staff_code().await?;
        let staff_code = next_staff_code(last_code.as_deref());

        let base = username_base(&req.first_name, &req.last_name);
        let taken = self.users.usernames_starting_with(&base).await?;
        let username = resolve_username(&base, &taken);

        let new_user = NewUser {
            staff_code,
            username,
            password_hash: req.password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            date_of_birth: req.date_of_birth,
            joined_date: req.joined_date,
            role_id: req.role_id,
            location_id: req.location_id,
        };

        let created = self
            .users
            .insert(&new_user)
            .await?
            .ok_or_else(|| AppError::PersistenceFailure("user insert".to_string()))?;

        tracing::info!(
            user_id = created.id,
            staff_code = %created.staff_code,
            username = %created.username,
            "user created"
        );

        Ok(created)
    }

    /// Disable a user who holds no assignment.
    ///
    /// Returns `false` without mutating anything while the user still has a
    /// waiting or accepted assignment; otherwise revokes their tokens,
    /// soft-deletes the account and reports whether a row was affected.
    pub async fn disable(&self, id: i32) -> AppResult<bool> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

        let active = self.assignments.count_active_for_user(id).await?;
        if active > 0 {
            tracing::debug!(
                user_id = id,
                active_assignments = active,
                "disable refused, user still holds assignments"
            );
            return Ok(false);
        }

        self.tokens.revoke_all(id).await?;
        let rows = self.users.soft_delete(id).await?;

        tracing::info!(user_id = id, username = %user.username, "user disabled");

        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockall::predicate::eq;

    use crate::models::location::Location;
    use crate::repository::assignments::MockAssignmentStore;
    use crate::repository::locations::MockLocationStore;
    use crate::repository::users::MockUserStore;
    use crate::services::tokens::MockTokenRevoker;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_user(id: i32, deleted: bool) -> User {
        User {
            id,
            staff_code: format!("SD{:04}", id),
            username: format!("user{}", id),
            password_hash: None,
            first_name: "Binh".to_string(),
            last_name: "Nguyen Van".to_string(),
            date_of_birth: Some(date(1995, 2, 14)),
            joined_date: date(2022, 3, 7),
            role_id: 2,
            location_id: 1,
            must_change_password: true,
            is_deleted: deleted,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn create_request() -> CreateUser {
        CreateUser {
            first_name: "Bình".to_string(),
            last_name: "Nguyễn Văn".to_string(),
            date_of_birth: Some(date(1995, 2, 14)),
            // a Monday
            joined_date: date(2024, 6, 3),
            role_id: 2,
            location_id: 1,
            password_hash: None,
        }
    }

    fn service(
        users: MockUserStore,
        assignments: MockAssignmentStore,
        locations: MockLocationStore,
        tokens: MockTokenRevoker,
    ) -> UsersService {
        UsersService::new(
            Arc::new(users),
            Arc::new(assignments),
            Arc::new(locations),
            Arc::new(tokens),
        )
    }

    #[test]
    fn staff_codes_continue_sequence() {
        assert_eq!(next_staff_code(None), "SD0001");
        assert_eq!(next_staff_code(Some("SD0041")), "SD0042");
        assert_eq!(next_staff_code(Some("SD9999")), "SD10000");
    }

    #[test]
    fn username_base_folds_diacritics_and_initials() {
        assert_eq!(username_base("Bình", "Nguyễn Văn"), "binhnv");
        assert_eq!(username_base("An", "Le"), "anl");
        assert_eq!(username_base("Mai-Lan", "Trần"), "mailant");
    }

    #[test]
    fn username_collisions_get_numeric_suffixes() {
        assert_eq!(resolve_username("binhnv", &[]), "binhnv");
        assert_eq!(
            resolve_username("binhnv", &["binhnv".to_string()]),
            "binhnv1"
        );
        assert_eq!(
            resolve_username(
                "binhnv",
                &["binhnv".to_string(), "binhnv1".to_string(), "binhnv2".to_string()]
            ),
            "binhnv3"
        );
    }

    #[test]
    fn age_is_computed_against_joined_date() {
        assert_eq!(age_on(date(2024, 6, 3), date(2006, 6, 3)), 18);
        assert_eq!(age_on(date(2024, 6, 3), date(2006, 6, 4)), 17);
    }

    #[tokio::test]
    async fn create_generates_codes_and_username() {
        let mut users = MockUserStore::new();
        let assignments = MockAssignmentStore::new();
        let mut locations = MockLocationStore::new();
        let tokens = MockTokenRevoker::new();

        users.expect_role_exists().with(eq(2)).returning(|_| Ok(true));
        locations.expect_find_by_id().with(eq(1)).returning(|_| {
            Ok(Some(Location {
                id: 1,
                name: "Hanoi".to_string(),
                created_at: Utc::now(),
            }))
        });
        users
            .expect_last_staff_code()
            .returning(|| Ok(Some("SD0041".to_string())));
        users
            .expect_usernames_starting_with()
            .withf(|base| base == "binhnv")
            .returning(|_| Ok(vec!["binhnv".to_string()]));
        users
            .expect_insert()
            .withf(|u| u.staff_code == "SD0042" && u.username == "binhnv1")
            .returning(|u| {
                let mut user = sample_user(9, false);
                user.staff_code = u.staff_code.clone();
                user.username = u.username.clone();
                Ok(Some(user))
            });

        let created = service(users, assignments, locations, tokens)
            .create(create_request())
            .await
            .unwrap();
        assert_eq!(created.staff_code, "SD0042");
        assert_eq!(created.username, "binhnv1");
    }

    #[tokio::test]
    async fn create_rejects_minors_and_weekend_joiners() {
        let mut req = create_request();
        req.date_of_birth = Some(date(2010, 1, 1));
        let err = service(
            MockUserStore::new(),
            MockAssignmentStore::new(),
            MockLocationStore::new(),
            MockTokenRevoker::new(),
        )
        .create(req)
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut req = create_request();
        // a Saturday
        req.joined_date = date(2024, 6, 1);
        let err = service(
            MockUserStore::new(),
            MockAssignmentStore::new(),
            MockLocationStore::new(),
            MockTokenRevoker::new(),
        )
        .create(req)
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn disable_refused_while_user_holds_assignments() {
        let mut users = MockUserStore::new();
        let mut assignments = MockAssignmentStore::new();
        let locations = MockLocationStore::new();
        let tokens = MockTokenRevoker::new();

        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id, false))));
        assignments
            .expect_count_active_for_user()
            .with(eq(9))
            .returning(|_| Ok(1));

        let disabled = service(users, assignments, locations, tokens)
            .disable(9)
            .await
            .unwrap();
        assert!(!disabled);
    }

    #[tokio::test]
    async fn disable_revokes_tokens_and_soft_deletes() {
        let mut users = MockUserStore::new();
        let mut assignments = MockAssignmentStore::new();
        let locations = MockLocationStore::new();
        let mut tokens = MockTokenRevoker::new();

        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id, false))));
        assignments
            .expect_count_active_for_user()
            .returning(|_| Ok(0));
        tokens.expect_revoke_all().with(eq(9)).returning(|_| Ok(2));
        users.expect_soft_delete().with(eq(9)).returning(|_| Ok(1));

        let disabled = service(users, assignments, locations, tokens)
            .disable(9)
            .await
            .unwrap();
        assert!(disabled);
    }

    #[tokio::test]
    async fn disable_missing_user_is_an_error() {
        let mut users = MockUserStore::new();
        let assignments = MockAssignmentStore::new();
        let locations = MockLocationStore::new();
        let tokens = MockTokenRevoker::new();

        users.expect_find_by_id().returning(|_| Ok(None));

        let err = service(users, assignments, locations, tokens)
            .disable(9)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
