//! Repository layer for database operations

pub mod assets;
pub mod assignments;
pub mod categories;
pub mod locations;
pub mod return_requests;
pub mod users;

use sqlx::{Pool, Postgres};

pub use assets::AssetStore;
pub use assignments::AssignmentStore;
pub use categories::CategoryStore;
pub use locations::LocationStore;
pub use return_requests::ReturnRequestStore;
pub use users::UserStore;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub assets: assets::AssetsRepository,
    pub assignments: assignments::AssignmentsRepository,
    pub return_requests: return_requests::ReturnRequestsRepository,
    pub users: users::UsersRepository,
    pub categories: categories::CategoriesRepository,
    pub locations: locations::LocationsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            assets: assets::AssetsRepository::new(pool.clone()),
            assignments: assignments::AssignmentsRepository::new(pool.clone()),
            return_requests: return_requests::ReturnRequestsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            categories: categories::CategoriesRepository::new(pool.clone()),
            locations: locations::LocationsRepository::new(pool.clone()),
            pool,
        }
    }
}
