//! Business logic services

pub mod assets;
pub mod assignments;
pub mod returns;
pub mod tokens;
pub mod users;

use std::sync::Arc;

use crate::repository::{
    AssetStore, AssignmentStore, CategoryStore, LocationStore, Repository, ReturnRequestStore,
    UserStore,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub assets: assets::AssetsService,
    pub assignments: assignments::AssignmentsService,
    pub returns: returns::ReturnsService,
    pub users: users::UsersService,
    pub tokens: tokens::TokenService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, token_service: tokens::TokenService) -> Self {
        let assets: Arc<dyn AssetStore> = Arc::new(repository.assets.clone());
        let assignments: Arc<dyn AssignmentStore> = Arc::new(repository.assignments.clone());
        let returns: Arc<dyn ReturnRequestStore> = Arc::new(repository.return_requests.clone());
        let users: Arc<dyn UserStore> = Arc::new(repository.users.clone());
        let categories: Arc<dyn CategoryStore> = Arc::new(repository.categories.clone());
        let locations: Arc<dyn LocationStore> = Arc::new(repository.locations.clone());

        Self {
            assets: assets::AssetsService::new(
                assets.clone(),
                assignments.clone(),
                categories,
                locations.clone(),
            ),
            assignments: assignments::AssignmentsService::new(
                assignments.clone(),
                assets.clone(),
                users.clone(),
            ),
            returns: returns::ReturnsService::new(returns, assignments.clone(), assets),
            users: users::UsersService::new(
                users,
                assignments,
                locations,
                Arc::new(token_service.clone()),
            ),
            tokens: token_service,
        }
    }
}
