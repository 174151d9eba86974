//! Asset management service.
//!
//! Creation generates the asset code from the category prefix; updates are
//! refused while the asset is held by an assignment; deletion is refused for
//! assets with any assignment history, so reporting keeps its audit trail.

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        asset::{Asset, AssetDetails, AssetQuery, CreateAsset, NewAsset, UpdateAsset},
        category::Category,
        enums::AssetStatus,
        location::Location,
    },
    query::Page,
    repository::{AssetStore, AssignmentStore, CategoryStore, LocationStore},
};

/// Width of the numeric tail of generated asset codes
const CODE_WIDTH: usize = 6;

/// Next code for a category prefix, continuing from the highest issued one
fn next_asset_code(prefix: &str, last_code: Option<&str>) -> String {
    let next = last_code
        .and_then(|code| code.strip_prefix(prefix))
        .and_then(|tail| tail.parse::<u32>().ok())
        .map_or(1, |n| n + 1);
    format!("{}{:0width$}", prefix, next, width = CODE_WIDTH)
}

#[derive(Clone)]
pub struct AssetsService {
    assets: Arc<dyn AssetStore>,
    assignments: Arc<dyn AssignmentStore>,
    categories: Arc<dyn CategoryStore>,
    locations: Arc<dyn LocationStore>,
}

impl AssetsService {
    pub fn new(
        assets: Arc<dyn AssetStore>,
        assignments: Arc<dyn AssignmentStore>,
        categories: Arc<dyn CategoryStore>,
        locations: Arc<dyn LocationStore>,
    ) -> Self {
        Self {
            assets,
            assignments,
            categories,
            locations,
        }
    }

    /// Get asset by id
    pub async fn get(&self, id: i32) -> AppResult<Asset> {
        self.assets
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", id)))
    }

    /// List assets with filtering, ordering and pagination
    pub async fn list(&self, query: &AssetQuery) -> AppResult<Page<AssetDetails>> {
        self.assets.list(query).await
    }

    /// All categories, for form population
    pub async fn get_categories(&self) -> AppResult<Vec<Category>> {
        self.categories.list().await
    }

    /// All locations, for form population
    pub async fn get_locations(&self) -> AppResult<Vec<Location>> {
        self.locations.list().await
    }

    /// Create an asset with a generated code
    pub async fn create(&self, req: CreateAsset) -> AppResult<Asset> {
        req.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let category = self
            .categories
            .find_by_id(req.category_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Category with id {} not found", req.category_id))
            })?;

        self.locations
            .find_by_id(req.location_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Location with id {} not found", req.location_id))
            })?;

        // A new asset starts in inventory, never mid-lifecycle.
        let state = match req.state.as_deref() {
            None => AssetStatus::Available,
            Some(raw) => {
                let state: AssetStatus = raw.parse().map_err(AppError::InvalidFilterValue)?;
                if !matches!(state, AssetStatus::Available | AssetStatus::NotAvailable) {
                    return Err(AppError::InvalidFilterValue(format!(
                        "New assets cannot start in state '{}'",
                        state
                    )));
                }
                state
            }
        };

        let last_code = self.assets.last_code_for_prefix(&category.prefix).await?;
        let code = next_asset_code(&category.prefix, last_code.as_deref());

        let new_asset = NewAsset {
            code,
            name: req.name,
            category_id: req.category_id,
            location_id: req.location_id,
            specification: req.specification,
            installed_date: req.installed_date,
            state,
        };

        let created = self
            .assets
            .insert(&new_asset)
            .await?
            .ok_or_else(|| AppError::PersistenceFailure("asset insert".to_string()))?;

        tracing::info!(asset_id = created.id, code = %created.code, "asset created");

        Ok(created)
    }

    /// Update an asset that is not currently held by an assignment
    pub async fn update(&self, id: i32, req: UpdateAsset) -> AppResult<Asset> {
        req.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut asset = self
            .assets
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", id)))?;

        if asset.state == AssetStatus::Assigned {
            return Err(AppError::AssetUnavailable(format!(
                "Asset {} is assigned and cannot be edited",
                asset.code
            )));
        }

        if let Some(name) = req.name {
            asset.name = name;
        }
        if let Some(specification) = req.specification {
            asset.specification = Some(specification);
        }
        if let Some(date) = req.installed_date {
            asset.installed_date = date;
        }
        if let Some(raw) = req.state {
            asset.state = raw.parse().map_err(AppError::InvalidFilterValue)?;
        }

        let rows = self.assets.update(&asset).await?;
        if rows == 0 {
            return Err(AppError::PersistenceFailure("asset update".to_string()));
        }

        Ok(asset)
    }

    /// Soft-delete an asset with no assignment history
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let asset = self
            .assets
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", id)))?;

        let history = self.assignments.count_for_asset(id).await?;
        if history > 0 {
            return Err(AppError::AssetHasAssignments(format!(
                "Asset {} has {} assignment(s) and cannot be deleted",
                asset.code, history
            )));
        }

        let rows = self.assets.soft_delete(id).await?;
        if rows == 0 {
            return Err(AppError::PersistenceFailure("asset delete".to_string()));
        }

        tracing::info!(asset_id = id, code = %asset.code, "asset deleted");

        Ok(())
    }
}
