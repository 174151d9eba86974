//! Stockroom Asset Management System
//!
//! The domain core of the Stockroom server: asset, assignment and
//! return-request workflows, the query composition behind every listing,
//! and the persistence and token-revocation gateways they depend on. The
//! HTTP surface lives in a separate crate and consumes [`AppState`].

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod repository;
pub mod services;
pub mod telemetry;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
