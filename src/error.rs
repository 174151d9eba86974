//! Error types for Stockroom server

use thiserror::Error;

/// Stable numeric error codes surfaced to API consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    DbFailure = 2,
    NoSuchEntity = 3,
    AssetUnavailable = 4,
    AssetNotAssigned = 5,
    UserDisabled = 6,
    NotYourAssignment = 7,
    CannotDeleteAccepted = 8,
    CannotCancelCompleted = 9,
    AssignmentNotEligible = 10,
    AssetHasAssignments = 11,
    BadFilterValue = 12,
    BadState = 13,
    WriteFailed = 14,
    BadValue = 15,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Asset unavailable: {0}")]
    AssetUnavailable(String),

    #[error("Asset not assigned: {0}")]
    AssetNotAssigned(String),

    #[error("User disabled: {0}")]
    UserDisabled(String),

    #[error("Assignment belongs to another user: {0}")]
    NotYourAssignment(String),

    #[error("Accepted assignments cannot be deleted: {0}")]
    CannotDeleteAccepted(String),

    #[error("Completed return requests cannot be cancelled: {0}")]
    CannotCancelCompleted(String),

    #[error("Assignment not eligible for returning: {0}")]
    AssignmentNotEligible(String),

    #[error("Asset has assignment history: {0}")]
    AssetHasAssignments(String),

    #[error("Invalid filter value: {0}")]
    InvalidFilterValue(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// A required write committed zero rows. The message names the failed
    /// step; earlier steps of the same operation stay committed (see the
    /// workflow services for the step sequencing).
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Numeric code for this error kind
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound(_) => ErrorCode::NoSuchEntity,
            AppError::AssetUnavailable(_) => ErrorCode::AssetUnavailable,
            AppError::AssetNotAssigned(_) => ErrorCode::AssetNotAssigned,
            AppError::UserDisabled(_) => ErrorCode::UserDisabled,
            AppError::NotYourAssignment(_) => ErrorCode::NotYourAssignment,
            AppError::CannotDeleteAccepted(_) => ErrorCode::CannotDeleteAccepted,
            AppError::CannotCancelCompleted(_) => ErrorCode::CannotCancelCompleted,
            AppError::AssignmentNotEligible(_) => ErrorCode::AssignmentNotEligible,
            AppError::AssetHasAssignments(_) => ErrorCode::AssetHasAssignments,
            AppError::InvalidFilterValue(_) => ErrorCode::BadFilterValue,
            AppError::InvalidStatus(_) => ErrorCode::BadState,
            AppError::PersistenceFailure(_) => ErrorCode::WriteFailed,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
