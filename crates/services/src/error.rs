//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::{CourseError, FeedbackError};
use storage::sqlite::SqliteInitError;

/// Errors emitted by the remote document store client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteStoreError {
    #[error("remote document store is not configured")]
    Disabled,
    #[error("remote document store returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `CourseService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourseServiceError {
    #[error("operation requires admin permission")]
    NotAuthorized,
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Remote(#[from] RemoteStoreError),
}

/// Errors emitted by `FeedbackService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedbackServiceError {
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
    #[error(transparent)]
    Remote(#[from] RemoteStoreError),
}

/// Errors emitted by `MonitoringService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MonitoringError {
    #[error("operation requires admin permission")]
    NotAuthorized,
    #[error(transparent)]
    Remote(#[from] RemoteStoreError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
