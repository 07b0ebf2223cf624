#![forbid(unsafe_code)]

pub mod auth;
pub mod course_service;
pub mod error;
pub mod feedback_service;
pub mod monitoring_service;
pub mod remote;
pub mod sync;
pub mod tracker;

mod app_services;

pub use course_core::Clock;

pub use app_services::AppServices;
pub use auth::UserDirectory;
pub use course_service::CourseService;
pub use error::{
    AppServicesError, CourseServiceError, FeedbackServiceError, MonitoringError, RemoteStoreError,
};
pub use feedback_service::FeedbackService;
pub use monitoring_service::{MonitoringService, ProgressEntry};
pub use remote::{Document, DocumentStore, RemoteStoreConfig};
pub use sync::{ProgressSnapshot, ProgressSync, RemoteProgressSync};
pub use tracker::ProgressTracker;
