use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use course_core::model::{CourseId, CourseProgress, CurrentUser, UserId};

use crate::error::RemoteStoreError;
use crate::remote::{DocumentStore, USER_PROGRESS};

/// Wire form of one progress upsert, field names matching the deployed store.
///
/// `feedbackGiven` is written by the feedback path and deliberately absent
/// here, so the field-level merge leaves it untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub user_id: String,
    pub course_id: String,
    pub course_name: String,
    pub completed_lessons: usize,
    pub total_lessons: usize,
    pub progress_percentage: f64,
    pub user_name: String,
    pub user_email: String,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn new(user: &CurrentUser, progress: &CourseProgress) -> Self {
        Self {
            user_id: user.id().to_string(),
            course_id: progress.course_id().to_string(),
            course_name: progress.course_name().to_owned(),
            completed_lessons: progress.completed_count(),
            total_lessons: progress.total_lessons(),
            progress_percentage: progress.progress_percentage(),
            user_name: user.display_name().to_owned(),
            user_email: user.contact_email().to_owned(),
        }
    }
}

/// Store key for a progress document: one per user per course.
///
/// The composite key is load-bearing; keying by user alone would overwrite
/// progress across courses.
#[must_use]
pub fn progress_document_key(user_id: &UserId, course_id: &CourseId) -> String {
    format!("{user_id}_{course_id}")
}

/// Push contract for progress snapshots.
///
/// Callers never await completion through this trait in the viewing path;
/// the tracker detaches the call and logs failures.
#[async_trait]
pub trait ProgressSync: Send + Sync {
    /// Merge the snapshot onto the user's progress document.
    ///
    /// # Errors
    ///
    /// Returns `RemoteStoreError` if the upsert fails.
    async fn sync_progress(&self, snapshot: &ProgressSnapshot) -> Result<(), RemoteStoreError>;
}

/// Syncs snapshots into the hosted store's `userProgress` collection.
#[derive(Clone)]
pub struct RemoteProgressSync {
    store: Arc<DocumentStore>,
}

impl RemoteProgressSync {
    #[must_use]
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProgressSync for RemoteProgressSync {
    async fn sync_progress(&self, snapshot: &ProgressSnapshot) -> Result<(), RemoteStoreError> {
        let key = format!("{}_{}", snapshot.user_id, snapshot.course_id);
        self.store.upsert_merge(USER_PROGRESS, &key, snapshot).await
    }
}
