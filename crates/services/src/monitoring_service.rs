use std::sync::Arc;

use serde::Deserialize;

use course_core::model::CurrentUser;

use crate::error::MonitoringError;
use crate::remote::{Document, DocumentStore, USER_PROGRESS};
use crate::sync::ProgressSnapshot;

/// One row of the admin monitoring view: the stored snapshot plus the flag
/// the feedback path maintains.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressEntry {
    #[serde(flatten)]
    pub snapshot: ProgressSnapshot,
    #[serde(rename = "feedbackGiven", default)]
    pub feedback_given: Option<bool>,
}

/// Admin-only view over every user's progress records. Search and pagination
/// stay in the presentation layer.
#[derive(Clone)]
pub struct MonitoringService {
    store: Arc<DocumentStore>,
}

impl MonitoringService {
    #[must_use]
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns `NotAuthorized` for non-admin viewers, `Remote` if the listing
    /// fails.
    pub async fn list_progress(
        &self,
        viewer: &CurrentUser,
    ) -> Result<Vec<Document<ProgressEntry>>, MonitoringError> {
        require_admin(viewer)?;
        Ok(self.store.list(USER_PROGRESS).await?)
    }

    /// Delete one progress record by its document id.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthorized` for non-admin viewers, `Remote` if the delete
    /// fails.
    pub async fn delete_progress(
        &self,
        viewer: &CurrentUser,
        record_id: &str,
    ) -> Result<(), MonitoringError> {
        require_admin(viewer)?;
        self.store.remove(USER_PROGRESS, record_id).await?;
        Ok(())
    }
}

fn require_admin(user: &CurrentUser) -> Result<(), MonitoringError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(MonitoringError::NotAuthorized)
    }
}
