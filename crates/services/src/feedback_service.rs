use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use course_core::Clock;
use course_core::model::{CourseId, CurrentUser, FeedbackDraft, FeedbackRecord};

use crate::error::FeedbackServiceError;
use crate::remote::{DocumentStore, FEEDBACKS, USER_PROGRESS};
use crate::sync::progress_document_key;

/// Marker merged onto the user's progress document after a submission. The
/// progress sync never writes this field, so the merge is the only owner.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackGivenPatch {
    feedback_given: bool,
}

/// Appends feedback submissions and flags the submitter's progress record.
#[derive(Clone)]
pub struct FeedbackService {
    clock: Clock,
    store: Arc<DocumentStore>,
}

impl FeedbackService {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<DocumentStore>) -> Self {
        Self { clock, store }
    }

    /// Append one rating/comment submission for a course.
    ///
    /// Submissions are append-only; repeat submissions create new records.
    /// This is a foreground action: store failures propagate to the caller
    /// for surfacing. The follow-up `feedbackGiven` flag merge is bookkeeping
    /// and is logged-and-swallowed instead.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackServiceError::Feedback` for draft validation
    /// failures, `Remote` if the append fails.
    pub async fn submit(
        &self,
        user: &CurrentUser,
        course_id: &CourseId,
        course_name: &str,
        draft: FeedbackDraft,
    ) -> Result<String, FeedbackServiceError> {
        let record = FeedbackRecord::new(
            user,
            course_id.clone(),
            course_name,
            draft,
            self.clock.now(),
        )?;
        let id = self.store.create(FEEDBACKS, &record).await?;

        let key = progress_document_key(user.id(), course_id);
        if let Err(err) = self
            .store
            .upsert_merge(USER_PROGRESS, &key, &FeedbackGivenPatch { feedback_given: true })
            .await
        {
            warn!(error = %err, "failed to flag feedback on progress record");
        }

        Ok(id)
    }
}
