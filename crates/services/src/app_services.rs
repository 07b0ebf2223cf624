use std::sync::Arc;

use course_core::Clock;
use course_core::model::{Course, CourseId, CurrentUser};
use storage::repository::Storage;

use crate::auth::UserDirectory;
use crate::course_service::CourseService;
use crate::error::{AppServicesError, CourseServiceError};
use crate::feedback_service::FeedbackService;
use crate::monitoring_service::MonitoringService;
use crate::remote::DocumentStore;
use crate::sync::{ProgressSync, RemoteProgressSync};
use crate::tracker::ProgressTracker;

/// Assembles everything a front end needs behind one constructor.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    sync: Arc<dyn ProgressSync>,
    courses: Arc<CourseService>,
    feedback: Arc<FeedbackService>,
    monitoring: Arc<MonitoringService>,
    users: Arc<UserDirectory>,
}

impl AppServices {
    /// Build services over SQLite-backed local state.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if local storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        store: DocumentStore,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::assemble(storage, clock, store))
    }

    /// Build services over in-memory local state (tests, anonymous preview).
    #[must_use]
    pub fn in_memory(clock: Clock, store: DocumentStore) -> Self {
        Self::assemble(Storage::in_memory(), clock, store)
    }

    fn assemble(storage: Storage, clock: Clock, store: DocumentStore) -> Self {
        let store = Arc::new(store);
        Self {
            sync: Arc::new(RemoteProgressSync::new(Arc::clone(&store))),
            courses: Arc::new(CourseService::new(Arc::clone(&store))),
            feedback: Arc::new(FeedbackService::new(clock, Arc::clone(&store))),
            monitoring: Arc::new(MonitoringService::new(Arc::clone(&store))),
            users: Arc::new(UserDirectory::new(store)),
            storage,
        }
    }

    #[must_use]
    pub fn courses(&self) -> Arc<CourseService> {
        Arc::clone(&self.courses)
    }

    #[must_use]
    pub fn feedback(&self) -> Arc<FeedbackService> {
        Arc::clone(&self.feedback)
    }

    #[must_use]
    pub fn monitoring(&self) -> Arc<MonitoringService> {
        Arc::clone(&self.monitoring)
    }

    #[must_use]
    pub fn users(&self) -> Arc<UserDirectory> {
        Arc::clone(&self.users)
    }

    /// Fetch a course and initialize its progress tracker in one step.
    ///
    /// `Ok(None)` is the not-found state, covering both absent and malformed
    /// course documents.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError` if the course read fails.
    pub async fn open_course(
        &self,
        id: &CourseId,
        user: Option<CurrentUser>,
    ) -> Result<Option<(Course, ProgressTracker)>, CourseServiceError> {
        let Some(course) = self.courses.get_course(id).await? else {
            return Ok(None);
        };
        let tracker = ProgressTracker::initialize(
            Arc::clone(&self.storage.progress),
            Arc::clone(&self.sync),
            &course,
            user,
        )
        .await;
        Ok(Some((course, tracker)))
    }
}
