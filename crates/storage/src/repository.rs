use async_trait::async_trait;
use course_core::model::{CourseId, WatchedSet};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable per-client state for one course.
///
/// This mirrors what the web client keeps in browser storage: the
/// watched-set, the last-viewed lesson, the one-shot feedback notice flag,
/// and the completion snapshot. Absent state is `None`/`false`, never an
/// error; the tracker treats read failures the same way.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Fetch the stored watched-set, `None` when the course was never opened.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn load_watched(&self, course_id: &CourseId)
    -> Result<Option<WatchedSet>, StorageError>;

    /// Persist the watched-set, replacing any prior value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    async fn save_watched(
        &self,
        course_id: &CourseId,
        watched: &WatchedSet,
    ) -> Result<(), StorageError>;

    /// Last-viewed lesson index, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn load_selected_lesson(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<usize>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    async fn save_selected_lesson(
        &self,
        course_id: &CourseId,
        index: usize,
    ) -> Result<(), StorageError>;

    /// Whether the 50%-eligibility notice was already shown for this course.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn notification_seen(&self, course_id: &CourseId) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    async fn mark_notification_seen(&self, course_id: &CourseId) -> Result<(), StorageError>;

    /// Stored all-lessons-completed snapshot, `None` when never written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn load_completion(&self, course_id: &CourseId) -> Result<Option<bool>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    async fn save_completion(
        &self,
        course_id: &CourseId,
        completed: bool,
    ) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default)]
struct CourseState {
    watched: Option<WatchedSet>,
    selected_lesson: Option<usize>,
    notification_seen: bool,
    completed: Option<bool>,
}

/// Simple in-memory store for tests, prototyping, and anonymous preview
/// sessions that should leave no trace on disk.
#[derive(Clone, Default)]
pub struct InMemoryProgressStore {
    state: Arc<Mutex<HashMap<CourseId, CourseState>>>,
}

impl InMemoryProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T: Default>(
        &self,
        course_id: &CourseId,
        get: impl FnOnce(&CourseState) -> T,
    ) -> Result<T, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(course_id).map(get).unwrap_or_default())
    }

    fn write(
        &self,
        course_id: &CourseId,
        set: impl FnOnce(&mut CourseState),
    ) -> Result<(), StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        set(guard.entry(course_id.clone()).or_default());
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn load_watched(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<WatchedSet>, StorageError> {
        self.read(course_id, |state| state.watched.clone())
    }

    async fn save_watched(
        &self,
        course_id: &CourseId,
        watched: &WatchedSet,
    ) -> Result<(), StorageError> {
        self.write(course_id, |state| state.watched = Some(watched.clone()))
    }

    async fn load_selected_lesson(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<usize>, StorageError> {
        self.read(course_id, |state| state.selected_lesson)
    }

    async fn save_selected_lesson(
        &self,
        course_id: &CourseId,
        index: usize,
    ) -> Result<(), StorageError> {
        self.write(course_id, |state| state.selected_lesson = Some(index))
    }

    async fn notification_seen(&self, course_id: &CourseId) -> Result<bool, StorageError> {
        self.read(course_id, |state| state.notification_seen)
    }

    async fn mark_notification_seen(&self, course_id: &CourseId) -> Result<(), StorageError> {
        self.write(course_id, |state| state.notification_seen = true)
    }

    async fn load_completion(&self, course_id: &CourseId) -> Result<Option<bool>, StorageError> {
        self.read(course_id, |state| state.completed)
    }

    async fn save_completion(
        &self,
        course_id: &CourseId,
        completed: bool,
    ) -> Result<(), StorageError> {
        self.write(course_id, |state| state.completed = Some(completed))
    }
}

/// Aggregates the local store behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            progress: Arc::new(InMemoryProgressStore::new()),
        }
    }
}
