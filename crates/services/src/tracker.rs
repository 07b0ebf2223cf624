use std::sync::Arc;

use course_core::model::{Course, CourseProgress, CurrentUser};
use storage::repository::ProgressStore;
use tracing::warn;

use crate::sync::{ProgressSnapshot, ProgressSync};

/// Owns the authoritative in-memory watched-set for one open course and
/// derives every flag the viewing surface needs.
///
/// Local persistence completes before each mutating call returns; remote
/// syncs are detached and best-effort. Nothing here fails outward: the worst
/// outcome of any storage or network problem is a stale progress indicator.
pub struct ProgressTracker {
    local: Arc<dyn ProgressStore>,
    sync: Arc<dyn ProgressSync>,
    user: Option<CurrentUser>,
    progress: CourseProgress,
}

impl ProgressTracker {
    /// Load prior progress for a course, seeding a first visit.
    ///
    /// With no stored watched-set and at least one lesson, lesson 0 counts as
    /// watched on arrival (opening the course shows it), the seed is
    /// persisted, and — when a user is present — one snapshot sync is queued.
    /// A read failure degrades to "no prior progress".
    pub async fn initialize(
        local: Arc<dyn ProgressStore>,
        sync: Arc<dyn ProgressSync>,
        course: &Course,
        user: Option<CurrentUser>,
    ) -> Self {
        let prior = match local.load_watched(course.id()).await {
            Ok(prior) => prior,
            Err(err) => {
                warn!(course = %course.id(), error = %err, "failed to load watched lessons, starting empty");
                None
            }
        };

        let (progress, seeded) = match prior {
            Some(watched) => (CourseProgress::new(course, watched), false),
            None => (
                CourseProgress::first_visit(course),
                course.total_lessons() > 0,
            ),
        };

        let tracker = Self {
            local,
            sync,
            user,
            progress,
        };
        if seeded {
            tracker.persist_watched().await;
            tracker.queue_sync();
        }
        tracker
    }

    #[must_use]
    pub fn progress(&self) -> &CourseProgress {
        &self.progress
    }

    #[must_use]
    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    /// Mark a lesson watched (a lesson click).
    ///
    /// Idempotent on the set, but every accepted click re-persists and
    /// re-queues a sync. Out-of-range indices are a silent no-op with no
    /// side effects.
    pub async fn mark_watched(&mut self, index: usize) -> &CourseProgress {
        if self.progress.mark_watched(index) {
            self.persist_watched().await;
            self.queue_sync();
        }
        &self.progress
    }

    /// Flip a lesson's watched flag (the checkbox).
    ///
    /// Updates local state only; toggling does not push a remote snapshot.
    /// Lesson clicks are the sync trigger.
    pub async fn toggle_watched(&mut self, index: usize) -> &CourseProgress {
        if self.progress.toggle_watched(index).is_some() {
            self.persist_watched().await;
        }
        &self.progress
    }

    /// Index of the lesson after `current`, if any. Pure; navigation marks
    /// the destination via `mark_watched`.
    #[must_use]
    pub fn advance_to_next(&self, current: usize) -> Option<usize> {
        self.progress.advance_to_next(current)
    }

    /// Remember the lesson being viewed. Out-of-range indices are ignored.
    pub async fn select_lesson(&self, index: usize) {
        if index >= self.progress.total_lessons() {
            return;
        }
        if let Err(err) = self
            .local
            .save_selected_lesson(self.progress.course_id(), index)
            .await
        {
            warn!(error = %err, "failed to persist selected lesson");
        }
    }

    /// The lesson to show on reload: the remembered one, or the first when
    /// nothing valid was saved.
    pub async fn selected_lesson(&self) -> usize {
        match self
            .local
            .load_selected_lesson(self.progress.course_id())
            .await
        {
            Ok(Some(index)) if index < self.progress.total_lessons() => index,
            Ok(_) => 0,
            Err(err) => {
                warn!(error = %err, "failed to load selected lesson");
                0
            }
        }
    }

    /// One-shot feedback notice: `true` exactly once, the first time this is
    /// called with eligibility reached; the seen-flag is durable per course.
    pub async fn take_feedback_notification(&self) -> bool {
        if !self.progress.feedback_eligible() {
            return false;
        }

        let course_id = self.progress.course_id();
        match self.local.notification_seen(course_id).await {
            Ok(true) => false,
            Ok(false) => {
                if let Err(err) = self.local.mark_notification_seen(course_id).await {
                    warn!(error = %err, "failed to persist feedback notice flag");
                }
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to read feedback notice flag");
                true
            }
        }
    }

    /// Completion banner check against the stored snapshot.
    ///
    /// Absent snapshot: record the current all-completed state and show
    /// nothing this visit. Present snapshot: show the banner when it says so.
    pub async fn completion_banner(&self) -> bool {
        let course_id = self.progress.course_id();
        match self.local.load_completion(course_id).await {
            Ok(Some(completed)) => completed,
            Ok(None) => {
                if let Err(err) = self
                    .local
                    .save_completion(course_id, self.progress.all_completed())
                    .await
                {
                    warn!(error = %err, "failed to persist completion snapshot");
                }
                false
            }
            Err(err) => {
                warn!(error = %err, "failed to read completion snapshot");
                false
            }
        }
    }

    async fn persist_watched(&self) {
        if let Err(err) = self
            .local
            .save_watched(self.progress.course_id(), self.progress.watched())
            .await
        {
            warn!(error = %err, "failed to persist watched lessons");
        }
    }

    /// Detached push of the current snapshot; viewing never blocks on it and
    /// failures are logged, not retried. Anonymous sessions queue nothing.
    fn queue_sync(&self) {
        let Some(user) = &self.user else {
            return;
        };
        let snapshot = ProgressSnapshot::new(user, &self.progress);
        let sync = Arc::clone(&self.sync);
        tokio::spawn(async move {
            if let Err(err) = sync.sync_progress(&snapshot).await {
                warn!(error = %err, "progress sync failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use course_core::model::{CourseId, LessonLink, UserId, UserProfile};
    use std::sync::Mutex;
    use storage::repository::InMemoryProgressStore;

    use crate::error::RemoteStoreError;

    #[derive(Default)]
    struct RecordingSync {
        snapshots: Mutex<Vec<ProgressSnapshot>>,
    }

    impl RecordingSync {
        fn taken(&self) -> Vec<ProgressSnapshot> {
            self.snapshots.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProgressSync for RecordingSync {
        async fn sync_progress(
            &self,
            snapshot: &ProgressSnapshot,
        ) -> Result<(), RemoteStoreError> {
            self.snapshots.lock().unwrap().push(snapshot.clone());
            Ok(())
        }
    }

    /// Sync that always fails, for the swallow-and-continue paths.
    struct FailingSync;

    #[async_trait]
    impl ProgressSync for FailingSync {
        async fn sync_progress(&self, _: &ProgressSnapshot) -> Result<(), RemoteStoreError> {
            Err(RemoteStoreError::Disabled)
        }
    }

    fn course(lessons: usize) -> Course {
        let links = (0..lessons)
            .map(|i| LessonLink {
                title: format!("Lesson {i}"),
                url: format!("https://www.youtube.com/watch?v=vid{i}"),
            })
            .collect();
        Course::from_persisted(CourseId::new("c1"), "Rust Basics", None, links).unwrap()
    }

    fn user() -> CurrentUser {
        CurrentUser::new(UserId::new("u1"), UserProfile::default())
    }

    /// Let detached sync tasks run to completion on the test runtime.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn first_visit_seeds_and_syncs_once() {
        let local = Arc::new(InMemoryProgressStore::new());
        let sync = Arc::new(RecordingSync::default());
        let course = course(4);

        let tracker = ProgressTracker::initialize(
            local.clone(),
            sync.clone(),
            &course,
            Some(user()),
        )
        .await;
        settle().await;

        assert!(tracker.progress().watched().contains(0));
        let stored = local.load_watched(course.id()).await.unwrap().unwrap();
        assert!(stored.contains(0));

        let snapshots = sync.taken();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].completed_lessons, 1);
        assert_eq!(snapshots[0].total_lessons, 4);
    }

    #[tokio::test]
    async fn second_visit_loads_prior_state_without_sync() {
        let local = Arc::new(InMemoryProgressStore::new());
        let sync = Arc::new(RecordingSync::default());
        let course = course(4);

        let watched = [0, 2].into_iter().collect();
        local.save_watched(course.id(), &watched).await.unwrap();

        let tracker =
            ProgressTracker::initialize(local, sync.clone(), &course, Some(user())).await;
        settle().await;

        assert_eq!(tracker.progress().completed_count(), 2);
        assert!(sync.taken().is_empty());
    }

    #[tokio::test]
    async fn mark_watched_persists_and_resyncs_every_click() {
        let local = Arc::new(InMemoryProgressStore::new());
        let sync = Arc::new(RecordingSync::default());
        let course = course(4);

        let mut tracker = ProgressTracker::initialize(
            local.clone(),
            sync.clone(),
            &course,
            Some(user()),
        )
        .await;
        settle().await;

        tracker.mark_watched(1).await;
        // a repeat click on the same lesson leaves the set alone but re-syncs
        tracker.mark_watched(1).await;
        settle().await;

        let snapshots = sync.taken();
        assert_eq!(snapshots.len(), 3); // seed + two clicks
        assert_eq!(snapshots[2].completed_lessons, 2);

        let stored = local.load_watched(course.id()).await.unwrap().unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn out_of_range_mark_changes_nothing_and_queues_nothing() {
        let local = Arc::new(InMemoryProgressStore::new());
        let sync = Arc::new(RecordingSync::default());
        let course = course(4);

        let mut tracker = ProgressTracker::initialize(
            local.clone(),
            sync.clone(),
            &course,
            Some(user()),
        )
        .await;
        settle().await;
        let baseline = sync.taken().len();

        tracker.mark_watched(4).await;
        tracker.mark_watched(usize::MAX).await;
        settle().await;

        assert_eq!(tracker.progress().completed_count(), 1);
        assert_eq!(sync.taken().len(), baseline);
    }

    #[tokio::test]
    async fn toggle_updates_local_state_but_never_syncs() {
        let local = Arc::new(InMemoryProgressStore::new());
        let sync = Arc::new(RecordingSync::default());
        let course = course(4);

        let mut tracker = ProgressTracker::initialize(
            local.clone(),
            sync.clone(),
            &course,
            Some(user()),
        )
        .await;
        settle().await;
        let baseline = sync.taken().len();

        tracker.toggle_watched(2).await;
        assert!(tracker.progress().watched().contains(2));
        tracker.toggle_watched(2).await;
        assert!(!tracker.progress().watched().contains(2));
        settle().await;

        assert_eq!(sync.taken().len(), baseline);
        let stored = local.load_watched(course.id()).await.unwrap().unwrap();
        assert!(!stored.contains(2));
    }

    #[tokio::test]
    async fn anonymous_sessions_persist_locally_but_never_sync() {
        let local = Arc::new(InMemoryProgressStore::new());
        let sync = Arc::new(RecordingSync::default());
        let course = course(4);

        let mut tracker =
            ProgressTracker::initialize(local.clone(), sync.clone(), &course, None).await;
        tracker.mark_watched(1).await;
        settle().await;

        assert!(sync.taken().is_empty());
        let stored = local.load_watched(course.id()).await.unwrap().unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn feedback_notification_fires_exactly_once() {
        let local = Arc::new(InMemoryProgressStore::new());
        let sync = Arc::new(RecordingSync::default());
        let course = course(4);

        let mut tracker =
            ProgressTracker::initialize(local, sync, &course, Some(user())).await;

        assert!(!tracker.take_feedback_notification().await); // 25%, not eligible

        tracker.mark_watched(1).await; // 50%
        assert!(tracker.take_feedback_notification().await);
        assert!(!tracker.take_feedback_notification().await);

        tracker.mark_watched(2).await; // still eligible, still seen
        assert!(!tracker.take_feedback_notification().await);
    }

    #[tokio::test]
    async fn completion_banner_shows_on_the_visit_after_completion() {
        let local = Arc::new(InMemoryProgressStore::new());
        let sync = Arc::new(RecordingSync::default());
        let course = course(2);

        let mut tracker =
            ProgressTracker::initialize(local.clone(), sync.clone(), &course, Some(user()))
                .await;
        tracker.mark_watched(1).await;
        assert!(tracker.progress().all_completed());
        // first check records the snapshot without showing anything
        assert!(!tracker.completion_banner().await);

        let tracker =
            ProgressTracker::initialize(local, sync, &course, Some(user())).await;
        assert!(tracker.completion_banner().await);
    }

    #[tokio::test]
    async fn selected_lesson_round_trips_and_falls_back() {
        let local = Arc::new(InMemoryProgressStore::new());
        let sync = Arc::new(RecordingSync::default());
        let course = course(3);

        let tracker =
            ProgressTracker::initialize(local.clone(), sync, &course, Some(user())).await;

        assert_eq!(tracker.selected_lesson().await, 0);

        tracker.select_lesson(2).await;
        assert_eq!(tracker.selected_lesson().await, 2);

        tracker.select_lesson(7).await; // ignored
        assert_eq!(tracker.selected_lesson().await, 2);

        // stale index beyond a shrunk course falls back to the first lesson
        local.save_selected_lesson(course.id(), 9).await.unwrap();
        assert_eq!(tracker.selected_lesson().await, 0);
    }

    #[tokio::test]
    async fn sync_failures_never_surface() {
        let local = Arc::new(InMemoryProgressStore::new());
        let course = course(4);

        let mut tracker =
            ProgressTracker::initialize(local.clone(), Arc::new(FailingSync), &course, Some(user()))
                .await;
        tracker.mark_watched(1).await;
        settle().await;

        // local state is intact despite every sync failing
        assert_eq!(tracker.progress().completed_count(), 2);
        let stored = local.load_watched(course.id()).await.unwrap().unwrap();
        assert_eq!(stored.len(), 2);
    }
}
