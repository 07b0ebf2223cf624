use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::model::course::Course;
use crate::model::ids::CourseId;

/// Completion threshold (percent) above which the feedback prompt may appear.
pub const FEEDBACK_THRESHOLD_PERCENT: f64 = 50.0;

//
// ─── WATCHED SET ───────────────────────────────────────────────────────────────
//

/// Set of lesson indices the user has marked watched.
///
/// Membership is all that matters; insertion order is irrelevant. The set
/// persists as the stored JSON map of lesson index to watched flag
/// (`{"0":true,"2":true}`); non-numeric keys and `false` entries are dropped
/// on load rather than treated as corruption.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchedSet(BTreeSet<usize>);

impl WatchedSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an index watched; returns whether the set changed.
    pub fn insert(&mut self, index: usize) -> bool {
        self.0.insert(index)
    }

    /// Flips an index's membership; returns the new watched flag.
    pub fn toggle(&mut self, index: usize) -> bool {
        if self.0.remove(&index) {
            false
        } else {
            self.0.insert(index);
            true
        }
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<usize> for WatchedSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for WatchedSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for index in &self.0 {
            map.serialize_entry(&index.to_string(), &true)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WatchedSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, bool>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter(|(_, watched)| *watched)
            .filter_map(|(key, _)| key.parse().ok())
            .collect())
    }
}

//
// ─── COURSE PROGRESS ───────────────────────────────────────────────────────────
//

/// Per-user watched-lesson state for one course and its derived completion
/// metrics.
///
/// All derived values are total functions: a course with zero lessons is 0%
/// complete, never a division error. Transitions reject out-of-range indices
/// instead of panicking; the UI never produces them but the contract stays
/// defensive.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseProgress {
    course_id: CourseId,
    course_name: String,
    total_lessons: usize,
    watched: WatchedSet,
}

impl CourseProgress {
    #[must_use]
    pub fn new(course: &Course, watched: WatchedSet) -> Self {
        Self {
            course_id: course.id().clone(),
            course_name: course.title().to_owned(),
            total_lessons: course.total_lessons(),
            watched,
        }
    }

    /// State for a course opened with no prior progress: the first lesson
    /// counts as watched on arrival.
    #[must_use]
    pub fn first_visit(course: &Course) -> Self {
        let mut watched = WatchedSet::new();
        if course.total_lessons() > 0 {
            watched.insert(0);
        }
        Self::new(course, watched)
    }

    /// Marks a lesson watched.
    ///
    /// Idempotent on the set; re-marking a watched lesson is accepted.
    /// Returns `false` for an out-of-range index, leaving the set untouched.
    pub fn mark_watched(&mut self, index: usize) -> bool {
        if index >= self.total_lessons {
            return false;
        }
        self.watched.insert(index);
        true
    }

    /// Flips a lesson's watched flag, checkbox-style.
    ///
    /// Returns the new flag, or `None` for an out-of-range index.
    pub fn toggle_watched(&mut self, index: usize) -> Option<bool> {
        if index >= self.total_lessons {
            return None;
        }
        Some(self.watched.toggle(index))
    }

    /// Index of the lesson after `current`, if there is one. Never mutates
    /// watched state; navigation marks the destination separately.
    #[must_use]
    pub fn advance_to_next(&self, current: usize) -> Option<usize> {
        let next = current.checked_add(1)?;
        (next < self.total_lessons).then_some(next)
    }

    /// Number of completed lessons, clamped to the lesson count (stale
    /// storage can hold indices past the end of a shrunk course).
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.watched.len().min(self.total_lessons)
    }

    /// Percentage of lessons completed; a course with no lessons is 0%.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_percentage(&self) -> f64 {
        if self.total_lessons == 0 {
            return 0.0;
        }
        self.completed_count() as f64 / self.total_lessons as f64 * 100.0
    }

    /// Whether the user has watched enough to be offered the feedback prompt.
    #[must_use]
    pub fn feedback_eligible(&self) -> bool {
        self.progress_percentage() >= FEEDBACK_THRESHOLD_PERCENT
    }

    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.total_lessons > 0 && self.completed_count() == self.total_lessons
    }

    // Accessors
    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn course_name(&self) -> &str {
        &self.course_name
    }

    #[must_use]
    pub fn total_lessons(&self) -> usize {
        self.total_lessons
    }

    #[must_use]
    pub fn watched(&self) -> &WatchedSet {
        &self.watched
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::course::{Course, LessonLink};

    fn course(lessons: usize) -> Course {
        let links = (0..lessons)
            .map(|i| LessonLink {
                title: format!("Lesson {i}"),
                url: format!("https://www.youtube.com/watch?v=vid{i}"),
            })
            .collect();
        Course::from_persisted(CourseId::new("c1"), "Test Course", None, links).unwrap()
    }

    #[test]
    fn first_visit_seeds_lesson_zero() {
        let progress = CourseProgress::first_visit(&course(4));
        assert!(progress.watched().contains(0));
        assert_eq!(progress.completed_count(), 1);
        assert!((progress.progress_percentage() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn first_visit_of_empty_course_stays_empty() {
        let progress = CourseProgress::first_visit(&course(0));
        assert!(progress.watched().is_empty());
        assert!(progress.progress_percentage().abs() < f64::EPSILON);
        assert!(!progress.all_completed());
    }

    #[test]
    fn mark_watched_is_idempotent() {
        let mut progress = CourseProgress::first_visit(&course(4));
        assert!(progress.mark_watched(2));
        let before = progress.watched().clone();
        assert!(progress.mark_watched(2));
        assert_eq!(progress.watched(), &before);
        assert_eq!(progress.completed_count(), 2);
    }

    #[test]
    fn mark_watched_rejects_out_of_range() {
        let mut progress = CourseProgress::first_visit(&course(4));
        assert!(!progress.mark_watched(4));
        assert!(!progress.mark_watched(usize::MAX));
        assert_eq!(progress.completed_count(), 1);
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let mut progress = CourseProgress::first_visit(&course(4));
        assert_eq!(progress.toggle_watched(1), Some(true));
        assert_eq!(progress.toggle_watched(1), Some(false));
        assert!(!progress.watched().contains(1));

        // and the same for an initially-watched lesson
        assert_eq!(progress.toggle_watched(0), Some(false));
        assert_eq!(progress.toggle_watched(0), Some(true));
        assert!(progress.watched().contains(0));
    }

    #[test]
    fn toggle_rejects_out_of_range() {
        let mut progress = CourseProgress::first_visit(&course(4));
        assert_eq!(progress.toggle_watched(4), None);
    }

    #[test]
    fn percentage_is_monotonic_under_marking() {
        let mut progress = CourseProgress::new(&course(7), WatchedSet::new());
        let mut last = progress.progress_percentage();
        for index in [3, 0, 6, 3, 1] {
            progress.mark_watched(index);
            let current = progress.progress_percentage();
            assert!(current >= last);
            last = current;
        }
    }

    #[test]
    fn feedback_eligibility_boundary_is_exact() {
        let mut progress = CourseProgress::new(&course(10), WatchedSet::new());
        for index in 0..4 {
            progress.mark_watched(index);
        }
        assert!(!progress.feedback_eligible());

        progress.mark_watched(4);
        assert!((progress.progress_percentage() - 50.0).abs() < f64::EPSILON);
        assert!(progress.feedback_eligible());
    }

    #[test]
    fn all_completed_boundary() {
        let mut progress = CourseProgress::new(&course(3), WatchedSet::new());
        progress.mark_watched(0);
        progress.mark_watched(1);
        assert!(!progress.all_completed());

        progress.mark_watched(2);
        assert!(progress.all_completed());
    }

    #[test]
    fn completed_count_clamps_stale_indices() {
        // Storage can hold indices from before a course shrank.
        let watched: WatchedSet = [0, 1, 5, 9].into_iter().collect();
        let progress = CourseProgress::new(&course(3), watched);
        assert_eq!(progress.completed_count(), 3);
        assert!((progress.progress_percentage() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn advance_to_next_stops_at_last_lesson() {
        let progress = CourseProgress::first_visit(&course(3));
        assert_eq!(progress.advance_to_next(0), Some(1));
        assert_eq!(progress.advance_to_next(1), Some(2));
        assert_eq!(progress.advance_to_next(2), None);
        assert_eq!(progress.advance_to_next(usize::MAX), None);
    }

    #[test]
    fn watched_set_serializes_to_index_map() {
        let watched: WatchedSet = [0, 2].into_iter().collect();
        let encoded = serde_json::to_string(&watched).unwrap();
        assert_eq!(encoded, r#"{"0":true,"2":true}"#);
    }

    #[test]
    fn watched_set_load_drops_false_and_junk_keys() {
        let decoded: WatchedSet =
            serde_json::from_str(r#"{"0":true,"1":false,"oops":true,"3":true}"#).unwrap();
        let expected: WatchedSet = [0, 3].into_iter().collect();
        assert_eq!(decoded, expected);
    }
}
