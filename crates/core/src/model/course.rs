use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::CourseId;
use crate::model::video::VideoRef;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("two lessons share the same video url: {0}")]
    DuplicateLessonUrl(String),

    #[error("no lesson at index {0}")]
    LessonOutOfRange(usize),
}

//
// ─── LESSONS ───────────────────────────────────────────────────────────────────
//

/// One watchable unit within a course, identified by its position.
///
/// Lessons are owned by their `Course` and never mutated independently; a
/// lesson whose URL fails to parse keeps its raw form and is rendered without
/// a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    index: usize,
    title: String,
    url: String,
    video: Option<VideoRef>,
}

impl Lesson {
    fn new(index: usize, title: String, url: String) -> Self {
        let video = VideoRef::parse(&url).ok();
        Self {
            index,
            title,
            url,
            video,
        }
    }

    /// Zero-based position within the course's lesson sequence.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The extracted video reference, when the URL was understood.
    #[must_use]
    pub fn video(&self) -> Option<&VideoRef> {
        self.video.as_ref()
    }
}

/// A lesson title/url pair as entered in the admin form or stored remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonLink {
    pub title: String,
    pub url: String,
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// Editable course fields before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDraft {
    pub title: String,
    pub description: Option<String>,
    pub links: Vec<LessonLink>,
}

impl CourseDraft {
    /// Validates the draft into a course awaiting a store identifier.
    ///
    /// Links with an empty title or URL are dropped (blank trailing rows in
    /// the form); duplicate URLs are rejected.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyTitle` for a blank title and
    /// `CourseError::DuplicateLessonUrl` when two kept links share a URL.
    pub fn validate(self) -> Result<ValidatedCourse, CourseError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(CourseError::EmptyTitle);
        }

        let description = self
            .description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        let links: Vec<LessonLink> = self
            .links
            .into_iter()
            .filter(|link| !link.title.trim().is_empty() && !link.url.trim().is_empty())
            .collect();

        let mut seen = HashSet::new();
        for link in &links {
            if !seen.insert(link.url.trim()) {
                return Err(CourseError::DuplicateLessonUrl(link.url.trim().to_owned()));
            }
        }

        let lessons = build_lessons(links);

        Ok(ValidatedCourse {
            title,
            description,
            lessons,
        })
    }
}

/// A validated course not yet assigned a store identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCourse {
    title: String,
    description: Option<String>,
    lessons: Vec<Lesson>,
}

impl ValidatedCourse {
    #[must_use]
    pub fn assign_id(self, id: CourseId) -> Course {
        Course {
            id,
            title: self.title,
            description: self.description,
            lessons: self.lessons,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }
}

/// A named, described, ordered sequence of lessons.
///
/// Order is significant: lesson 0 is the one auto-marked watched on a first
/// visit. A course with zero lessons is representable and yields 0% progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: Option<String>,
    lessons: Vec<Lesson>,
}

impl Course {
    /// Rebuilds a course from a store document.
    ///
    /// Unlike `CourseDraft::validate`, this trusts the stored link list and
    /// only normalizes: unparsable video URLs become player-less lessons.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyTitle` if the stored title is blank.
    pub fn from_persisted(
        id: CourseId,
        title: impl Into<String>,
        description: Option<String>,
        links: Vec<LessonLink>,
    ) -> Result<Self, CourseError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(CourseError::EmptyTitle);
        }

        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id,
            title,
            description,
            lessons: build_lessons(links),
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn lesson(&self, index: usize) -> Option<&Lesson> {
        self.lessons.get(index)
    }

    #[must_use]
    pub fn total_lessons(&self) -> usize {
        self.lessons.len()
    }

    /// Returns a copy of the course with the lesson at `index` replaced.
    ///
    /// Lesson edits are replace-at-index over the owned sequence, never
    /// in-place mutation of a shared element.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::LessonOutOfRange` for an invalid index.
    pub fn with_lesson(
        &self,
        index: usize,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<Self, CourseError> {
        if index >= self.lessons.len() {
            return Err(CourseError::LessonOutOfRange(index));
        }

        let mut lessons = self.lessons.clone();
        lessons[index] = Lesson::new(
            index,
            title.into().trim().to_owned(),
            url.into().trim().to_owned(),
        );

        Ok(Self {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            lessons,
        })
    }
}

fn build_lessons(links: Vec<LessonLink>) -> Vec<Lesson> {
    links
        .into_iter()
        .enumerate()
        .map(|(index, link)| {
            Lesson::new(
                index,
                link.title.trim().to_owned(),
                link.url.trim().to_owned(),
            )
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn link(title: &str, url: &str) -> LessonLink {
        LessonLink {
            title: title.into(),
            url: url.into(),
        }
    }

    fn draft() -> CourseDraft {
        CourseDraft {
            title: "Rust Basics".into(),
            description: Some("From zero".into()),
            links: vec![
                link("Intro", "https://www.youtube.com/watch?v=aaa111"),
                link("Ownership", "https://www.youtube.com/watch?v=bbb222"),
            ],
        }
    }

    #[test]
    fn draft_validate_rejects_empty_title() {
        let mut draft = draft();
        draft.title = "   ".into();
        assert_eq!(draft.validate().unwrap_err(), CourseError::EmptyTitle);
    }

    #[test]
    fn draft_validate_rejects_duplicate_urls() {
        let mut draft = draft();
        draft
            .links
            .push(link("Intro again", "https://www.youtube.com/watch?v=aaa111"));
        let err = draft.validate().unwrap_err();
        assert!(matches!(err, CourseError::DuplicateLessonUrl(_)));
    }

    #[test]
    fn draft_validate_drops_blank_links() {
        let mut draft = draft();
        draft.links.push(link("", ""));
        draft.links.push(link("No url", "  "));
        let validated = draft.validate().unwrap();
        assert_eq!(validated.lessons().len(), 2);
    }

    #[test]
    fn draft_validate_indexes_lessons_in_order() {
        let course = draft().validate().unwrap().assign_id(CourseId::new("c1"));
        let indices: Vec<usize> = course.lessons().iter().map(Lesson::index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(course.lesson(0).unwrap().title(), "Intro");
    }

    #[test]
    fn draft_validate_filters_empty_description() {
        let mut draft = draft();
        draft.description = Some("   ".into());
        assert_eq!(draft.validate().unwrap().description(), None);
    }

    #[test]
    fn from_persisted_tolerates_bad_video_urls() {
        let course = Course::from_persisted(
            CourseId::new("c1"),
            "Rust Basics",
            None,
            vec![
                link("Intro", "https://www.youtube.com/watch?v=aaa111"),
                link("Broken", "not a url at all"),
            ],
        )
        .unwrap();

        assert_eq!(course.total_lessons(), 2);
        assert!(course.lesson(0).unwrap().video().is_some());
        assert!(course.lesson(1).unwrap().video().is_none());
        assert_eq!(course.lesson(1).unwrap().url(), "not a url at all");
    }

    #[test]
    fn from_persisted_accepts_zero_lessons() {
        let course =
            Course::from_persisted(CourseId::new("c1"), "Empty", None, Vec::new()).unwrap();
        assert_eq!(course.total_lessons(), 0);
    }

    #[test]
    fn with_lesson_replaces_only_target_index() {
        let course = draft().validate().unwrap().assign_id(CourseId::new("c1"));
        let edited = course
            .with_lesson(1, "Borrowing", "https://www.youtube.com/watch?v=ccc333")
            .unwrap();

        assert_eq!(edited.lesson(1).unwrap().title(), "Borrowing");
        assert_eq!(edited.lesson(1).unwrap().video().unwrap().as_str(), "ccc333");
        // untouched sibling and original both keep their state
        assert_eq!(edited.lesson(0).unwrap().title(), "Intro");
        assert_eq!(course.lesson(1).unwrap().title(), "Ownership");
    }

    #[test]
    fn with_lesson_rejects_out_of_range() {
        let course = draft().validate().unwrap().assign_id(CourseId::new("c1"));
        let err = course.with_lesson(9, "X", "https://youtu.be/x").unwrap_err();
        assert_eq!(err, CourseError::LessonOutOfRange(9));
    }
}
