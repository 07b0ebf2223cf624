use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use course_core::model::{Course, CourseDraft, CourseId, CurrentUser, Lesson, LessonLink};

use crate::error::CourseServiceError;
use crate::remote::{COURSES, Document, DocumentStore};

/// Course document as stored in the `cursos` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CourseDoc {
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "youtubeLinks", default)]
    youtube_links: Option<Vec<LessonLink>>,
}

impl CourseDoc {
    fn from_parts(title: &str, description: Option<&str>, lessons: &[Lesson]) -> Self {
        Self {
            title: title.to_owned(),
            description: description.map(str::to_owned),
            youtube_links: Some(
                lessons
                    .iter()
                    .map(|lesson| LessonLink {
                        title: lesson.title().to_owned(),
                        url: lesson.url().to_owned(),
                    })
                    .collect(),
            ),
        }
    }
}

/// Reads courses for everyone; writes them for admins.
#[derive(Clone)]
pub struct CourseService {
    store: Arc<DocumentStore>,
}

impl CourseService {
    #[must_use]
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// List all courses, skipping documents that no longer parse.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Remote` if the listing itself fails.
    pub async fn list_courses(&self) -> Result<Vec<Course>, CourseServiceError> {
        let docs: Vec<Document<CourseDoc>> = self.store.list(COURSES).await?;
        let mut courses = Vec::with_capacity(docs.len());
        for doc in docs {
            let id = doc.id.clone();
            match into_course(doc) {
                Some(course) => courses.push(course),
                None => debug!(course = %id, "skipping malformed course document"),
            }
        }
        Ok(courses)
    }

    /// Fetch one course.
    ///
    /// Absent documents and documents missing their lesson list are both
    /// `None`; malformed input routes to the not-found state, never a crash.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Remote` if the read fails.
    pub async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, CourseServiceError> {
        let doc: Option<CourseDoc> = self.store.fetch(COURSES, id.as_str()).await?;
        Ok(doc.and_then(|data| {
            into_course(Document {
                id: id.to_string(),
                data,
            })
        }))
    }

    /// Create a course from the admin form.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthorized` for non-admin authors, `Course` for draft
    /// validation failures, `Remote` if the write fails.
    pub async fn create_course(
        &self,
        author: &CurrentUser,
        draft: CourseDraft,
    ) -> Result<CourseId, CourseServiceError> {
        require_admin(author)?;
        let validated = draft.validate()?;
        let doc = CourseDoc::from_parts(
            validated.title(),
            validated.description(),
            validated.lessons(),
        );
        let id = self.store.create(COURSES, &doc).await?;
        Ok(CourseId::new(id))
    }

    /// Replace a course's stored fields with the given state.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthorized` for non-admin authors, `Remote` if the write
    /// fails.
    pub async fn update_course(
        &self,
        author: &CurrentUser,
        course: &Course,
    ) -> Result<(), CourseServiceError> {
        require_admin(author)?;
        let doc = CourseDoc::from_parts(course.title(), course.description(), course.lessons());
        self.store
            .replace(COURSES, course.id().as_str(), &doc)
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `NotAuthorized` for non-admin authors, `Remote` if the delete
    /// fails.
    pub async fn delete_course(
        &self,
        author: &CurrentUser,
        id: &CourseId,
    ) -> Result<(), CourseServiceError> {
        require_admin(author)?;
        self.store.remove(COURSES, id.as_str()).await?;
        Ok(())
    }
}

fn require_admin(user: &CurrentUser) -> Result<(), CourseServiceError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(CourseServiceError::NotAuthorized)
    }
}

fn into_course(doc: Document<CourseDoc>) -> Option<Course> {
    let links = doc.data.youtube_links?;
    Course::from_persisted(
        CourseId::new(doc.id),
        doc.data.title,
        doc.data.description,
        links,
    )
    .ok()
}
