mod course;
mod feedback;
mod ids;
mod progress;
mod user;
pub mod video;

pub use course::{Course, CourseDraft, CourseError, Lesson, LessonLink, ValidatedCourse};
pub use feedback::{FeedbackDraft, FeedbackError, FeedbackRecord, Rating};
pub use ids::{CourseId, UserId};
pub use progress::{CourseProgress, FEEDBACK_THRESHOLD_PERCENT, WatchedSet};
pub use user::{CurrentUser, Permission, UserProfile};
pub use video::{VideoRef, VideoUrlError};
