use thiserror::Error;

use crate::model::{CourseError, FeedbackError, VideoUrlError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
    #[error(transparent)]
    VideoUrl(#[from] VideoUrlError),
}
