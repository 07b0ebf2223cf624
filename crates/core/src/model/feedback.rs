use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{CourseId, UserId};
use crate::model::user::CurrentUser;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FeedbackError {
    #[error("rating must be between 0 and 5, got {0}")]
    RatingOutOfRange(u8),

    #[error("feedback comment cannot be empty")]
    EmptyComment,
}

//
// ─── RATING ────────────────────────────────────────────────────────────────────
//

/// Star rating from 0 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    /// Creates a validated rating.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::RatingOutOfRange` for values above 5.
    pub fn new(value: u8) -> Result<Self, FeedbackError> {
        if value > Self::MAX {
            return Err(FeedbackError::RatingOutOfRange(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = FeedbackError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

//
// ─── FEEDBACK ──────────────────────────────────────────────────────────────────
//

/// Rating and comment as entered in the feedback form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackDraft {
    pub rating: Rating,
    pub comment: String,
}

impl FeedbackDraft {
    /// Trims the comment and rejects blank submissions.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::EmptyComment` for a whitespace-only comment.
    pub fn validate(self) -> Result<Self, FeedbackError> {
        let comment = self.comment.trim().to_owned();
        if comment.is_empty() {
            return Err(FeedbackError::EmptyComment);
        }
        Ok(Self {
            rating: self.rating,
            comment,
        })
    }
}

/// One feedback submission for a course.
///
/// Append-only: repeated submissions from the same user create new records
/// and are never deduplicated or mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
    pub course_id: CourseId,
    pub course_name: String,
    pub rating: Rating,
    pub comment: String,
    pub timestamp: DateTime<Utc>,
}

impl FeedbackRecord {
    /// Combines a validated draft with submitter and course identity.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError` if the draft fails validation.
    pub fn new(
        user: &CurrentUser,
        course_id: CourseId,
        course_name: impl Into<String>,
        draft: FeedbackDraft,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, FeedbackError> {
        let draft = draft.validate()?;
        Ok(Self {
            user_id: user.id().clone(),
            user_name: user.display_name().to_owned(),
            user_email: user.contact_email().to_owned(),
            course_id,
            course_name: course_name.into(),
            rating: draft.rating,
            comment: draft.comment,
            timestamp,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::UserProfile;
    use crate::time::fixed_now;

    fn user() -> CurrentUser {
        CurrentUser::new(
            UserId::new("u1"),
            UserProfile {
                name: Some("Ada".into()),
                email: Some("ada@example.com".into()),
                permission: crate::model::user::Permission::User,
            },
        )
    }

    #[test]
    fn rating_rejects_values_above_five() {
        assert_eq!(
            Rating::new(6).unwrap_err(),
            FeedbackError::RatingOutOfRange(6)
        );
        assert_eq!(Rating::new(5).unwrap().value(), 5);
        assert_eq!(Rating::new(0).unwrap().value(), 0);
    }

    #[test]
    fn rating_deserialization_validates() {
        let err = serde_json::from_str::<Rating>("9").unwrap_err();
        assert!(err.to_string().contains("between 0 and 5"));
    }

    #[test]
    fn draft_rejects_blank_comment() {
        let draft = FeedbackDraft {
            rating: Rating::new(4).unwrap(),
            comment: "   ".into(),
        };
        assert_eq!(draft.validate().unwrap_err(), FeedbackError::EmptyComment);
    }

    #[test]
    fn record_trims_comment_and_carries_identity() {
        let record = FeedbackRecord::new(
            &user(),
            CourseId::new("c1"),
            "Rust Basics",
            FeedbackDraft {
                rating: Rating::new(5).unwrap(),
                comment: "  great course  ".into(),
            },
            fixed_now(),
        )
        .unwrap();

        assert_eq!(record.comment, "great course");
        assert_eq!(record.user_name, "Ada");
        assert_eq!(record.course_name, "Rust Basics");
    }

    #[test]
    fn record_serializes_with_store_field_names() {
        let record = FeedbackRecord::new(
            &user(),
            CourseId::new("c1"),
            "Rust Basics",
            FeedbackDraft {
                rating: Rating::new(3).unwrap(),
                comment: "ok".into(),
            },
            fixed_now(),
        )
        .unwrap();

        let encoded = serde_json::to_value(&record).unwrap();
        assert_eq!(encoded["userId"], "u1");
        assert_eq!(encoded["courseName"], "Rust Basics");
        assert_eq!(encoded["rating"], 3);
    }
}
