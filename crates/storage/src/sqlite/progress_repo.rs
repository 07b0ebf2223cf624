use chrono::Utc;
use course_core::model::{CourseId, WatchedSet};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteProgressStore;
use crate::repository::{ProgressStore, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn column<T>(row: Option<SqliteRow>, name: &str) -> Result<Option<T>, StorageError>
where
    for<'r> T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    match row {
        Some(row) => row.try_get::<Option<T>, _>(name).map_err(ser),
        None => Ok(None),
    }
}

#[async_trait::async_trait]
impl ProgressStore for SqliteProgressStore {
    async fn load_watched(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<WatchedSet>, StorageError> {
        let row = sqlx::query("SELECT watched FROM course_state WHERE course_id = ?1")
            .bind(course_id.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;

        let raw: Option<String> = column(row, "watched")?;
        raw.map(|encoded| serde_json::from_str(&encoded).map_err(ser))
            .transpose()
    }

    async fn save_watched(
        &self,
        course_id: &CourseId,
        watched: &WatchedSet,
    ) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(watched).map_err(ser)?;
        sqlx::query(
            r"
            INSERT INTO course_state (course_id, watched, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(course_id) DO UPDATE SET
                watched = excluded.watched,
                updated_at = excluded.updated_at
            ",
        )
        .bind(course_id.as_str())
        .bind(encoded)
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn load_selected_lesson(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<usize>, StorageError> {
        let row = sqlx::query("SELECT selected_lesson FROM course_state WHERE course_id = ?1")
            .bind(course_id.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;

        let raw: Option<i64> = column(row, "selected_lesson")?;
        raw.map(|value| usize::try_from(value).map_err(ser))
            .transpose()
    }

    async fn save_selected_lesson(
        &self,
        course_id: &CourseId,
        index: usize,
    ) -> Result<(), StorageError> {
        let value = i64::try_from(index).map_err(ser)?;
        sqlx::query(
            r"
            INSERT INTO course_state (course_id, selected_lesson, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(course_id) DO UPDATE SET
                selected_lesson = excluded.selected_lesson,
                updated_at = excluded.updated_at
            ",
        )
        .bind(course_id.as_str())
        .bind(value)
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn notification_seen(&self, course_id: &CourseId) -> Result<bool, StorageError> {
        let row = sqlx::query("SELECT notification_seen FROM course_state WHERE course_id = ?1")
            .bind(course_id.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;

        let raw: Option<i64> = column(row, "notification_seen")?;
        Ok(raw.unwrap_or(0) != 0)
    }

    async fn mark_notification_seen(&self, course_id: &CourseId) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO course_state (course_id, notification_seen, updated_at)
            VALUES (?1, 1, ?2)
            ON CONFLICT(course_id) DO UPDATE SET
                notification_seen = 1,
                updated_at = excluded.updated_at
            ",
        )
        .bind(course_id.as_str())
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn load_completion(&self, course_id: &CourseId) -> Result<Option<bool>, StorageError> {
        let row = sqlx::query("SELECT completed FROM course_state WHERE course_id = ?1")
            .bind(course_id.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(conn)?;

        let raw: Option<i64> = column(row, "completed")?;
        Ok(raw.map(|value| value != 0))
    }

    async fn save_completion(
        &self,
        course_id: &CourseId,
        completed: bool,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO course_state (course_id, completed, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(course_id) DO UPDATE SET
                completed = excluded.completed,
                updated_at = excluded.updated_at
            ",
        )
        .bind(course_id.as_str())
        .bind(i64::from(completed))
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(conn)?;
        Ok(())
    }
}
