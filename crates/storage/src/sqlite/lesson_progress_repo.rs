use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_core::model::{LessonId, UserId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{LessonProgressRepository, StorageError};

#[async_trait]
impl LessonProgressRepository for SqliteRepository {
    async fn mark_completed(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
        completed_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let res = sqlx::query(
            r"
                INSERT OR IGNORE INTO lesson_completions (user_id, lesson_id, completed_at)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(user_id.as_str())
        .bind(lesson_id.as_str())
        .bind(completed_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.rows_affected() == 1)
    }

    async fn completed_lessons(&self, user_id: &UserId) -> Result<Vec<LessonId>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT lesson_id
                FROM lesson_completions
                WHERE user_id = ?1
                ORDER BY completed_at ASC, rowid ASC
            ",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("lesson_id")
                    .map(LessonId::new)
                    .map_err(ser)
            })
            .collect()
    }
}
