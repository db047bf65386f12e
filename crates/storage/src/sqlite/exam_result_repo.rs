use async_trait::async_trait;
use portal_core::model::{ExamResult, UserId};

use super::SqliteRepository;
use super::mapping::{conflict_or_conn, conn, limit_i64, map_result_row};
use crate::repository::{ExamResultRepository, StorageError};

#[async_trait]
impl ExamResultRepository for SqliteRepository {
    async fn append_result(&self, result: &ExamResult) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO exam_results (id, user_id, exam_id, score, passed, taken_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(result.id.to_string())
        .bind(result.user_id.as_str())
        .bind(result.exam_id.as_str())
        .bind(result.score)
        .bind(result.passed)
        .bind(result.taken_at)
        .execute(&self.pool)
        .await
        .map_err(conflict_or_conn)?;
        Ok(())
    }

    async fn list_results(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<ExamResult>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, user_id, exam_id, score, passed, taken_at
                FROM exam_results
                WHERE user_id = ?1
                ORDER BY taken_at DESC, rowid DESC
                LIMIT ?2
            ",
        )
        .bind(user_id.as_str())
        .bind(limit_i64(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_result_row).collect()
    }
}
