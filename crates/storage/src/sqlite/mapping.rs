use portal_core::model::{ExamId, ExamResult, ExamResultId, UserId};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Maps unique-key violations to `Conflict`, everything else to `Connection`.
pub(crate) fn conflict_or_conn(e: sqlx::Error) -> StorageError {
    let unique = e
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if unique {
        StorageError::Conflict
    } else {
        conn(e)
    }
}

pub(crate) fn limit_i64(limit: u32) -> i64 {
    i64::from(limit)
}

pub(crate) fn map_result_row(row: &sqlx::sqlite::SqliteRow) -> Result<ExamResult, StorageError> {
    let id: ExamResultId = row
        .try_get::<String, _>("id")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;
    let score: f64 = row.try_get("score").map_err(ser)?;
    if !(0.0..=100.0).contains(&score) {
        return Err(StorageError::Serialization(format!("invalid score: {score}")));
    }

    Ok(ExamResult {
        id,
        user_id: UserId::new(row.try_get::<String, _>("user_id").map_err(ser)?),
        exam_id: ExamId::new(row.try_get::<String, _>("exam_id").map_err(ser)?),
        score,
        passed: row.try_get("passed").map_err(ser)?,
        taken_at: row.try_get("taken_at").map_err(ser)?,
    })
}
