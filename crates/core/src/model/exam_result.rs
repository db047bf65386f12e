use chrono::{DateTime, Utc};

use crate::engine::ExamOutcome;
use crate::model::ids::{ExamId, ExamResultId, UserId};

/// Record of one finished exam attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamResult {
    pub id: ExamResultId,
    pub user_id: UserId,
    pub exam_id: ExamId,
    pub score: f64,
    pub passed: bool,
    pub taken_at: DateTime<Utc>,
}

impl ExamResult {
    /// Build a result from a graded attempt, assigning a fresh id.
    #[must_use]
    pub fn from_outcome(
        user_id: UserId,
        exam_id: ExamId,
        outcome: &ExamOutcome,
        taken_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ExamResultId::generate(),
            user_id,
            exam_id,
            score: outcome.score(),
            passed: outcome.passed(),
            taken_at,
        }
    }
}
