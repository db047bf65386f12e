use chrono::{DateTime, Utc};
use portal_core::ExamEngine;
use portal_core::model::{ExamResultId, UserId};
use std::fmt;

/// One member's exam attempt: the engine plus persistence bookkeeping.
pub struct ExamAttempt {
    user_id: UserId,
    engine: ExamEngine,
    finished_at: Option<DateTime<Utc>>,
    result_id: Option<ExamResultId>,
}

impl ExamAttempt {
    pub(crate) fn new(user_id: UserId, engine: ExamEngine) -> Self {
        Self {
            user_id,
            engine,
            finished_at: None,
            result_id: None,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Read-only view of the underlying engine for rendering.
    #[must_use]
    pub fn engine(&self) -> &ExamEngine {
        &self.engine
    }

    pub(crate) fn engine_mut(&mut self) -> &mut ExamEngine {
        &mut self.engine
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Id of the stored result once the finished attempt has been persisted.
    #[must_use]
    pub fn result_id(&self) -> Option<ExamResultId> {
        self.result_id
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.engine.is_finished()
    }

    pub(crate) fn mark_finished(&mut self, at: DateTime<Utc>) {
        self.finished_at = Some(at);
    }

    pub(crate) fn set_result_id(&mut self, id: ExamResultId) {
        self.result_id = Some(id);
    }

    pub(crate) fn reset_bookkeeping(&mut self) {
        self.finished_at = None;
        self.result_id = None;
    }
}

impl fmt::Debug for ExamAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamAttempt")
            .field("user_id", &self.user_id)
            .field("exam_id", &self.engine.exam().map(|e| e.id()))
            .field("phase", &self.engine.phase())
            .field("current", &self.engine.current_index())
            .field("answered", &self.engine.answered_count())
            .field("finished_at", &self.finished_at)
            .field("result_id", &self.result_id)
            .finish_non_exhaustive()
    }
}
