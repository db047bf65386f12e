//! Shared error types for the services crate.

use thiserror::Error;

use portal_core::ExamSessionError;
use portal_core::model::{ActivityId, ExamId, LessonId, UserError, UserId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `MentorService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MentorError {
    #[error("mentor is not configured")]
    Disabled,
    #[error("question cannot be empty")]
    EmptyQuestion,
    #[error("mentor returned an empty response")]
    EmptyResponse,
    #[error("mentor request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("no member is signed in")]
    NotSignedIn,
    #[error("unknown member: {0}")]
    UnknownUser(UserId),
    #[error(transparent)]
    User(#[from] UserError),
    #[error("profile JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the exam services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamServiceError {
    #[error("unknown exam: {0}")]
    UnknownExam(ExamId),
    #[error("exam {exam_id} has {expected} questions but {got} answers were given")]
    AnswerCountMismatch {
        exam_id: ExamId,
        expected: usize,
        got: usize,
    },
    #[error(transparent)]
    Session(#[from] ExamSessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `LessonService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonServiceError {
    #[error("unknown lesson: {0}")]
    UnknownLesson(LessonId),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ActivityService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ActivityServiceError {
    #[error("unknown activity: {0}")]
    UnknownActivity(ActivityId),
    #[error("already registered for {0}")]
    AlreadyRegistered(ActivityId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] portal_core::Error),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
