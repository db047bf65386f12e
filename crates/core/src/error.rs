use thiserror::Error;

use crate::model::{ActivityError, ExamError, LessonError, QuestionError, UserError};

/// Errors raised while assembling catalog content.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Exam(#[from] ExamError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Activity(#[from] ActivityError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error("invalid calendar date {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
}
