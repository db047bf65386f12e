use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::{ExamId, LessonId, QuestionId};
use crate::model::question::Question;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamError {
    #[error("exam title cannot be empty")]
    EmptyTitle,

    #[error("passing score must be within 0..=100, got {0}")]
    InvalidPassingScore(u8),

    #[error("question id {0} appears more than once")]
    DuplicateQuestion(QuestionId),
}

/// An ordered set of questions with a passing threshold.
///
/// An exam may hold zero questions as data, but such an exam cannot be
/// started by the engine. `time_limit_minutes` and `attempts_allowed` are
/// carried for display only and are never enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exam {
    id: ExamId,
    title: String,
    lesson_id: LessonId,
    questions: Vec<Question>,
    passing_score: u8,
    time_limit_minutes: u32,
    attempts_allowed: u32,
}

impl Exam {
    /// Creates a validated exam with no time limit and a single attempt.
    ///
    /// # Errors
    ///
    /// Returns `ExamError` for a blank title, a passing score above 100, or
    /// duplicate question ids.
    pub fn new(
        id: ExamId,
        title: impl Into<String>,
        lesson_id: LessonId,
        questions: Vec<Question>,
        passing_score: u8,
    ) -> Result<Self, ExamError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(ExamError::EmptyTitle);
        }
        if passing_score > 100 {
            return Err(ExamError::InvalidPassingScore(passing_score));
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(ExamError::DuplicateQuestion(question.id().clone()));
            }
        }

        Ok(Self {
            id,
            title,
            lesson_id,
            questions,
            passing_score,
            time_limit_minutes: 0,
            attempts_allowed: 1,
        })
    }

    #[must_use]
    pub fn with_time_limit(mut self, minutes: u32) -> Self {
        self.time_limit_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_attempts_allowed(mut self, attempts: u32) -> Self {
        self.attempts_allowed = attempts;
        self
    }

    #[must_use]
    pub fn id(&self) -> &ExamId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        &self.lesson_id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn passing_score(&self) -> u8 {
        self.passing_score
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> u32 {
        self.time_limit_minutes
    }

    #[must_use]
    pub fn attempts_allowed(&self) -> u32 {
        self.attempts_allowed
    }

    /// Pass/fail classification; a score equal to the threshold passes.
    #[must_use]
    pub fn passes(&self, score: f64) -> bool {
        score >= f64::from(self.passing_score)
    }
}
