use portal_core::ExamEngine;
use portal_core::model::{Exam, ExamId, QuestionId};

/// Row in the exam picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamListItem {
    pub id: ExamId,
    pub title: String,
    pub question_count: usize,
    pub passing_score: u8,
    pub time_limit_minutes: u32,
    pub attempts_allowed: u32,
}

impl ExamListItem {
    #[must_use]
    pub fn from_exam(exam: &Exam) -> Self {
        Self {
            id: exam.id().clone(),
            title: exam.title().to_owned(),
            question_count: exam.question_count(),
            passing_score: exam.passing_score(),
            time_limit_minutes: exam.time_limit_minutes(),
            attempts_allowed: exam.attempts_allowed(),
        }
    }
}

/// Snapshot of the question currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub question_id: QuestionId,
    /// 1-based position for display.
    pub number: usize,
    pub total: usize,
    pub text: String,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub can_advance: bool,
    pub is_last: bool,
    pub progress_percent: f64,
}

impl QuestionView {
    /// Build the view for an in-progress engine; `None` otherwise.
    #[must_use]
    pub fn from_engine(engine: &ExamEngine) -> Option<Self> {
        if engine.is_finished() {
            return None;
        }
        let exam = engine.exam()?;
        let index = engine.current_index()?;
        let question = engine.current_question()?;
        Some(Self {
            question_id: question.id().clone(),
            number: index + 1,
            total: exam.question_count(),
            text: question.text().to_owned(),
            options: question.options().to_vec(),
            selected: engine.answer_for(question.id()),
            can_advance: engine.can_advance(),
            is_last: index + 1 == exam.question_count(),
            progress_percent: engine.progress_percent().unwrap_or(0.0),
        })
    }
}
