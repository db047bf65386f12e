use std::sync::Arc;

use portal_core::model::{ExamId, ExamResult, ExamResultId, UserId};
use portal_core::{Advance, Catalog, ExamEngine, ExamSessionError};
use storage::repository::ExamResultRepository;

use super::attempt::ExamAttempt;
use super::view::ExamListItem;
use crate::Clock;
use crate::error::ExamServiceError;

/// Result of moving past the current question.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvanceResult {
    pub advance: Advance,
    /// Set once the finished attempt has been stored.
    pub result_id: Option<ExamResultId>,
}

/// Orchestrates exam attempts and persists finished results.
#[derive(Clone)]
pub struct ExamLoopService {
    clock: Clock,
    catalog: Arc<Catalog>,
    results: Arc<dyn ExamResultRepository>,
}

impl ExamLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<Catalog>,
        results: Arc<dyn ExamResultRepository>,
    ) -> Self {
        Self {
            clock,
            catalog,
            results,
        }
    }

    #[must_use]
    pub fn list_exams(&self) -> Vec<ExamListItem> {
        self.catalog
            .exams()
            .iter()
            .map(|exam| ExamListItem::from_exam(exam))
            .collect()
    }

    /// Start a fresh attempt at the given exam.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::UnknownExam` for ids missing from the catalog,
    /// or `ExamServiceError::Session` when the exam has no questions.
    pub fn start_exam(
        &self,
        user_id: UserId,
        exam_id: &ExamId,
    ) -> Result<ExamAttempt, ExamServiceError> {
        let exam = self
            .catalog
            .exam(exam_id)
            .ok_or_else(|| ExamServiceError::UnknownExam(exam_id.clone()))?;

        let mut engine = ExamEngine::new();
        engine.start(exam)?;
        tracing::info!(user = %user_id, exam = %exam_id, "exam attempt started");
        Ok(ExamAttempt::new(user_id, engine))
    }

    /// Select an option for the current question. Re-selecting overwrites.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Session` if the attempt is finished or the
    /// option is out of range.
    pub fn answer(&self, attempt: &mut ExamAttempt, option: usize) -> Result<(), ExamServiceError> {
        attempt.engine_mut().record_answer(option)?;
        Ok(())
    }

    /// Move to the next question, or finish and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Session` if the current question is
    /// unanswered, or `ExamServiceError::Storage` if the result cannot be
    /// stored. A storage failure leaves the attempt finished; call
    /// `finalize_result` to retry the write.
    pub async fn advance(
        &self,
        attempt: &mut ExamAttempt,
    ) -> Result<AdvanceResult, ExamServiceError> {
        let advance = attempt.engine_mut().advance()?;

        match &advance {
            Advance::Next { index } => {
                tracing::debug!(user = %attempt.user_id(), index, "advanced to next question");
            }
            Advance::Finished(outcome) => {
                attempt.mark_finished(self.clock.now());
                tracing::info!(
                    user = %attempt.user_id(),
                    correct = outcome.correct(),
                    total = outcome.total(),
                    score = outcome.score(),
                    passed = outcome.passed(),
                    "exam attempt finished"
                );
                self.finalize_result(attempt).await?;
            }
        }

        Ok(AdvanceResult {
            advance,
            result_id: attempt.result_id(),
        })
    }

    /// Store the finished attempt if it has not been stored yet.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Session` if the attempt is not finished.
    /// Returns `ExamServiceError::Storage` if persistence fails.
    pub async fn finalize_result(
        &self,
        attempt: &mut ExamAttempt,
    ) -> Result<ExamResultId, ExamServiceError> {
        if let Some(id) = attempt.result_id() {
            return Ok(id);
        }

        let engine = attempt.engine();
        let outcome = engine.outcome().ok_or(ExamSessionError::NotFinished)?;
        let exam_id = engine
            .exam()
            .map(|exam| exam.id().clone())
            .ok_or(ExamSessionError::NotStarted)?;
        let taken_at = attempt.finished_at().unwrap_or_else(|| self.clock.now());

        let result = ExamResult::from_outcome(
            attempt.user_id().clone(),
            exam_id,
            &outcome,
            taken_at,
        );
        self.results.append_result(&result).await?;
        attempt.set_result_id(result.id);
        tracing::debug!(result = %result.id, "exam result stored");
        Ok(result.id)
    }

    /// Restart a finished attempt on the same exam with no answers.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Session` unless the attempt is finished.
    pub fn retry(&self, attempt: &mut ExamAttempt) -> Result<(), ExamServiceError> {
        attempt.engine_mut().retry()?;
        attempt.reset_bookkeeping();
        tracing::info!(user = %attempt.user_id(), "exam attempt restarted");
        Ok(())
    }

    /// Discard an attempt without grading or storing anything.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Session` if the engine refuses to abandon.
    pub fn abandon(&self, mut attempt: ExamAttempt) -> Result<(), ExamServiceError> {
        attempt.engine_mut().abandon()?;
        tracing::info!(user = %attempt.user_id(), "exam attempt abandoned");
        Ok(())
    }

    /// Take a whole exam in one go: one option per question, in order.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::AnswerCountMismatch` unless exactly one
    /// answer per question is supplied; nothing is started or stored then.
    /// Otherwise any error `answer`/`advance` would return.
    pub async fn submit_answers(
        &self,
        user_id: UserId,
        exam_id: &ExamId,
        answers: &[usize],
    ) -> Result<ExamAttempt, ExamServiceError> {
        let expected = self
            .catalog
            .exam(exam_id)
            .ok_or_else(|| ExamServiceError::UnknownExam(exam_id.clone()))?
            .question_count();
        if answers.len() != expected {
            return Err(ExamServiceError::AnswerCountMismatch {
                exam_id: exam_id.clone(),
                expected,
                got: answers.len(),
            });
        }

        let mut attempt = self.start_exam(user_id, exam_id)?;
        for &option in answers {
            self.answer(&mut attempt, option)?;
            self.advance(&mut attempt).await?;
        }
        Ok(attempt)
    }

    /// Stored results for a member, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Storage` on backend failures.
    pub async fn history(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<ExamResult>, ExamServiceError> {
        Ok(self.results.list_results(user_id, limit).await?)
    }
}
