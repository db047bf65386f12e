use thiserror::Error;

use crate::model::ids::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("a question needs at least two options, got {count}")]
    TooFewOptions { count: usize },

    #[error("correct answer {index} is outside the {len} options")]
    CorrectAnswerOutOfRange { index: usize, len: usize },
}

/// A single multiple-choice question.
///
/// Option order is significant: answers are recorded as 0-based indices into
/// `options`, and `correct_answer` lives in the same index space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    correct_answer: usize,
}

impl Question {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyText` for a blank prompt,
    /// `QuestionError::TooFewOptions` for fewer than two options, and
    /// `QuestionError::CorrectAnswerOutOfRange` if the key does not index an option.
    pub fn new<S: Into<String>>(
        id: QuestionId,
        text: impl Into<String>,
        options: impl IntoIterator<Item = S>,
        correct_answer: usize,
    ) -> Result<Self, QuestionError> {
        let text = text.into().trim().to_owned();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }

        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                count: options.len(),
            });
        }
        if correct_answer >= options.len() {
            return Err(QuestionError::CorrectAnswerOutOfRange {
                index: correct_answer,
                len: options.len(),
            });
        }

        Ok(Self {
            id,
            text,
            options,
            correct_answer,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn correct_answer(&self) -> usize {
        self.correct_answer
    }

    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_single_option() {
        let err = Question::new(QuestionId::new("q1"), "Who?", ["Only"], 0).unwrap_err();
        assert_eq!(err, QuestionError::TooFewOptions { count: 1 });
    }

    #[test]
    fn rejects_answer_key_past_last_option() {
        let err = Question::new(QuestionId::new("q1"), "Year?", ["1844", "1863"], 2).unwrap_err();
        assert_eq!(err, QuestionError::CorrectAnswerOutOfRange { index: 2, len: 2 });
    }

    #[test]
    fn rejects_blank_text() {
        let err = Question::new(QuestionId::new("q1"), "   ", ["a", "b"], 0).unwrap_err();
        assert_eq!(err, QuestionError::EmptyText);
    }

    #[test]
    fn keeps_option_order() {
        let q = Question::new(
            QuestionId::new("q2"),
            "In what year was the church organized?",
            ["1844", "1863", "1888", "1901"],
            1,
        )
        .unwrap();
        assert_eq!(q.option(1), Some("1863"));
        assert_eq!(q.option(4), None);
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
    }
}
