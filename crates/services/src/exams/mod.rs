mod attempt;
mod view;
mod workflow;

// Public API of the exam subsystem.
pub use crate::error::ExamServiceError;
pub use attempt::ExamAttempt;
pub use view::{ExamListItem, QuestionView};
pub use workflow::{AdvanceResult, ExamLoopService};
