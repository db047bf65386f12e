mod activity;
mod announcement;
mod exam;
mod exam_result;
mod ids;
mod lesson;
mod question;
mod user;

pub use activity::{Activity, ActivityDraft, ActivityError, ActivityKind};
pub use announcement::{Announcement, Priority};
pub use exam::{Exam, ExamError};
pub use exam_result::ExamResult;
pub use ids::{
    ActivityId, AnnouncementId, ExamId, ExamResultId, LessonId, ParseIdError, QuestionId, UserId,
};
pub use lesson::{Lesson, LessonError, LessonLevel};
pub use question::{Question, QuestionError};
pub use user::{User, UserError, UserRole};
