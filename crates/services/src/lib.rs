#![forbid(unsafe_code)]

pub mod activity_service;
pub mod admin_service;
pub mod app_services;
pub mod dashboard_service;
pub mod error;
pub mod exams;
pub mod lesson_service;
pub mod mentor_service;
pub mod profile_service;

pub use portal_core::Clock;

pub use activity_service::{ActivityItem, ActivityService};
pub use admin_service::{AdminOverview, AdminService};
pub use app_services::AppServices;
pub use dashboard_service::{DashboardService, DashboardSnapshot};
pub use error::{
    ActivityServiceError, AppServicesError, ExamServiceError, LessonServiceError, MentorError,
    ProfileError,
};
pub use exams::{AdvanceResult, ExamAttempt, ExamListItem, ExamLoopService, QuestionView};
pub use lesson_service::{LessonCompletion, LessonItem, LessonService, LevelFilter};
pub use mentor_service::{ChatLine, Conversation, MentorConfig, MentorService, Speaker};
pub use profile_service::{PROFILE_KEY, ProfileService};
