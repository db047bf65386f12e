use std::sync::Arc;

use chrono::NaiveDate;
use portal_core::Catalog;
use portal_core::model::{Activity, Announcement, Lesson, User};

use crate::Clock;
use crate::error::LessonServiceError;
use crate::lesson_service::{LessonService, LevelFilter};

/// Everything the home screen shows for one member.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub user: User,
    pub progress: u8,
    pub next_activity: Option<Activity>,
    pub next_lesson: Option<Lesson>,
    pub incomplete_lessons: usize,
    /// Newest first.
    pub announcements: Vec<Announcement>,
}

#[derive(Clone)]
pub struct DashboardService {
    clock: Clock,
    catalog: Arc<Catalog>,
    lessons: LessonService,
}

impl DashboardService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<Catalog>, lessons: LessonService) -> Self {
        Self {
            clock,
            catalog,
            lessons,
        }
    }

    /// # Errors
    ///
    /// Returns `LessonServiceError::Storage` if completions cannot be read.
    pub async fn snapshot(&self, user: &User) -> Result<DashboardSnapshot, LessonServiceError> {
        let lessons = self.lessons.list(user.id(), LevelFilter::All).await?;
        let mut pending = lessons.into_iter().filter(|item| !item.completed);
        let next_lesson = pending.next().map(|item| item.lesson);
        let incomplete_lessons = usize::from(next_lesson.is_some()) + pending.count();

        let mut announcements = self.catalog.announcements().to_vec();
        announcements.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(DashboardSnapshot {
            user: user.clone(),
            progress: user.progress(),
            next_activity: next_activity(self.catalog.activities(), self.clock.today()).cloned(),
            next_lesson,
            incomplete_lessons,
            announcements,
        })
    }
}

/// Earliest activity on or after `today`; the first listed one when all are past.
#[must_use]
pub fn next_activity(activities: &[Activity], today: NaiveDate) -> Option<&Activity> {
    activities
        .iter()
        .filter(|a| a.date() >= today)
        .min_by_key(|a| a.date())
        .or_else(|| activities.first())
}
