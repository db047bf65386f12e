use std::collections::HashSet;
use std::sync::Arc;

use portal_core::Catalog;
use portal_core::model::{Lesson, LessonId, LessonLevel, UserId};
use storage::repository::LessonProgressRepository;

use crate::Clock;
use crate::error::LessonServiceError;
use crate::profile_service::ProfileService;

/// Level filter for the lesson list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelFilter {
    #[default]
    All,
    Only(LessonLevel),
}

impl LevelFilter {
    #[must_use]
    pub fn matches(self, lesson: &Lesson) -> bool {
        match self {
            LevelFilter::All => true,
            LevelFilter::Only(level) => lesson.level() == level,
        }
    }
}

/// A lesson together with the member's completion flag.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonItem {
    pub lesson: Lesson,
    pub completed: bool,
}

/// Outcome of `complete_lesson`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonCompletion {
    /// `false` when the lesson had already been completed.
    pub newly_completed: bool,
    pub progress: u8,
}

/// Rounded share of completed lessons, 0 when there are none.
#[must_use]
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    #[allow(clippy::cast_precision_loss)]
    let pct = (completed as f64 / total as f64 * 100.0).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pct = pct as u8;
    pct
}

/// Lesson listing and completion tracking.
#[derive(Clone)]
pub struct LessonService {
    clock: Clock,
    catalog: Arc<Catalog>,
    completions: Arc<dyn LessonProgressRepository>,
    profile: ProfileService,
}

impl LessonService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<Catalog>,
        completions: Arc<dyn LessonProgressRepository>,
        profile: ProfileService,
    ) -> Self {
        Self {
            clock,
            catalog,
            completions,
            profile,
        }
    }

    /// Lessons matching `filter`, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Storage` if completions cannot be read.
    pub async fn list(
        &self,
        user_id: &UserId,
        filter: LevelFilter,
    ) -> Result<Vec<LessonItem>, LessonServiceError> {
        let done = self.completed_set(user_id).await?;
        Ok(self
            .catalog
            .lessons()
            .iter()
            .filter(|lesson| filter.matches(lesson))
            .map(|lesson| LessonItem {
                completed: done.contains(lesson.id()),
                lesson: lesson.clone(),
            })
            .collect())
    }

    /// # Errors
    ///
    /// Returns `LessonServiceError::UnknownLesson` for ids missing from the catalog.
    pub async fn get(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
    ) -> Result<LessonItem, LessonServiceError> {
        let lesson = self
            .catalog
            .lesson(lesson_id)
            .ok_or_else(|| LessonServiceError::UnknownLesson(lesson_id.clone()))?;
        let done = self.completed_set(user_id).await?;
        Ok(LessonItem {
            completed: done.contains(lesson.id()),
            lesson: lesson.clone(),
        })
    }

    /// Mark a lesson completed for the signed-in member and refresh their
    /// overall progress.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::UnknownLesson`, `LessonServiceError::Profile`
    /// when nobody is signed in, or storage failures.
    pub async fn complete_lesson(
        &self,
        lesson_id: &LessonId,
    ) -> Result<LessonCompletion, LessonServiceError> {
        if self.catalog.lesson(lesson_id).is_none() {
            return Err(LessonServiceError::UnknownLesson(lesson_id.clone()));
        }
        let user = self.profile.require_user().await?;

        let newly_completed = self
            .completions
            .mark_completed(user.id(), lesson_id, self.clock.now())
            .await?;

        let done = self.completed_set(user.id()).await?;
        let completed = self
            .catalog
            .lessons()
            .iter()
            .filter(|lesson| done.contains(lesson.id()))
            .count();
        let progress = progress_percent(completed, self.catalog.lessons().len());
        self.profile.set_progress(progress).await?;

        tracing::info!(
            user = %user.id(),
            lesson = %lesson_id,
            newly_completed,
            progress,
            "lesson completed"
        );
        Ok(LessonCompletion {
            newly_completed,
            progress,
        })
    }

    async fn completed_set(&self, user_id: &UserId) -> Result<HashSet<LessonId>, LessonServiceError> {
        Ok(self
            .completions
            .completed_lessons(user_id)
            .await?
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn service() -> LessonService {
        let repo = InMemoryRepository::new();
        let catalog = Arc::new(Catalog::sample().unwrap());
        let profile = ProfileService::new(Arc::clone(&catalog), Arc::new(repo.clone()));
        LessonService::new(fixed_clock(), catalog, Arc::new(repo), profile)
    }

    #[test]
    fn progress_rounds_to_nearest_percent() {
        assert_eq!(progress_percent(0, 3), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(0, 0), 0);
    }

    #[tokio::test]
    async fn level_filter_narrows_list() {
        let svc = service();
        let user = UserId::new("u1");
        assert_eq!(svc.list(&user, LevelFilter::All).await.unwrap().len(), 3);

        let junior = svc
            .list(&user, LevelFilter::Only(LessonLevel::Junior))
            .await
            .unwrap();
        assert_eq!(junior.len(), 1);
        assert_eq!(junior[0].lesson.id(), &LessonId::new("l3"));
    }

    #[tokio::test]
    async fn completing_requires_sign_in() {
        let svc = service();
        let err = svc.complete_lesson(&LessonId::new("l1")).await.unwrap_err();
        assert!(matches!(err, LessonServiceError::Profile(_)));
    }

    #[tokio::test]
    async fn completing_updates_progress_once() {
        let svc = service();
        svc.profile.sign_in(&UserId::new("u1")).await.unwrap();

        let first = svc.complete_lesson(&LessonId::new("l2")).await.unwrap();
        assert!(first.newly_completed);
        assert_eq!(first.progress, 33);

        let again = svc.complete_lesson(&LessonId::new("l2")).await.unwrap();
        assert!(!again.newly_completed);
        assert_eq!(again.progress, 33);

        let item = svc
            .get(&UserId::new("u1"), &LessonId::new("l2"))
            .await
            .unwrap();
        assert!(item.completed);
        let user = svc.profile.require_user().await.unwrap();
        assert_eq!(user.progress(), 33);
    }

    #[tokio::test]
    async fn unknown_lesson_is_rejected() {
        let svc = service();
        let err = svc
            .get(&UserId::new("u1"), &LessonId::new("l9"))
            .await
            .unwrap_err();
        assert!(matches!(err, LessonServiceError::UnknownLesson(_)));
    }
}
