use std::sync::Arc;

use portal_core::Catalog;
use portal_core::model::{ActivityId, LessonId, UserId};
use storage::repository::{Storage, StorageError};

use crate::Clock;
use crate::activity_service::ActivityService;
use crate::admin_service::AdminService;
use crate::dashboard_service::DashboardService;
use crate::error::AppServicesError;
use crate::exams::ExamLoopService;
use crate::lesson_service::LessonService;
use crate::mentor_service::{MentorConfig, MentorService};
use crate::profile_service::ProfileService;

/// Assembles app-facing services over one storage backend and catalog.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    catalog: Arc<Catalog>,
    storage: Storage,
    profile: Arc<ProfileService>,
    exams: Arc<ExamLoopService>,
    lessons: Arc<LessonService>,
    activities: Arc<ActivityService>,
    dashboard: Arc<DashboardService>,
    admin: Arc<AdminService>,
    mentor: Arc<MentorService>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: Storage, catalog: Arc<Catalog>, clock: Clock, mentor: MentorService) -> Self {
        let profile = ProfileService::new(Arc::clone(&catalog), Arc::clone(&storage.slots));
        let lessons = LessonService::new(
            clock,
            Arc::clone(&catalog),
            Arc::clone(&storage.lesson_progress),
            profile.clone(),
        );
        let exams = ExamLoopService::new(
            clock,
            Arc::clone(&catalog),
            Arc::clone(&storage.exam_results),
        );
        let activities = ActivityService::new(
            clock,
            Arc::clone(&catalog),
            Arc::clone(&storage.registrations),
        );
        let dashboard = DashboardService::new(clock, Arc::clone(&catalog), lessons.clone());
        let admin = AdminService::new(Arc::clone(&catalog), profile.clone());

        Self {
            clock,
            catalog,
            storage,
            profile: Arc::new(profile),
            exams: Arc::new(exams),
            lessons: Arc::new(lessons),
            activities: Arc::new(activities),
            dashboard: Arc::new(dashboard),
            admin: Arc::new(admin),
            mentor: Arc::new(mentor),
        }
    }

    /// Build services over the sample catalog and in-memory storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Catalog` if the sample content is invalid.
    pub fn in_memory(clock: Clock, mentor: Option<MentorConfig>) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(Catalog::sample()?);
        Ok(Self::new(
            Storage::in_memory(),
            catalog,
            clock,
            MentorService::new(mentor),
        ))
    }

    /// Build services backed by `SQLite` storage and the sample catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// sample content is invalid.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        mentor: Option<MentorConfig>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let catalog = Arc::new(Catalog::sample()?);
        tracing::info!(db = db_url, "portal services ready");
        Ok(Self::new(storage, catalog, clock, MentorService::new(mentor)))
    }

    /// Load demo state: sign in the first sample member, record one finished
    /// lesson and one activity registration. Safe to run repeatedly.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` on profile or storage failures.
    pub async fn seed_demo(&self) -> Result<(), AppServicesError> {
        let user_id = UserId::new("u1");
        self.profile.sign_in(&user_id).await?;

        let now = self.clock.now();
        self.storage
            .lesson_progress
            .mark_completed(&user_id, &LessonId::new("l1"), now)
            .await?;
        match self
            .storage
            .registrations
            .register(&user_id, &ActivityId::new("a1"), now)
            .await
        {
            Ok(()) | Err(StorageError::Conflict) => {}
            Err(err) => return Err(err.into()),
        }

        tracing::info!(user = %user_id, "demo data seeded");
        Ok(())
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn profile(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profile)
    }

    #[must_use]
    pub fn exams(&self) -> Arc<ExamLoopService> {
        Arc::clone(&self.exams)
    }

    #[must_use]
    pub fn lessons(&self) -> Arc<LessonService> {
        Arc::clone(&self.lessons)
    }

    #[must_use]
    pub fn activities(&self) -> Arc<ActivityService> {
        Arc::clone(&self.activities)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }

    #[must_use]
    pub fn admin(&self) -> Arc<AdminService> {
        Arc::clone(&self.admin)
    }

    #[must_use]
    pub fn mentor(&self) -> Arc<MentorService> {
        Arc::clone(&self.mentor)
    }
}
