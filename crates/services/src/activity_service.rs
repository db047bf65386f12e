use std::sync::Arc;

use portal_core::Catalog;
use portal_core::model::{Activity, ActivityId, UserId};
use storage::repository::{RegistrationRepository, StorageError};

use crate::Clock;
use crate::error::ActivityServiceError;

/// An activity as seen by one member.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityItem {
    pub activity: Activity,
    pub registered: bool,
    pub fill_percent: f64,
}

/// Activity listing and registration.
#[derive(Clone)]
pub struct ActivityService {
    clock: Clock,
    catalog: Arc<Catalog>,
    registrations: Arc<dyn RegistrationRepository>,
}

impl ActivityService {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<Catalog>,
        registrations: Arc<dyn RegistrationRepository>,
    ) -> Self {
        Self {
            clock,
            catalog,
            registrations,
        }
    }

    /// All activities in catalog order with the member's registration flag.
    ///
    /// # Errors
    ///
    /// Returns `ActivityServiceError::Storage` on backend failures.
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<ActivityItem>, ActivityServiceError> {
        let registered = self.registrations.registered_activities(user_id).await?;
        Ok(self
            .catalog
            .activities()
            .iter()
            .map(|activity| ActivityItem {
                registered: registered.contains(activity.id()),
                fill_percent: activity.fill_percent(),
                activity: activity.clone(),
            })
            .collect())
    }

    /// Register a member for an activity.
    ///
    /// The catalog's `registered_count` is not changed.
    ///
    /// # Errors
    ///
    /// Returns `UnknownActivity`, `AlreadyRegistered`, or storage failures.
    pub async fn register(
        &self,
        user_id: &UserId,
        activity_id: &ActivityId,
    ) -> Result<(), ActivityServiceError> {
        if self.catalog.activity(activity_id).is_none() {
            return Err(ActivityServiceError::UnknownActivity(activity_id.clone()));
        }

        match self
            .registrations
            .register(user_id, activity_id, self.clock.now())
            .await
        {
            Ok(()) => {
                tracing::info!(user = %user_id, activity = %activity_id, "registered for activity");
                Ok(())
            }
            Err(StorageError::Conflict) => {
                Err(ActivityServiceError::AlreadyRegistered(activity_id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }
}
