use std::sync::Arc;

use portal_core::Catalog;
use portal_core::model::User;

use crate::error::ProfileError;
use crate::profile_service::ProfileService;

/// Leader-facing portal statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminOverview {
    pub members: usize,
    pub lessons: usize,
    pub activities: usize,
    pub exams: usize,
    pub average_progress: u8,
}

#[derive(Clone)]
pub struct AdminService {
    catalog: Arc<Catalog>,
    profile: ProfileService,
}

impl AdminService {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, profile: ProfileService) -> Self {
        Self { catalog, profile }
    }

    /// # Errors
    ///
    /// Returns `ProfileError::Storage` if the signed-in member cannot be read.
    pub async fn overview(&self) -> Result<AdminOverview, ProfileError> {
        let users = self.members().await?;
        Ok(AdminOverview {
            members: users.len(),
            lessons: self.catalog.lessons().len(),
            activities: self.catalog.activities().len(),
            exams: self.catalog.exams().len(),
            average_progress: average_progress(&users),
        })
    }

    /// Catalog roster with the signed-in member's persisted state in place of
    /// their catalog entry.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Storage` if the signed-in member cannot be read.
    pub async fn members(&self) -> Result<Vec<User>, ProfileError> {
        let current = self.profile.current_user().await?;
        Ok(overlay_current(self.catalog.users(), current))
    }
}

fn overlay_current(roster: &[User], current: Option<User>) -> Vec<User> {
    let mut users = roster.to_vec();
    if let Some(current) = current {
        match users.iter_mut().find(|u| u.id() == current.id()) {
            Some(slot) => *slot = current,
            None => users.push(current),
        }
    }
    users
}

/// Rounded mean of member progress; 0 with no members.
#[must_use]
pub fn average_progress(users: &[User]) -> u8 {
    if users.is_empty() {
        return 0;
    }
    let sum: u32 = users.iter().map(|u| u32::from(u.progress())).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = (f64::from(sum) / users.len() as f64).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mean = mean as u8;
    mean
}
