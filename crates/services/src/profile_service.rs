use std::sync::Arc;

use chrono::NaiveDate;
use portal_core::Catalog;
use portal_core::model::{User, UserId, UserRole};
use serde::{Deserialize, Serialize};
use storage::repository::KeyValueStore;

use crate::error::ProfileError;

/// Slot holding the signed-in member.
pub const PROFILE_KEY: &str = "ay_user";

/// Persisted JSON shape of the signed-in member.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredUser {
    id: UserId,
    name: String,
    email: String,
    role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar: Option<String>,
    progress: u8,
    joined_at: NaiveDate,
}

impl StoredUser {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id().clone(),
            name: user.name().to_owned(),
            email: user.email().to_owned(),
            role: user.role(),
            avatar: user.avatar().map(str::to_owned),
            progress: user.progress(),
            joined_at: user.joined_at(),
        }
    }

    fn into_user(self) -> Result<User, ProfileError> {
        Ok(User::from_persisted(
            self.id,
            self.name,
            self.email,
            self.role,
            self.avatar,
            self.progress,
            self.joined_at,
        )?)
    }
}

/// Signed-in member state, loaded from and saved to a single key-value slot.
///
/// No credentials are checked; signing in simply selects a catalog member.
#[derive(Clone)]
pub struct ProfileService {
    catalog: Arc<Catalog>,
    slots: Arc<dyn KeyValueStore>,
}

impl ProfileService {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, slots: Arc<dyn KeyValueStore>) -> Self {
        Self { catalog, slots }
    }

    /// Load the signed-in member, if any.
    ///
    /// An unreadable slot is cleared and treated as signed out.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Storage` if the slot cannot be read or cleared.
    pub async fn current_user(&self) -> Result<Option<User>, ProfileError> {
        let Some(raw) = self.slots.get(PROFILE_KEY).await? else {
            return Ok(None);
        };

        let decoded = serde_json::from_str::<StoredUser>(&raw)
            .map_err(ProfileError::from)
            .and_then(StoredUser::into_user);
        match decoded {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable profile slot");
                self.slots.remove(PROFILE_KEY).await?;
                Ok(None)
            }
        }
    }

    /// Load-on-boot entry point: read the persisted member once at startup.
    ///
    /// # Errors
    ///
    /// Same as `current_user`.
    pub async fn restore(&self) -> Result<Option<User>, ProfileError> {
        let user = self.current_user().await?;
        match &user {
            Some(u) => tracing::info!(user = %u.id(), "restored signed-in member"),
            None => tracing::debug!("no signed-in member to restore"),
        }
        Ok(user)
    }

    /// Like `current_user`, but signed-out is an error.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NotSignedIn` when nobody is signed in.
    pub async fn require_user(&self) -> Result<User, ProfileError> {
        self.current_user().await?.ok_or(ProfileError::NotSignedIn)
    }

    /// Select a catalog member as the signed-in user and persist it.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::UnknownUser` for ids missing from the catalog.
    pub async fn sign_in(&self, user_id: &UserId) -> Result<User, ProfileError> {
        let user = self
            .catalog
            .user(user_id)
            .cloned()
            .ok_or_else(|| ProfileError::UnknownUser(user_id.clone()))?;
        self.save(&user).await?;
        tracing::info!(user = %user.id(), "member signed in");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `ProfileError::Storage` if the slot cannot be cleared.
    pub async fn sign_out(&self) -> Result<(), ProfileError> {
        self.slots.remove(PROFILE_KEY).await?;
        tracing::info!("member signed out");
        Ok(())
    }

    /// Update the signed-in member's overall progress and persist it.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NotSignedIn`, `ProfileError::User` for values
    /// above 100, or storage failures.
    pub async fn set_progress(&self, progress: u8) -> Result<User, ProfileError> {
        let mut user = self.require_user().await?;
        user.set_progress(progress)?;
        self.save(&user).await?;
        Ok(user)
    }

    async fn save(&self, user: &User) -> Result<(), ProfileError> {
        let encoded = serde_json::to_string(&StoredUser::from_user(user))?;
        self.slots.put(PROFILE_KEY, &encoded).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;

    fn service() -> (ProfileService, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        let catalog = Arc::new(Catalog::sample().unwrap());
        (ProfileService::new(catalog, Arc::new(repo.clone())), repo)
    }

    #[tokio::test]
    async fn sign_in_persists_member_json() {
        let (svc, repo) = service();
        svc.sign_in(&UserId::new("u1")).await.unwrap();

        let raw = repo.get(PROFILE_KEY).await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["id"], "u1");
        assert_eq!(json["role"], "MEMBER");
        assert_eq!(json["progress"], 65);
        assert_eq!(json["joinedAt"], "2023-01-15");

        let restored = svc.current_user().await.unwrap().unwrap();
        assert_eq!(restored.name(), "John Miller");
    }

    #[tokio::test]
    async fn unknown_member_cannot_sign_in() {
        let (svc, _) = service();
        let err = svc.sign_in(&UserId::new("u9")).await.unwrap_err();
        assert!(matches!(err, ProfileError::UnknownUser(_)));
    }

    #[tokio::test]
    async fn sign_out_clears_slot() {
        let (svc, _) = service();
        svc.sign_in(&UserId::new("u2")).await.unwrap();
        svc.sign_out().await.unwrap();
        assert!(svc.current_user().await.unwrap().is_none());
        assert!(matches!(
            svc.require_user().await.unwrap_err(),
            ProfileError::NotSignedIn
        ));
    }

    #[tokio::test]
    async fn corrupt_slot_is_discarded() {
        let (svc, repo) = service();
        repo.put(PROFILE_KEY, "{not json").await.unwrap();

        assert!(svc.current_user().await.unwrap().is_none());
        assert!(repo.get(PROFILE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn out_of_range_progress_in_slot_is_discarded() {
        let (svc, repo) = service();
        repo.put(
            PROFILE_KEY,
            r#"{"id":"u1","name":"John","email":"j@sda.org","role":"MEMBER","progress":140,"joinedAt":"2023-01-15"}"#,
        )
        .await
        .unwrap();

        assert!(svc.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_progress_saves_on_mutation() {
        let (svc, _) = service();
        svc.sign_in(&UserId::new("u1")).await.unwrap();
        svc.set_progress(67).await.unwrap();

        let reloaded = svc.current_user().await.unwrap().unwrap();
        assert_eq!(reloaded.progress(), 67);

        let err = svc.set_progress(101).await.unwrap_err();
        assert!(matches!(err, ProfileError::User(_)));
        assert_eq!(svc.current_user().await.unwrap().unwrap().progress(), 67);
    }
}
