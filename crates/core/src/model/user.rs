use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

use crate::model::ids::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("user name cannot be empty")]
    EmptyName,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("progress must be within 0..=100, got {0}")]
    InvalidProgress(u8),

    #[error("invalid avatar URL: {0}")]
    InvalidAvatarUrl(String),
}

/// Ministry role of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Member,
    AyLeader,
    Admin,
}

impl UserRole {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            UserRole::Member => "Member",
            UserRole::AyLeader => "AY Leader",
            UserRole::Admin => "Admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// A portal member profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    role: UserRole,
    avatar: Option<String>,
    progress: u8,
    joined_at: NaiveDate,
}

impl User {
    /// Creates a member with zero progress and no avatar.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmptyName` or `UserError::InvalidEmail`.
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        role: UserRole,
        joined_at: NaiveDate,
    ) -> Result<Self, UserError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(UserError::EmptyName);
        }
        let email = email.into().trim().to_owned();
        if !looks_like_email(&email) {
            return Err(UserError::InvalidEmail(email));
        }

        Ok(Self {
            id,
            name,
            email,
            role,
            avatar: None,
            progress: 0,
            joined_at,
        })
    }

    /// Rehydrate a profile from its persisted fields, re-running validation.
    ///
    /// # Errors
    ///
    /// Returns `UserError` if any persisted field is invalid.
    pub fn from_persisted(
        id: UserId,
        name: String,
        email: String,
        role: UserRole,
        avatar: Option<String>,
        progress: u8,
        joined_at: NaiveDate,
    ) -> Result<Self, UserError> {
        let user = Self::new(id, name, email, role, joined_at)?.with_progress(progress)?;
        match avatar {
            Some(url) => user.with_avatar(url),
            None => Ok(user),
        }
    }

    /// # Errors
    ///
    /// Returns `UserError::InvalidAvatarUrl` if `url` does not parse.
    pub fn with_avatar(mut self, url: impl Into<String>) -> Result<Self, UserError> {
        let url = url.into();
        if Url::parse(&url).is_err() {
            return Err(UserError::InvalidAvatarUrl(url));
        }
        self.avatar = Some(url);
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `UserError::InvalidProgress` above 100.
    pub fn with_progress(mut self, progress: u8) -> Result<Self, UserError> {
        self.set_progress(progress)?;
        Ok(self)
    }

    /// Update overall lesson progress (percentage).
    ///
    /// # Errors
    ///
    /// Returns `UserError::InvalidProgress` above 100.
    pub fn set_progress(&mut self, progress: u8) -> Result<(), UserError> {
        if progress > 100 {
            return Err(UserError::InvalidProgress(progress));
        }
        self.progress = progress;
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn role(&self) -> UserRole {
        self.role
    }

    #[must_use]
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    #[must_use]
    pub fn joined_at(&self) -> NaiveDate {
        self.joined_at
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()
    }

    #[test]
    fn progress_above_hundred_is_rejected() {
        let mut user = User::new(
            UserId::new("u1"),
            "John Miller",
            "john.miller@sda.org",
            UserRole::Member,
            joined(),
        )
        .unwrap();
        assert_eq!(user.set_progress(101), Err(UserError::InvalidProgress(101)));
        assert_eq!(user.progress(), 0);
        user.set_progress(65).unwrap();
        assert_eq!(user.progress(), 65);
    }

    #[test]
    fn email_needs_a_domain() {
        let err = User::new(UserId::new("u1"), "John", "john@", UserRole::Member, joined())
            .unwrap_err();
        assert!(matches!(err, UserError::InvalidEmail(_)));
    }

    #[test]
    fn role_labels() {
        assert_eq!(UserRole::AyLeader.to_string(), "AY Leader");
        assert_eq!(UserRole::Admin.label(), "Admin");
    }

    #[test]
    fn from_persisted_validates_avatar() {
        let err = User::from_persisted(
            UserId::new("u1"),
            "John".into(),
            "john@sda.org".into(),
            UserRole::Member,
            Some("not a url".into()),
            10,
            joined(),
        )
        .unwrap_err();
        assert!(matches!(err, UserError::InvalidAvatarUrl(_)));
    }
}
