use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_core::model::{ActivityId, ExamResult, LessonId, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// String-keyed slot store used for process-wide state such as the signed-in profile.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ExamResultRepository: Send + Sync {
    /// Persist a finished attempt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the result id already exists.
    async fn append_result(&self, result: &ExamResult) -> Result<(), StorageError>;

    /// Results for a member, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_results(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<ExamResult>, StorageError>;
}

#[async_trait]
pub trait LessonProgressRepository: Send + Sync {
    /// Mark a lesson completed. Returns `false` if it already was.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn mark_completed(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
        completed_at: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn completed_lessons(&self, user_id: &UserId) -> Result<Vec<LessonId>, StorageError>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Register a member for an activity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the member is already registered.
    async fn register(
        &self,
        user_id: &UserId,
        activity_id: &ActivityId,
        registered_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn registered_activities(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ActivityId>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    slots: Arc<Mutex<HashMap<String, String>>>,
    results: Arc<Mutex<Vec<ExamResult>>>,
    completions: Arc<Mutex<HashMap<UserId, Vec<LessonId>>>>,
    registrations: Arc<Mutex<HashMap<UserId, Vec<ActivityId>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self.slots.lock().map_err(poisoned)?;
        Ok(guard.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self.slots.lock().map_err(poisoned)?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self.slots.lock().map_err(poisoned)?;
        guard.remove(key);
        Ok(())
    }
}

#[async_trait]
impl ExamResultRepository for InMemoryRepository {
    async fn append_result(&self, result: &ExamResult) -> Result<(), StorageError> {
        let mut guard = self.results.lock().map_err(poisoned)?;
        if guard.iter().any(|r| r.id == result.id) {
            return Err(StorageError::Conflict);
        }
        guard.push(result.clone());
        Ok(())
    }

    async fn list_results(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<ExamResult>, StorageError> {
        let guard = self.results.lock().map_err(poisoned)?;
        // Reverse insertion order first so ties on `taken_at` stay newest-first.
        let mut found: Vec<ExamResult> = guard
            .iter()
            .rev()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.taken_at.cmp(&a.taken_at));
        found.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(found)
    }
}

#[async_trait]
impl LessonProgressRepository for InMemoryRepository {
    async fn mark_completed(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
        _completed_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let mut guard = self.completions.lock().map_err(poisoned)?;
        let done = guard.entry(user_id.clone()).or_default();
        if done.contains(lesson_id) {
            return Ok(false);
        }
        done.push(lesson_id.clone());
        Ok(true)
    }

    async fn completed_lessons(&self, user_id: &UserId) -> Result<Vec<LessonId>, StorageError> {
        let guard = self.completions.lock().map_err(poisoned)?;
        Ok(guard.get(user_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryRepository {
    async fn register(
        &self,
        user_id: &UserId,
        activity_id: &ActivityId,
        _registered_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.registrations.lock().map_err(poisoned)?;
        let registered = guard.entry(user_id.clone()).or_default();
        if registered.contains(activity_id) {
            return Err(StorageError::Conflict);
        }
        registered.push(activity_id.clone());
        Ok(())
    }

    async fn registered_activities(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ActivityId>, StorageError> {
        let guard = self.registrations.lock().map_err(poisoned)?;
        Ok(guard.get(user_id).cloned().unwrap_or_default())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub slots: Arc<dyn KeyValueStore>,
    pub exam_results: Arc<dyn ExamResultRepository>,
    pub lesson_progress: Arc<dyn LessonProgressRepository>,
    pub registrations: Arc<dyn RegistrationRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            slots: Arc::new(repo.clone()),
            exam_results: Arc::new(repo.clone()),
            lesson_progress: Arc::new(repo.clone()),
            registrations: Arc::new(repo),
        }
    }
}
