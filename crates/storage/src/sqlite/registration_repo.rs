use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_core::model::{ActivityId, UserId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conflict_or_conn, conn, ser};
use crate::repository::{RegistrationRepository, StorageError};

#[async_trait]
impl RegistrationRepository for SqliteRepository {
    async fn register(
        &self,
        user_id: &UserId,
        activity_id: &ActivityId,
        registered_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO activity_registrations (user_id, activity_id, registered_at)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(user_id.as_str())
        .bind(activity_id.as_str())
        .bind(registered_at)
        .execute(&self.pool)
        .await
        .map_err(conflict_or_conn)?;
        Ok(())
    }

    async fn registered_activities(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ActivityId>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT activity_id
                FROM activity_registrations
                WHERE user_id = ?1
                ORDER BY registered_at ASC, rowid ASC
            ",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("activity_id")
                    .map(ActivityId::new)
                    .map_err(ser)
            })
            .collect()
    }
}
