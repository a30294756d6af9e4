use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;

use crate::models::{Message, Profile};
use crate::services::store::{ProfileStore, StoreError};

/// PostgreSQL-backed registry store
///
/// Profiles are stored as JSONB documents keyed by id, with the email lifted into
/// its own uniquely indexed column for subscription lookups. A sequence column keeps
/// registration order stable across edits.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string and run migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL registry store");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    fn profiles_from_rows(rows: &[sqlx::postgres::PgRow]) -> Result<Vec<Profile>, StoreError> {
        rows.iter()
            .map(|row| -> Result<Profile, StoreError> {
                let Json(profile): Json<Profile> = row.try_get("document")?;
                Ok(profile)
            })
            .collect()
    }
}

#[async_trait]
impl ProfileStore for PostgresStore {
    async fn get_profile(&self, id: &str) -> Result<Profile, StoreError> {
        let query = r#"
            SELECT document
            FROM profiles
            WHERE id = $1
        "#;

        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Profile not found: {}", id)))?;

        let Json(profile): Json<Profile> = row.try_get("document")?;
        Ok(profile)
    }

    /// Uses INSERT ... ON CONFLICT so an edit keeps the original sequence number
    async fn save_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO profiles (id, email, document)
            VALUES ($1, $2, $3)
            ON CONFLICT (id)
            DO UPDATE SET
                email = EXCLUDED.email,
                document = EXCLUDED.document,
                updated_at = NOW()
        "#;

        sqlx::query(query)
            .bind(&profile.id)
            .bind(&profile.email)
            .bind(Json(profile))
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(format!(
                    "Email already registered to another member: {}",
                    profile.email.as_deref().unwrap_or_default()
                )),
                other => other.into(),
            })?;

        tracing::debug!("Saved profile {}", profile.id);
        Ok(())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let query = r#"
            SELECT document
            FROM profiles
            ORDER BY seq ASC
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;
        Self::profiles_from_rows(&rows)
    }

    async fn merge_profiles(&self, profiles: &[Profile]) -> Result<usize, StoreError> {
        let query = r#"
            INSERT INTO profiles (id, email, document)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
        "#;

        let mut tx = self.pool.begin().await?;
        let mut added = 0;
        for profile in profiles {
            let result = sqlx::query(query)
                .bind(&profile.id)
                .bind(&profile.email)
                .bind(Json(profile))
                .execute(&mut *tx)
                .await?;
            added += result.rows_affected() as usize;
        }
        tx.commit().await?;

        tracing::info!("Merged {} new profiles into the registry", added);
        Ok(added)
    }

    /// Likes go with the profile through ON DELETE CASCADE, messages are removed here
    async fn delete_profile(&self, id: &str) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM messages WHERE sender_id = $1 OR recipient_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_like(&self, liker_id: &str, liked_id: &str) -> Result<bool, StoreError> {
        let query = r#"
            INSERT INTO likes (liker_id, liked_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (liker_id, liked_id) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(liker_id)
            .bind(liked_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn likes_received(&self, id: &str) -> Result<Vec<Profile>, StoreError> {
        let query = r#"
            SELECT p.document
            FROM likes l
            JOIN profiles p ON p.id = l.liker_id
            WHERE l.liked_id = $1
            ORDER BY l.created_at ASC
        "#;

        let rows = sqlx::query(query).bind(id).fetch_all(&self.pool).await?;
        Self::profiles_from_rows(&rows)
    }

    async fn likes_sent(&self, id: &str) -> Result<Vec<Profile>, StoreError> {
        let query = r#"
            SELECT p.document
            FROM likes l
            JOIN profiles p ON p.id = l.liked_id
            WHERE l.liker_id = $1
            ORDER BY l.created_at ASC
        "#;

        let rows = sqlx::query(query).bind(id).fetch_all(&self.pool).await?;
        Self::profiles_from_rows(&rows)
    }

    async fn send_message(&self, message: &Message) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO messages (id, sender_id, recipient_id, body, sent_at)
            VALUES ($1, $2, $3, $4, $5)
        "#;

        sqlx::query(query)
            .bind(message.id)
            .bind(&message.sender_id)
            .bind(&message.recipient_id)
            .bind(&message.text)
            .bind(message.timestamp)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn conversation(&self, a: &str, b: &str) -> Result<Vec<Message>, StoreError> {
        let query = r#"
            SELECT id, sender_id, recipient_id, body, sent_at
            FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY sent_at ASC
        "#;

        let rows = sqlx::query(query)
            .bind(a)
            .bind(b)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<Message, StoreError> {
                Ok(Message {
                    id: row.try_get("id")?,
                    sender_id: row.try_get("sender_id")?,
                    recipient_id: row.try_get("recipient_id")?,
                    text: row.try_get("body")?,
                    timestamp: row.try_get("sent_at")?,
                })
            })
            .collect()
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }

    async fn claim_payment_reference(
        &self,
        reference: &str,
        profile_id: &str,
    ) -> Result<bool, StoreError> {
        let query = r#"
            INSERT INTO payment_references (reference, profile_id)
            VALUES ($1, $2)
            ON CONFLICT (reference) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(reference)
            .bind(profile_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError> {
        let query = r#"
            SELECT document
            FROM profiles
            WHERE lower(email) = lower($1)
        "#;

        sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| -> Result<Profile, StoreError> {
                let Json(profile): Json<Profile> = row.try_get("document")?;
                Ok(profile)
            })
            .transpose()
    }
}
