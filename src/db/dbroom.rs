use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::Error as SqlxError;
use std::time::Duration;
use tracing::{debug, error, info};

use super::store::{RoomStore, StoreError};
use crate::models::Segment;

/// Persisted room row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoomStateRow {
    pub room_id: String,
    pub segments: Json<Vec<Segment>>,
    pub updated_at: DateTime<Utc>,
}

/// Postgres-backed room store
pub struct PgRoomStore {
    pool: PgPool,
}

impl PgRoomStore {
    /// Create a new connection pool and make sure the `room_state` table exists
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    pub async fn connect(database_url: &str) -> Result<Self, SqlxError> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await?;

        info!("Database connection pool created successfully");

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), SqlxError> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS room_state (
                room_id    TEXT PRIMARY KEY,
                segments   JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;
        sqlx::query(ddl).execute(&self.pool).await?;
        Ok(())
    }

    /// Fetch the raw row for a room
    pub async fn fetch_room(&self, room_id: &str) -> Result<Option<RoomStateRow>, SqlxError> {
        let query_sql = r#"
            SELECT room_id, segments, updated_at
            FROM room_state
            WHERE room_id = $1
        "#;

        sqlx::query_as::<_, RoomStateRow>(query_sql)
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[async_trait]
impl RoomStore for PgRoomStore {
    async fn load_segments(&self, room_id: &str) -> Result<Option<Vec<Segment>>, StoreError> {
        match self.fetch_room(room_id).await {
            Ok(Some(row)) => {
                debug!("Loaded room {} (last saved {})", row.room_id, row.updated_at);
                Ok(Some(row.segments.0))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                error!("Failed to load room {}: {}", room_id, e);
                Err(e.into())
            }
        }
    }

    async fn save_segments(&self, room_id: &str, segments: &[Segment]) -> Result<(), StoreError> {
        let query_sql = r#"
            INSERT INTO room_state (room_id, segments, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (room_id)
            DO UPDATE SET segments = EXCLUDED.segments, updated_at = EXCLUDED.updated_at
        "#;

        sqlx::query(query_sql)
            .bind(room_id)
            .bind(Json(segments))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
