//! Shared typing room: every connection joins one room, gets a roster
//! name and color, and sees the whole room's text as authored runs.

pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod utils;
pub mod websocket;
pub mod ws;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

use config::Config;
use db::{MemoryStore, PgRoomStore, RoomStore};
use ws::RoomDirectory;

/// State shared by every handler
pub struct AppState {
    pub config: Config,
    pub rooms: RoomDirectory,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn RoomStore>) -> Self {
        let rooms = RoomDirectory::new(store, config.room_settings());
        Self {
            config,
            rooms,
            started_at: Utc::now(),
        }
    }
}

/// Pick the persistence backend from the configuration. Falls back to the
/// in-memory store when no database is configured or reachable.
pub async fn open_store(config: &Config) -> Arc<dyn RoomStore> {
    let Some(db_url) = &config.db_url else {
        warn!("No database URL configured - room content will not survive restarts");
        return Arc::new(MemoryStore::new());
    };

    match PgRoomStore::connect(db_url).await {
        Ok(store) => {
            info!("Database initialized successfully");
            Arc::new(store)
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            warn!("Falling back to in-memory room storage");
            Arc::new(MemoryStore::new())
        }
    }
}
