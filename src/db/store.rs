use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::Segment;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable home of each room's segment list, keyed by room id.
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// `Ok(None)` when the room has never been saved.
    async fn load_segments(&self, room_id: &str) -> Result<Option<Vec<Segment>>, StoreError>;

    /// Replace the stored segment list for `room_id`.
    async fn save_segments(&self, room_id: &str, segments: &[Segment]) -> Result<(), StoreError>;

    /// Reachability check used by the readiness endpoint.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str;
}

/// Process-local store. Rooms are kept as serialized JSON blobs so that a
/// reload goes through the same encoding as the database backend.
#[derive(Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn load_segments(&self, room_id: &str) -> Result<Option<Vec<Segment>>, StoreError> {
        let blobs = self.blobs.read().await;
        match blobs.get(room_id) {
            Some(blob) => Ok(Some(serde_json::from_str(blob)?)),
            None => Ok(None),
        }
    }

    async fn save_segments(&self, room_id: &str, segments: &[Segment]) -> Result<(), StoreError> {
        let blob = serde_json::to_string(segments)?;
        self.blobs.write().await.insert(room_id.to_string(), blob);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identity;

    #[tokio::test]
    async fn missing_room_loads_as_none() {
        let store = MemoryStore::new();
        assert!(store.load_segments("shared-terminal").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_replaces_previous_blob() {
        let store = MemoryStore::new();
        let dina = Identity::new("Dina", "#4ecdc4");
        store
            .save_segments("room", &[Segment::authored_by(&dina, "one")])
            .await
            .unwrap();
        store
            .save_segments("room", &[Segment::authored_by(&dina, "two"), Segment::authored_by(&dina, "\n")])
            .await
            .unwrap();

        let loaded = store.load_segments("room").await.unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].text, "two");
        assert!(store.load_segments("other").await.unwrap().is_none());
    }
}
