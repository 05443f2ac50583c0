use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

use super::coordinator::{RoomCoordinator, RoomError, RoomHandle, RoomStats};
use super::identity::IdentityPool;
use super::registry::SessionId;
use crate::db::RoomStore;

#[derive(Clone, Copy, Debug)]
pub struct RoomSettings {
    /// Frames buffered per session before it counts as lagging.
    pub session_buffer: usize,
    /// How long an empty room stays active.
    pub idle_timeout: Duration,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            session_buffer: 64,
            idle_timeout: Duration::from_secs(300),
        }
    }
}

/// A registered session together with the queue feeding its socket.
pub struct RoomSession {
    pub id: SessionId,
    pub handle: RoomHandle,
    pub outbound: mpsc::Receiver<Arc<str>>,
}

/// Owns at most one live coordinator per room id, activating a fresh one
/// whenever the previous activation has been disposed.
pub struct RoomDirectory {
    rooms: Mutex<HashMap<String, RoomHandle>>,
    store: Arc<dyn RoomStore>,
    settings: RoomSettings,
}

impl RoomDirectory {
    pub fn new(store: Arc<dyn RoomStore>, settings: RoomSettings) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            store,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn RoomStore> {
        &self.store
    }

    /// Handle to the active coordinator for `room_id`.
    pub async fn handle(&self, room_id: &str) -> RoomHandle {
        let mut rooms = self.rooms.lock().await;
        if let Some(handle) = rooms.get(room_id) {
            if !handle.is_closed() {
                return handle.clone();
            }
        }

        info!("Activating room {}", room_id);
        let handle = RoomCoordinator::spawn(
            room_id,
            self.store.clone(),
            IdentityPool::new(),
            self.settings.idle_timeout,
        );
        rooms.insert(room_id.to_string(), handle.clone());
        handle
    }

    /// Register a new session in `room_id`. A join that races with the
    /// room's disposal is retried once against a fresh activation.
    pub async fn join(&self, room_id: &str) -> Result<RoomSession, RoomError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let handle = self.handle(room_id).await;
            let (tx, outbound) = mpsc::channel(self.settings.session_buffer);
            match handle.join(tx).await {
                Ok(id) => return Ok(RoomSession { id, handle, outbound }),
                Err(e) if attempts < 2 => warn!("Join failed, retrying: {}", e),
                Err(e) => return Err(e),
            }
        }
    }

    /// Stats for every active room. Disposed rooms are pruned.
    pub async fn stats(&self) -> Vec<RoomStats> {
        let handles: Vec<RoomHandle> = {
            let mut rooms = self.rooms.lock().await;
            rooms.retain(|_, handle| !handle.is_closed());
            rooms.values().cloned().collect()
        };

        let mut stats = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.stats().await {
                Ok(s) => stats.push(s),
                Err(e) => warn!("Skipping room {} in stats: {}", handle.room_id(), e),
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::ws::coordinator::Intent;

    fn directory(idle_timeout: Duration) -> RoomDirectory {
        RoomDirectory::new(
            Arc::new(MemoryStore::new()),
            RoomSettings {
                session_buffer: 16,
                idle_timeout,
            },
        )
    }

    #[tokio::test]
    async fn same_room_id_resolves_to_one_coordinator() {
        let rooms = directory(Duration::from_secs(60));
        let a = rooms.join("shared").await.unwrap();
        let b = rooms.join("shared").await.unwrap();
        assert_ne!(a.id, b.id);

        let stats = rooms.stats().await;
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].sessions, 2);
    }

    #[tokio::test]
    async fn disposed_room_is_reactivated_with_persisted_content() {
        let rooms = directory(Duration::from_millis(30));
        let mut session = rooms.join("shared").await.unwrap();
        session.handle.submit(session.id, Intent::Append("kept".into())).unwrap();
        // init, users, segments
        for _ in 0..3 {
            session.outbound.recv().await.unwrap();
        }
        session.handle.leave(session.id);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(session.handle.is_closed());
        assert!(rooms.stats().await.is_empty());

        let again = rooms.join("shared").await.unwrap();
        let stats = again.handle.stats().await.unwrap();
        assert_eq!(stats.sessions, 1);
        assert_eq!(stats.chars, 4);
    }
}
