use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::identity::IdentityPool;
use crate::models::{Identity, ServerMessage};

/// Queue of encoded frames waiting to be written to one socket.
pub type Outbound = mpsc::Sender<Arc<str>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of handing one frame to one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The socket writer is gone.
    Closed,
    /// The session's outbound queue is full; the frame was dropped.
    Lagging,
}

#[derive(Debug, Default)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: Vec<(SessionId, Delivery)>,
}

struct Session {
    id: SessionId,
    identity: Identity,
    outbound: Outbound,
}

/// Live sessions of one room, in registration order.
pub struct SessionRegistry {
    pool: IdentityPool,
    sessions: Vec<Session>,
}

impl SessionRegistry {
    pub fn new(pool: IdentityPool) -> Self {
        Self {
            pool,
            sessions: Vec::new(),
        }
    }

    pub fn register(&mut self, id: SessionId, outbound: Outbound) -> Identity {
        let identity = self.pool.assign();
        self.sessions.push(Session {
            id,
            identity: identity.clone(),
            outbound,
        });
        identity
    }

    /// Drop the session and hand its name back to the pool, unless another
    /// live session still shares that name.
    pub fn unregister(&mut self, id: SessionId) -> Option<Identity> {
        let pos = self.sessions.iter().position(|s| s.id == id)?;
        let session = self.sessions.remove(pos);
        if !self.sessions.iter().any(|s| s.identity.name == session.identity.name) {
            self.pool.release(&session.identity.name);
        }
        Some(session.identity)
    }

    pub fn identity_of(&self, id: SessionId) -> Option<&Identity> {
        self.sessions.iter().find(|s| s.id == id).map(|s| &s.identity)
    }

    pub fn list_identities(&self) -> Vec<Identity> {
        self.sessions.iter().map(|s| s.identity.clone()).collect()
    }

    pub fn names_in_use(&self) -> usize {
        self.pool.in_use()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn send_to(&self, id: SessionId, message: &ServerMessage) -> Delivery {
        let Some(session) = self.sessions.iter().find(|s| s.id == id) else {
            return Delivery::Closed;
        };
        match encode(message) {
            Some(frame) => deliver(&session.outbound, frame),
            None => Delivery::Closed,
        }
    }

    /// Send `message` to every session except `excluding`. A failing
    /// recipient never stops delivery to the others.
    pub fn broadcast(&self, message: &ServerMessage, excluding: Option<SessionId>) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let Some(frame) = encode(message) else {
            return report;
        };

        for session in self.sessions.iter().filter(|s| Some(s.id) != excluding) {
            match deliver(&session.outbound, frame.clone()) {
                Delivery::Delivered => report.delivered += 1,
                failure => {
                    debug!("Delivery to session {} failed: {:?}", session.id, failure);
                    report.failed.push((session.id, failure));
                }
            }
        }
        report
    }
}

fn encode(message: &ServerMessage) -> Option<Arc<str>> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Arc::from(json)),
        Err(e) => {
            error!("Failed to encode server message: {}", e);
            None
        }
    }
}

fn deliver(outbound: &Outbound, frame: Arc<str>) -> Delivery {
    match outbound.try_send(frame) {
        Ok(()) => Delivery::Delivered,
        Err(TrySendError::Closed(_)) => Delivery::Closed,
        Err(TrySendError::Full(_)) => {
            warn!("Outbound queue full, dropping frame");
            Delivery::Lagging
        }
    }
}
