//! Serialized per-room actor.
//!
//! One task owns a room's [`SegmentBuffer`] and [`SessionRegistry`] and
//! drains a single command queue, so every join, intent and leave is
//! applied strictly one at a time in arrival order. Each accepted intent is
//! persisted before it is broadcast.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::buffer::SegmentBuffer;
use super::identity::IdentityPool;
use super::registry::{Outbound, SessionId, SessionRegistry};
use crate::db::RoomStore;
use crate::models::{ClientMessage, InitMessage, ServerMessage};

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("room {0} is not accepting commands")]
    Unavailable(String),
}

/// A client-originated mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Append(String),
    Backspace,
    Clear,
}

impl From<ClientMessage> for Intent {
    fn from(message: ClientMessage) -> Self {
        match message {
            ClientMessage::Append(append) => Intent::Append(append.text),
            ClientMessage::Backspace => Intent::Backspace,
            ClientMessage::Clear => Intent::Clear,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoomPhase {
    Loading,
    Ready,
    Disposed,
}

#[derive(Clone, Debug)]
pub struct RoomStats {
    pub room_id: String,
    pub phase: RoomPhase,
    pub sessions: usize,
    pub segments: usize,
    pub chars: usize,
    /// Roster names currently reserved by live sessions.
    pub names_in_use: usize,
}

pub enum RoomCommand {
    Join {
        outbound: Outbound,
        reply: oneshot::Sender<SessionId>,
    },
    Intent {
        session: SessionId,
        intent: Intent,
    },
    Leave {
        session: SessionId,
    },
    Stats {
        reply: oneshot::Sender<RoomStats>,
    },
}

/// Cloneable entry point to a running coordinator.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: Arc<str>,
    commands: mpsc::UnboundedSender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// `true` once the coordinator has been disposed.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Register a new session whose frames go to `outbound`. The `init`
    /// frame is queued on `outbound` before this returns.
    pub async fn join(&self, outbound: Outbound) -> Result<SessionId, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Join { outbound, reply })?;
        rx.await.map_err(|_| self.unavailable())
    }

    pub fn submit(&self, session: SessionId, intent: Intent) -> Result<(), RoomError> {
        self.send(RoomCommand::Intent { session, intent })
    }

    /// Fire-and-forget; a disposed coordinator has no sessions left to drop.
    pub fn leave(&self, session: SessionId) {
        let _ = self.send(RoomCommand::Leave { session });
    }

    pub async fn stats(&self) -> Result<RoomStats, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Stats { reply })?;
        rx.await.map_err(|_| self.unavailable())
    }

    fn send(&self, command: RoomCommand) -> Result<(), RoomError> {
        self.commands.send(command).map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.to_string())
    }
}

pub struct RoomCoordinator {
    room_id: Arc<str>,
    phase: RoomPhase,
    buffer: SegmentBuffer,
    registry: SessionRegistry,
    store: Arc<dyn RoomStore>,
    idle_timeout: Duration,
}

impl RoomCoordinator {
    /// Start a coordinator task for `room_id`. It loads persisted segments
    /// before serving any queued command.
    pub fn spawn(
        room_id: &str,
        store: Arc<dyn RoomStore>,
        pool: IdentityPool,
        idle_timeout: Duration,
    ) -> RoomHandle {
        let room_id: Arc<str> = Arc::from(room_id);
        let (commands, rx) = mpsc::unbounded_channel();

        let coordinator = RoomCoordinator {
            room_id: room_id.clone(),
            phase: RoomPhase::Loading,
            buffer: SegmentBuffer::new(),
            registry: SessionRegistry::new(pool),
            store,
            idle_timeout,
        };
        tokio::spawn(coordinator.run(rx));

        RoomHandle { room_id, commands }
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<RoomCommand>) {
        match self.store.load_segments(&self.room_id).await {
            Ok(segments) => {
                self.buffer = SegmentBuffer::from_segments(segments.unwrap_or_default());
                self.phase = RoomPhase::Ready;
                info!(
                    "Room {} activated with {} segments ({} backend)",
                    self.room_id,
                    self.buffer.len(),
                    self.store.backend()
                );
            }
            Err(e) => {
                error!("Failed to load room {}: {}", self.room_id, e);
                self.dispose(&mut rx);
                return;
            }
        }

        // Set while the room has no sessions; only a join clears it.
        let mut idle_deadline = Some(Instant::now() + self.idle_timeout);
        loop {
            let next = match idle_deadline {
                Some(deadline) => tokio::select! {
                    next = rx.recv() => next,
                    _ = tokio::time::sleep_until(deadline) => {
                        info!("Room {} idle for {:?}, disposing", self.room_id, self.idle_timeout);
                        break;
                    }
                },
                None => rx.recv().await,
            };

            match next {
                Some(command) => self.handle(command).await,
                None => break,
            }

            idle_deadline = match (self.registry.is_empty(), idle_deadline) {
                (false, _) => None,
                (true, Some(deadline)) => Some(deadline),
                (true, None) => Some(Instant::now() + self.idle_timeout),
            };
        }

        self.dispose(&mut rx);
    }

    async fn handle(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::Join { outbound, reply } => self.on_join(outbound, reply),
            RoomCommand::Intent { session, intent } => self.on_intent(session, intent).await,
            RoomCommand::Leave { session } => self.on_leave(session),
            RoomCommand::Stats { reply } => {
                let _ = reply.send(self.stats());
            }
        }
    }

    fn on_join(&mut self, outbound: Outbound, reply: oneshot::Sender<SessionId>) {
        let session = SessionId::new();
        if reply.send(session).is_err() {
            debug!("Join for room {} abandoned before registration", self.room_id);
            return;
        }

        let you = self.registry.register(session, outbound);
        info!("Session {} joined room {} as {}", session, self.room_id, you.name);

        let init = ServerMessage::Init(InitMessage {
            segments: self.buffer.snapshot().to_vec(),
            you,
            users: self.registry.list_identities(),
        });
        self.registry.send_to(session, &init);

        let users = ServerMessage::users(self.registry.list_identities());
        self.registry.broadcast(&users, None);
    }

    async fn on_intent(&mut self, session: SessionId, intent: Intent) {
        let Some(identity) = self.registry.identity_of(session).cloned() else {
            debug!("Dropping intent from unregistered session {}", session);
            return;
        };

        let mut next = self.buffer.clone();
        let message = match intent {
            Intent::Append(text) => {
                next.append(&identity, &text);
                ServerMessage::segments(next.snapshot().to_vec())
            }
            Intent::Backspace => {
                if !next.backspace() {
                    return;
                }
                ServerMessage::segments(next.snapshot().to_vec())
            }
            Intent::Clear => {
                next.clear();
                ServerMessage::Clear
            }
        };

        if let Err(e) = self.store.save_segments(&self.room_id, next.snapshot()).await {
            error!("Failed to persist room {}, discarding intent: {}", self.room_id, e);
            return;
        }
        self.buffer = next;

        let report = self.registry.broadcast(&message, None);
        if !report.failed.is_empty() {
            warn!(
                "Room {}: update reached {} sessions, {} failed",
                self.room_id,
                report.delivered,
                report.failed.len()
            );
        }
    }

    fn on_leave(&mut self, session: SessionId) {
        let Some(identity) = self.registry.unregister(session) else {
            return;
        };
        info!("Session {} ({}) left room {}", session, identity.name, self.room_id);

        let users = ServerMessage::users(self.registry.list_identities());
        self.registry.broadcast(&users, None);
    }

    fn stats(&self) -> RoomStats {
        RoomStats {
            room_id: self.room_id.to_string(),
            phase: self.phase,
            sessions: self.registry.len(),
            segments: self.buffer.len(),
            chars: self.buffer.char_count(),
            names_in_use: self.registry.names_in_use(),
        }
    }

    /// Stop accepting commands. Queued joins are dropped unanswered so the
    /// caller can retry against a fresh activation.
    fn dispose(&mut self, rx: &mut mpsc::UnboundedReceiver<RoomCommand>) {
        self.phase = RoomPhase::Disposed;
        rx.close();
        while let Ok(command) = rx.try_recv() {
            if let RoomCommand::Stats { reply } = command {
                let _ = reply.send(self.stats());
            }
        }
        info!("Room {} disposed", self.room_id);
    }
}
