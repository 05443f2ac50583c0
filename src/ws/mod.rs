pub mod buffer;
pub mod coordinator;
pub mod directory;
pub mod identity;
pub mod registry;

pub use buffer::SegmentBuffer;
pub use coordinator::{Intent, RoomCoordinator, RoomError, RoomHandle, RoomPhase, RoomStats};
pub use directory::{RoomDirectory, RoomSession, RoomSettings};
pub use identity::IdentityPool;
pub use registry::{BroadcastReport, Delivery, SessionId, SessionRegistry};
