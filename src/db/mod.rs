pub mod dbroom;
pub mod store;

pub use dbroom::PgRoomStore;
pub use store::{MemoryStore, RoomStore, StoreError};
