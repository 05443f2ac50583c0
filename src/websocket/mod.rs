pub mod handler;

pub use handler::shared_room_gateway;
