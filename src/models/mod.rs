pub mod app_state;
pub mod error;
pub mod messages;
pub mod room;

// Re-export important types
pub use app_state::RoomRegistry;
pub use error::GameError;
