use comms::room::InvalidRoomName;
use thiserror::Error;

pub use self::room_store::RoomStore;
pub use self::room_url::RoomUrlResolver;

#[allow(clippy::module_inception)]
mod room_store;
mod room_url;

/// Reasons the store refuses a mutating operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid room name '{name}': {cause}")]
    InvalidRoomName { name: String, cause: InvalidRoomName },
    #[error("room '{0}' already exists")]
    RoomAlreadyExists(String),
    #[error("room '{0}' not found")]
    RoomNotFound(String),
}
