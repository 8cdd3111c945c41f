use serde::{Deserialize, Serialize};

use crate::room::RoomConfig;

/// Command for registering a new room with its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRoomCommand {
    pub name: String,
    pub config: RoomConfig,
}

/// Command for reading the stored configuration of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetRoomConfigCommand {
    pub name: String,
}

/// Command for replacing the configuration of an existing room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRoomConfigCommand {
    pub name: String,
    pub config: RoomConfig,
}

/// Command for deriving the join URL of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetRoomUrlCommand {
    pub name: String,
}

/// Command for ending the store session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuitCommand;

/// A command which can be sent to the room store by a single client session.
/// Every command except [StoreCommand::Quit] is answered with exactly one [crate::reply::Reply].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_ct", rename_all = "snake_case")]
pub enum StoreCommand {
    CreateRoom(CreateRoomCommand),
    GetRoomConfig(GetRoomConfigCommand),
    UpdateRoomConfig(UpdateRoomConfigCommand),
    GetRoomUrl(GetRoomUrlCommand),
    Quit(QuitCommand),
}
