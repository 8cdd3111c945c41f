use comms::room::RoomConfig;

#[derive(Debug, Clone)]
pub enum Action {
    ConnectToStoreRequest { addr: String },
    /// Register the room with the store, then fetch its join URL
    CreateRoom { name: String, config: RoomConfig },
    /// Read the config of an existing room into the form, then fetch its join URL
    LoadRoomConfig { name: String },
    SaveRoomConfig { name: String, config: RoomConfig },
    JoinCall,
    LeaveCall,
    SendChatMessage { content: String },
    DismissError,
    Exit,
}
