use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest room name accepted by the store
pub const MAX_ROOM_NAME_LEN: usize = 128;

/// Feature toggles governing the call experience of a single room.
///
/// Every flag is required on the wire, only the redirect may be `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoomConfig {
    pub enable_chat: bool,
    pub enable_hand_raising: bool,
    pub enable_screenshare: bool,
    pub enable_recording: bool,
    pub enable_knocking: bool,
    pub enable_prejoin_ui: bool,
    pub enable_people_ui: bool,
    pub enable_network_ui: bool,
    pub enable_emoji_reactions: bool,
    pub owner_only_broadcast: bool,
    pub start_with_video_off: bool,
    pub close_tab_on_exit: bool,
    /// Where participants are sent once they leave the meeting
    pub redirect_on_meeting_exit: Option<String>,
}

/// Why a room name was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRoomName {
    #[error("room name is empty")]
    Empty,
    #[error("room name is longer than {} characters", MAX_ROOM_NAME_LEN)]
    TooLong,
    #[error("room name contains '{0}', only letters, digits, '-' and '_' are allowed")]
    ForbiddenCharacter(char),
}

/// Checks that a room name can be registered and used as a URL path segment.
///
/// Names are taken verbatim, surrounding whitespace is not trimmed away.
pub fn validate_room_name(name: &str) -> Result<(), InvalidRoomName> {
    if name.is_empty() {
        return Err(InvalidRoomName::Empty);
    }

    if name.chars().count() > MAX_ROOM_NAME_LEN {
        return Err(InvalidRoomName::TooLong);
    }

    if let Some(forbidden) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(InvalidRoomName::ForbiddenCharacter(forbidden));
    }

    Ok(())
}
