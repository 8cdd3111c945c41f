use serde::{Deserialize, Serialize};

use crate::room::RoomConfig;

/// The room has been registered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomCreatedReply {
    pub name: String,
}

/// Stored configuration of a room, `None` when nothing is stored under the name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConfigReply {
    pub name: String,
    pub config: Option<RoomConfig>,
}

/// The configuration of the room has been replaced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConfigUpdatedReply {
    pub name: String,
}

/// Join URL derived for a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomUrlReply {
    pub name: String,
    pub url: String,
}

/// Machine readable cause of a failed command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    InvalidRoomName,
    RoomAlreadyExists,
    RoomNotFound,
    BadRequest,
}

/// The command could not be carried out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReply {
    pub reason: FailureReason,
    /// Human readable description of the failure
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
/// Replies that can be sent to the client
/// Replies are sent in the same order as the commands that caused them
pub enum Reply {
    RoomCreated(RoomCreatedReply),
    RoomConfig(RoomConfigReply),
    RoomConfigUpdated(RoomConfigUpdatedReply),
    RoomUrl(RoomUrlReply),
    Failure(FailureReply),
}

impl Reply {
    pub fn failure(reason: FailureReason, message: impl Into<String>) -> Self {
        Reply::Failure(FailureReply {
            reason,
            message: message.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // given a reply enum, and an expect string, asserts that reply is serialized / deserialized appropiately
    fn assert_reply_serialization(reply: &Reply, expected: &str) {
        let serialized = serde_json::to_string(&reply).unwrap();
        assert_eq!(serialized, expected);
        let deserialized: Reply = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, *reply);
    }

    #[test]
    fn test_room_created_reply() {
        let reply = Reply::RoomCreated(RoomCreatedReply {
            name: "team-sync".to_string(),
        });

        assert_reply_serialization(&reply, r#"{"t":"room_created","name":"team-sync"}"#);
    }

    #[test]
    fn test_absent_room_config_reply() {
        let reply = Reply::RoomConfig(RoomConfigReply {
            name: "nonexistent".to_string(),
            config: None,
        });

        assert_reply_serialization(
            &reply,
            r#"{"t":"room_config","name":"nonexistent","config":null}"#,
        );
    }

    #[test]
    fn test_room_url_reply() {
        let reply = Reply::RoomUrl(RoomUrlReply {
            name: "team-sync".to_string(),
            url: "https://meetlink.daily.co/team-sync".to_string(),
        });

        assert_reply_serialization(
            &reply,
            r#"{"t":"room_url","name":"team-sync","url":"https://meetlink.daily.co/team-sync"}"#,
        );
    }

    #[test]
    fn test_failure_reply() {
        let reply = Reply::failure(FailureReason::RoomNotFound, "room 'x' not found");

        assert_reply_serialization(
            &reply,
            r#"{"t":"failure","reason":"room_not_found","message":"room 'x' not found"}"#,
        );
    }
}
