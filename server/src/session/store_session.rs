use comms::{
    command::StoreCommand,
    reply::{self, FailureReason, Reply},
};

use crate::room_store::{RoomStore, StoreError};

impl From<&StoreError> for FailureReason {
    fn from(err: &StoreError) -> Self {
        match err {
            StoreError::InvalidRoomName { .. } => FailureReason::InvalidRoomName,
            StoreError::RoomAlreadyExists(_) => FailureReason::RoomAlreadyExists,
            StoreError::RoomNotFound(_) => FailureReason::RoomNotFound,
        }
    }
}

fn failure_reply(session_id: &str, err: StoreError) -> Reply {
    log::warn!("[{}] {}", session_id, err);

    Reply::failure(FailureReason::from(&err), err.to_string())
}

/// Runs a single command against the store and builds the reply for it.
/// Returns `None` for [StoreCommand::Quit], which is never answered.
pub(super) async fn handle_store_command(
    session_id: &str,
    room_store: &RoomStore,
    cmd: StoreCommand,
) -> Option<Reply> {
    let reply = match cmd {
        StoreCommand::CreateRoom(cmd) => {
            match room_store.create_room(&cmd.name, cmd.config).await {
                Ok(()) => Reply::RoomCreated(reply::RoomCreatedReply { name: cmd.name }),
                Err(err) => failure_reply(session_id, err),
            }
        }
        StoreCommand::GetRoomConfig(cmd) => Reply::RoomConfig(reply::RoomConfigReply {
            config: room_store.get_room_config(&cmd.name).await,
            name: cmd.name,
        }),
        StoreCommand::UpdateRoomConfig(cmd) => {
            match room_store.update_room_config(&cmd.name, cmd.config).await {
                Ok(()) => Reply::RoomConfigUpdated(reply::RoomConfigUpdatedReply { name: cmd.name }),
                Err(err) => failure_reply(session_id, err),
            }
        }
        StoreCommand::GetRoomUrl(cmd) => Reply::RoomUrl(reply::RoomUrlReply {
            url: room_store.get_room_url(&cmd.name),
            name: cmd.name,
        }),
        StoreCommand::Quit(_) => return None,
    };

    Some(reply)
}

#[cfg(test)]
mod tests {
    use comms::{command, room::RoomConfig};

    use super::*;
    use crate::room_store::RoomUrlResolver;

    fn store() -> RoomStore {
        RoomStore::new(RoomUrlResolver::new("https://meetlink.daily.co"))
    }

    fn create(name: &str) -> StoreCommand {
        StoreCommand::CreateRoom(command::CreateRoomCommand {
            name: name.into(),
            config: RoomConfig::default(),
        })
    }

    #[tokio::test]
    async fn test_create_room_replies_created() {
        let store = store();

        assert_eq!(
            handle_store_command("s", &store, create("team-sync")).await,
            Some(Reply::RoomCreated(reply::RoomCreatedReply {
                name: "team-sync".into()
            }))
        );
    }

    #[tokio::test]
    async fn test_store_errors_become_failure_replies() {
        let store = store();

        handle_store_command("s", &store, create("team-sync")).await;

        let duplicate = handle_store_command("s", &store, create("team-sync")).await;
        assert!(matches!(
            duplicate,
            Some(Reply::Failure(reply::FailureReply {
                reason: FailureReason::RoomAlreadyExists,
                ..
            }))
        ));

        let invalid = handle_store_command("s", &store, create("")).await;
        assert!(matches!(
            invalid,
            Some(Reply::Failure(reply::FailureReply {
                reason: FailureReason::InvalidRoomName,
                ..
            }))
        ));

        let update = handle_store_command(
            "s",
            &store,
            StoreCommand::UpdateRoomConfig(command::UpdateRoomConfigCommand {
                name: "nonexistent".into(),
                config: RoomConfig::default(),
            }),
        )
        .await;
        assert!(matches!(
            update,
            Some(Reply::Failure(reply::FailureReply {
                reason: FailureReason::RoomNotFound,
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn test_missing_config_is_not_a_failure() {
        let store = store();

        assert_eq!(
            handle_store_command(
                "s",
                &store,
                StoreCommand::GetRoomConfig(command::GetRoomConfigCommand {
                    name: "nonexistent".into()
                }),
            )
            .await,
            Some(Reply::RoomConfig(reply::RoomConfigReply {
                name: "nonexistent".into(),
                config: None,
            }))
        );
    }

    #[tokio::test]
    async fn test_quit_is_not_answered() {
        let store = store();

        assert_eq!(
            handle_store_command("s", &store, StoreCommand::Quit(command::QuitCommand)).await,
            None
        );
    }
}
