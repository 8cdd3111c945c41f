use comms::{
    client::{RoomStoreClient, StoreCallError},
    reply::FailureReason,
    room::{validate_room_name, RoomConfig},
};

use super::State;

/// Keeps the error if the connection can not be used anymore, swallows it otherwise.
/// Everything the user has to know about the failure is already on the state.
fn keep_connection_error(err: StoreCallError) -> Result<(), StoreCallError> {
    match err {
        StoreCallError::Rejected { .. } | StoreCallError::UnexpectedReply(_) => Ok(()),
        StoreCallError::Transport(err) if err.is_malformed_line() => Ok(()),
        err => Err(err),
    }
}

/// Rejects the room name before anything is sent to the store
pub(super) fn check_room_name(state: &mut State, name: &str) -> bool {
    match validate_room_name(name) {
        Ok(()) => true,
        Err(cause) => {
            state.raise_error(format!("Invalid room name: {}.", cause));
            false
        }
    }
}

async fn fetch_room_url(
    state: &mut State,
    client: &mut RoomStoreClient,
    name: &str,
    config: RoomConfig,
) -> Result<(), StoreCallError> {
    match client.get_room_url(name).await {
        Ok(url) if url.trim().is_empty() => {
            state.forget_room_url();
            state.raise_error("Invalid room URL. Please try again.");
            Ok(())
        }
        Ok(url) => {
            log::info!("room '{}' is reachable at {}", name, url);
            state.room_prepared(name, config, url);
            Ok(())
        }
        Err(err) => {
            log::warn!("could not fetch the url of room '{}': {}", name, err);
            // the previous room must not be joined with the settings of this one
            state.forget_room_url();
            state.raise_error("Failed to fetch room URL. Please try again.");
            keep_connection_error(err)
        }
    }
}

/// Registers the room with the store and prepares its join URL
pub(super) async fn create_room(
    state: &mut State,
    client: &mut RoomStoreClient,
    name: &str,
    config: RoomConfig,
) -> Result<(), StoreCallError> {
    if let Err(err) = client.create_room(name, &config).await {
        log::warn!("could not create room '{}': {}", name, err);
        state.raise_error(match &err {
            StoreCallError::Rejected {
                reason: FailureReason::RoomAlreadyExists,
                ..
            } => format!("A room named '{}' already exists. Load it instead.", name),
            _ => String::from("Failed to create the room. Please try again."),
        });

        return keep_connection_error(err);
    }

    state.set_notice(format!("Room '{}' created.", name));
    fetch_room_url(state, client, name, config).await
}

/// Reads the stored config into the form and prepares the join URL of the room
pub(super) async fn load_room_config(
    state: &mut State,
    client: &mut RoomStoreClient,
    name: &str,
) -> Result<(), StoreCallError> {
    match client.get_room_config(name).await {
        Ok(Some(config)) => {
            state.room_config_loaded(name, config.clone());
            state.set_notice(format!("Loaded the configuration of room '{}'.", name));

            fetch_room_url(state, client, name, config).await
        }
        // absence is a valid answer, there is just nothing to load
        Ok(None) => {
            state.set_notice(format!("No saved configuration for room '{}'.", name));
            Ok(())
        }
        Err(err) => {
            log::warn!("could not load room '{}': {}", name, err);
            state.raise_error("Failed to load the room configuration. Please try again.");
            keep_connection_error(err)
        }
    }
}

/// Replaces the stored config of an existing room
pub(super) async fn save_room_config(
    state: &mut State,
    client: &mut RoomStoreClient,
    name: &str,
    config: RoomConfig,
) -> Result<(), StoreCallError> {
    match client.update_room_config(name, &config).await {
        Ok(()) => {
            if state.room_name == name {
                state.room_config = config;
            }
            state.set_notice(format!("Saved the configuration of room '{}'.", name));
            Ok(())
        }
        Err(err) => {
            log::warn!("could not save room '{}': {}", name, err);
            state.raise_error(match &err {
                StoreCallError::Rejected {
                    reason: FailureReason::RoomNotFound,
                    ..
                } => format!("Room '{}' does not exist yet. Create it first.", name),
                _ => String::from("Failed to save the room configuration. Please try again."),
            });

            keep_connection_error(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::{TcpListener, TcpStream};

    use super::*;
    use crate::state_store::fake_store::{connect_fake_store, ROOM_WITHOUT_URL};

    fn chat_config() -> RoomConfig {
        RoomConfig {
            enable_chat: true,
            enable_knocking: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_invalid_room_name_is_reported() {
        let mut state = State::default();

        assert!(!check_room_name(&mut state, ""));
        assert!(state.error.is_some());

        state.dismiss_error();
        assert!(check_room_name(&mut state, "team-sync"));
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_create_room_prepares_url() {
        let mut client = connect_fake_store().await;
        let mut state = State::default();

        create_room(&mut state, &mut client, "team-sync", chat_config())
            .await
            .unwrap();

        assert_eq!(state.error, None);
        assert_eq!(state.room_name, "team-sync");
        assert_eq!(state.room_config, chat_config());
        assert!(state.room_url.as_ref().unwrap().contains("team-sync"));
    }

    #[tokio::test]
    async fn test_duplicate_create_shows_error_and_keeps_connection() {
        let mut client = connect_fake_store().await;
        let mut state = State::default();

        create_room(&mut state, &mut client, "team-sync", chat_config())
            .await
            .unwrap();
        state.room_url = None;

        let result = create_room(&mut state, &mut client, "team-sync", chat_config()).await;

        assert!(result.is_ok());
        assert!(state.error.unwrap().message.contains("already exists"));
        assert_eq!(state.room_url, None);
    }

    #[tokio::test]
    async fn test_load_missing_room_is_not_an_error() {
        let mut client = connect_fake_store().await;
        let mut state = State::default();

        load_room_config(&mut state, &mut client, "nonexistent")
            .await
            .unwrap();

        assert_eq!(state.error, None);
        assert_eq!(state.room_config_revision, 0);
        assert_eq!(state.room_url, None);
        assert!(state.notice.unwrap().contains("No saved configuration"));
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips_through_the_store() {
        let mut client = connect_fake_store().await;
        let mut state = State::default();
        let updated = RoomConfig {
            enable_recording: true,
            ..chat_config()
        };

        create_room(&mut state, &mut client, "team-sync", chat_config())
            .await
            .unwrap();
        save_room_config(&mut state, &mut client, "team-sync", updated.clone())
            .await
            .unwrap();

        let mut fresh_state = State::default();
        load_room_config(&mut fresh_state, &mut client, "team-sync")
            .await
            .unwrap();

        assert_eq!(fresh_state.room_config, updated);
        assert_eq!(fresh_state.room_config_revision, 1);
        assert!(fresh_state.room_url.is_some());
    }

    #[tokio::test]
    async fn test_save_unknown_room_shows_error() {
        let mut client = connect_fake_store().await;
        let mut state = State::default();

        save_room_config(&mut state, &mut client, "nonexistent", chat_config())
            .await
            .unwrap();

        assert!(state.error.unwrap().message.contains("does not exist"));
    }

    #[tokio::test]
    async fn test_failed_url_fetch_forgets_the_previous_room_url() {
        let mut client = connect_fake_store().await;
        let mut state = State::default();

        create_room(&mut state, &mut client, "team-sync", chat_config())
            .await
            .unwrap();
        assert!(state.room_url.is_some());

        create_room(
            &mut state,
            &mut client,
            ROOM_WITHOUT_URL,
            RoomConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(state.room_url, None);
        assert_eq!(
            state.error.unwrap().message,
            "Failed to fetch room URL. Please try again."
        );
    }

    #[tokio::test]
    async fn test_closed_connection_is_returned() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // accept and hang up right away
            let _ = listener.accept().await;
        });
        let mut client = RoomStoreClient::new(TcpStream::connect(addr).await.unwrap());
        let mut state = State::default();

        let result = create_room(&mut state, &mut client, "team-sync", chat_config()).await;

        assert!(result.is_err());
        assert!(state.error.is_some());
        assert_eq!(state.room_url, None);
    }
}
