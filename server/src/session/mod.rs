use std::sync::Arc;

use anyhow::Context;
use comms::{
    command::StoreCommand,
    reply::{FailureReason, Reply},
    transport,
};
use nanoid::nanoid;
use tokio::{net::TcpStream, sync::broadcast};
use tokio_stream::StreamExt;

use crate::room_store::RoomStore;

use self::store_session::handle_store_command;

mod store_session;

/// Given a tcp stream and the room store, answers the commands of a single client
/// until the client quits, the tcp stream is closed for some reason, or the server shuts down
pub async fn handle_store_session(
    room_store: Arc<RoomStore>,
    mut quit_rx: broadcast::Receiver<()>,
    stream: TcpStream,
) -> anyhow::Result<()> {
    // Only used to tell sessions apart in the logs
    let session_id = nanoid!(8);
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| String::from("unknown"));
    // Split the tcp stream into a command stream and a reply writer with better ergonomics
    let (mut commands, mut reply_writer) = transport::server::split_tcp_stream(stream);

    log::info!("[{}] session started for {}", session_id, peer);

    loop {
        tokio::select! {
            cmd = commands.next() => match cmd {
                // The client closed the tcp stream or asked to quit, nothing to clean up
                None | Some(Ok(StoreCommand::Quit(_))) => break,
                Some(Ok(cmd)) => {
                    log::debug!("[{}] received {:?}", session_id, cmd);

                    if let Some(reply) = handle_store_command(&session_id, &room_store, cmd).await {
                        reply_writer
                            .write(&reply)
                            .await
                            .context("could not write reply to the client")?;
                    }
                }
                // Only the line is spoiled, answer it and keep serving the client
                Some(Err(err)) if err.is_malformed_line() => {
                    log::warn!("[{}] malformed command: {}", session_id, err);

                    reply_writer
                        .write(&Reply::failure(
                            FailureReason::BadRequest,
                            format!("malformed command: {}", err),
                        ))
                        .await
                        .context("could not write reply to the client")?;
                }
                Some(Err(err)) => {
                    return Err(err).context("could not read command from the client");
                }
            },
            // If the server is shutting down, we can just close the tcp stream
            Ok(_) = quit_rx.recv() => {
                log::info!("[{}] gracefully shutting down session", session_id);
                break;
            }
        }
    }

    log::info!("[{}] session ended", session_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use comms::{
        client::{RoomStoreClient, StoreCallError},
        room::RoomConfig,
    };
    use tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
        net::TcpListener,
    };

    use super::*;
    use crate::room_store::RoomUrlResolver;

    async fn spawn_session() -> (
        std::net::SocketAddr,
        broadcast::Sender<()>,
        tokio::task::JoinHandle<anyhow::Result<()>>,
    ) {
        let room_store = Arc::new(RoomStore::new(RoomUrlResolver::new(
            "https://meetlink.daily.co",
        )));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (quit_tx, quit_rx) = broadcast::channel::<()>(1);

        let handle = tokio::spawn(async move {
            let (socket, _) = listener.accept().await?;

            handle_store_session(room_store, quit_rx, socket).await
        });

        (addr, quit_tx, handle)
    }

    #[tokio::test]
    async fn test_session_serves_all_operations() {
        let (addr, _quit_tx, handle) = spawn_session().await;
        let mut client = RoomStoreClient::connect(addr).await.unwrap();
        let config = RoomConfig {
            enable_chat: true,
            enable_knocking: false,
            ..Default::default()
        };

        client.create_room("team-sync", &config).await.unwrap();
        assert_eq!(
            client.get_room_config("team-sync").await.unwrap(),
            Some(config.clone())
        );
        assert_eq!(client.get_room_config("nonexistent").await.unwrap(), None);

        let updated = RoomConfig {
            enable_hand_raising: true,
            ..config
        };
        client
            .update_room_config("team-sync", &updated)
            .await
            .unwrap();
        assert_eq!(
            client.get_room_config("team-sync").await.unwrap(),
            Some(updated)
        );

        let url = client.get_room_url("team-sync").await.unwrap();
        assert!(url.contains("team-sync"));

        assert!(matches!(
            client
                .update_room_config("nonexistent", &RoomConfig::default())
                .await,
            Err(StoreCallError::Rejected {
                reason: FailureReason::RoomNotFound,
                ..
            })
        ));

        client.quit().await.unwrap();
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_malformed_command_is_answered_and_session_continues() {
        let (addr, _quit_tx, handle) = spawn_session().await;
        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        writer.write_all(b"{\"_ct\":\"nope\"}\r\n").await.unwrap();
        let line = lines.next_line().await.unwrap().unwrap();
        assert!(line.contains(r#""reason":"bad_request""#));

        writer
            .write_all(b"{\"_ct\":\"get_room_url\",\"name\":\"standup\"}\r\n")
            .await
            .unwrap();
        let line = lines.next_line().await.unwrap().unwrap();
        assert_eq!(
            line,
            r#"{"t":"room_url","name":"standup","url":"https://meetlink.daily.co/standup"}"#
        );

        drop(writer);
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_invalid_utf8_command_is_answered_and_session_continues() {
        let (addr, _quit_tx, handle) = spawn_session().await;
        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        writer
            .write_all(b"{\"_ct\":\"get_room_url\",\"name\":\"\xff\xfe\"}\r\n")
            .await
            .unwrap();
        let line = lines.next_line().await.unwrap().unwrap();
        assert!(line.contains(r#""reason":"bad_request""#));

        writer
            .write_all(b"{\"_ct\":\"get_room_url\",\"name\":\"standup\"}\r\n")
            .await
            .unwrap();
        let line = lines.next_line().await.unwrap().unwrap();
        assert_eq!(
            line,
            r#"{"t":"room_url","name":"standup","url":"https://meetlink.daily.co/standup"}"#
        );

        drop(writer);
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_session_ends_on_server_shutdown() {
        let (addr, quit_tx, handle) = spawn_session().await;
        let _client = RoomStoreClient::connect(addr).await.unwrap();

        // the receiver is held by the session task, so the signal is kept until it is polled
        quit_tx.send(()).unwrap();

        assert!(handle.await.unwrap().is_ok());
    }
}
