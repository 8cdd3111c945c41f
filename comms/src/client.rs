use thiserror::Error;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_stream::StreamExt;

use crate::{
    command::{self, StoreCommand},
    reply::{FailureReason, Reply},
    room::RoomConfig,
    transport::{
        self,
        client::{CommandWriter, ReplyStream},
        TransportError,
    },
};

/// Failure of a single call to the room store
#[derive(Debug, Error)]
pub enum StoreCallError {
    /// The store understood the call and refused it
    #[error("room store rejected the call: {message}")]
    Rejected {
        reason: FailureReason,
        message: String,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("room store closed the connection")]
    ConnectionClosed,
    /// The store answered with a reply that does not belong to the call
    #[error("unexpected reply from the room store: {0}")]
    UnexpectedReply(String),
}

/// [RoomStoreClient] turns the command/reply transport into plain async calls.
///
/// Only one call is in flight at a time, the store answers in command order
/// so the next reply on the stream always belongs to the last command written.
pub struct RoomStoreClient {
    replies: ReplyStream,
    commands: CommandWriter,
}

impl RoomStoreClient {
    pub fn new(stream: TcpStream) -> Self {
        let (replies, commands) = transport::client::split_tcp_stream(stream);

        RoomStoreClient { replies, commands }
    }

    /// Connects to the room store listening on the given address
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, StoreCallError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(TransportError::from)?;

        Ok(RoomStoreClient::new(stream))
    }

    async fn call(&mut self, command: StoreCommand) -> Result<Reply, StoreCallError> {
        log::debug!("sending {:?}", command);
        self.commands.write(&command).await?;

        match self.replies.next().await {
            Some(Ok(Reply::Failure(failure))) => Err(StoreCallError::Rejected {
                reason: failure.reason,
                message: failure.message,
            }),
            Some(Ok(reply)) => Ok(reply),
            Some(Err(err)) => Err(err.into()),
            None => Err(StoreCallError::ConnectionClosed),
        }
    }

    /// Registers `config` under `name`
    pub async fn create_room(
        &mut self,
        name: &str,
        config: &RoomConfig,
    ) -> Result<(), StoreCallError> {
        let reply = self
            .call(StoreCommand::CreateRoom(command::CreateRoomCommand {
                name: name.to_string(),
                config: config.clone(),
            }))
            .await?;

        match reply {
            Reply::RoomCreated(_) => Ok(()),
            other => Err(StoreCallError::UnexpectedReply(format!("{:?}", other))),
        }
    }

    /// Reads the stored config, `None` is a valid answer for rooms without one
    pub async fn get_room_config(
        &mut self,
        name: &str,
    ) -> Result<Option<RoomConfig>, StoreCallError> {
        let reply = self
            .call(StoreCommand::GetRoomConfig(command::GetRoomConfigCommand {
                name: name.to_string(),
            }))
            .await?;

        match reply {
            Reply::RoomConfig(reply) => Ok(reply.config),
            other => Err(StoreCallError::UnexpectedReply(format!("{:?}", other))),
        }
    }

    /// Replaces the config of an existing room
    pub async fn update_room_config(
        &mut self,
        name: &str,
        config: &RoomConfig,
    ) -> Result<(), StoreCallError> {
        let reply = self
            .call(StoreCommand::UpdateRoomConfig(
                command::UpdateRoomConfigCommand {
                    name: name.to_string(),
                    config: config.clone(),
                },
            ))
            .await?;

        match reply {
            Reply::RoomConfigUpdated(_) => Ok(()),
            other => Err(StoreCallError::UnexpectedReply(format!("{:?}", other))),
        }
    }

    /// Asks the store for the join URL of a room
    pub async fn get_room_url(&mut self, name: &str) -> Result<String, StoreCallError> {
        let reply = self
            .call(StoreCommand::GetRoomUrl(command::GetRoomUrlCommand {
                name: name.to_string(),
            }))
            .await?;

        match reply {
            Reply::RoomUrl(reply) => Ok(reply.url),
            other => Err(StoreCallError::UnexpectedReply(format!("{:?}", other))),
        }
    }

    /// Ends the session, the store does not answer this command
    pub async fn quit(mut self) -> Result<(), StoreCallError> {
        self.commands
            .write(&StoreCommand::Quit(command::QuitCommand))
            .await?;

        Ok(())
    }
}
