use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use comms::{
    client::RoomStoreClient,
    command::StoreCommand,
    reply::{self, FailureReason, Reply},
    room::RoomConfig,
    transport,
};
use tokio::net::{TcpListener, TcpStream};
use tokio_stream::StreamExt;

/// Room whose URL the fake store refuses to derive
pub(super) const ROOM_WITHOUT_URL: &str = "no-url";

/// In-memory room store speaking the wire protocol, shared by every connection it accepts
#[derive(Clone, Default)]
pub(super) struct FakeStore {
    rooms: Arc<Mutex<HashMap<String, RoomConfig>>>,
    /// Every command received so far, in arrival order
    commands: Arc<Mutex<Vec<StoreCommand>>>,
}

impl FakeStore {
    pub async fn spawn() -> (Self, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let store = FakeStore::default();

        let server = store.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(server.clone().serve(stream));
            }
        });

        (store, addr)
    }

    pub fn received_commands(&self) -> Vec<StoreCommand> {
        self.commands.lock().unwrap().clone()
    }

    fn reply_to(&self, command: StoreCommand) -> Reply {
        let mut rooms = self.rooms.lock().unwrap();

        match command {
            StoreCommand::CreateRoom(cmd) if rooms.contains_key(&cmd.name) => {
                Reply::failure(FailureReason::RoomAlreadyExists, "exists")
            }
            StoreCommand::CreateRoom(cmd) => {
                rooms.insert(cmd.name.clone(), cmd.config);
                Reply::RoomCreated(reply::RoomCreatedReply { name: cmd.name })
            }
            StoreCommand::GetRoomConfig(cmd) => Reply::RoomConfig(reply::RoomConfigReply {
                config: rooms.get(&cmd.name).cloned(),
                name: cmd.name,
            }),
            StoreCommand::UpdateRoomConfig(cmd) => match rooms.get_mut(&cmd.name) {
                Some(stored) => {
                    *stored = cmd.config;
                    Reply::RoomConfigUpdated(reply::RoomConfigUpdatedReply { name: cmd.name })
                }
                None => Reply::failure(FailureReason::RoomNotFound, "not found"),
            },
            StoreCommand::GetRoomUrl(cmd) if cmd.name == ROOM_WITHOUT_URL => {
                Reply::failure(FailureReason::BadRequest, "no url for this room")
            }
            StoreCommand::GetRoomUrl(cmd) => Reply::RoomUrl(reply::RoomUrlReply {
                url: format!("https://meetlink.daily.co/{}", cmd.name),
                name: cmd.name,
            }),
            StoreCommand::Quit(_) => Reply::failure(FailureReason::BadRequest, "quit"),
        }
    }

    async fn serve(self, stream: TcpStream) {
        let (mut commands, mut replies) = transport::server::split_tcp_stream(stream);

        while let Some(Ok(command)) = commands.next().await {
            if let StoreCommand::Quit(_) = command {
                break;
            }

            self.commands.lock().unwrap().push(command.clone());
            let reply = self.reply_to(command);

            if replies.write(&reply).await.is_err() {
                break;
            }
        }
    }
}

pub(super) async fn connect_fake_store() -> RoomStoreClient {
    let (_store, addr) = FakeStore::spawn().await;

    RoomStoreClient::connect(addr).await.unwrap()
}
