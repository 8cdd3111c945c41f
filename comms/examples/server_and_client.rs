use anyhow::Context;
use comms::{
    client::RoomStoreClient,
    command::StoreCommand,
    reply::{self, FailureReason, Reply},
    room::RoomConfig,
    transport,
};
use tokio::net::TcpListener;
use tokio_stream::StreamExt;

const PORT: usize = 8081;

async fn server_example(listener: TcpListener) -> anyhow::Result<()> {
    // accept the only client connection we will have
    let tcp_stream = match listener.accept().await {
        Ok((tcp_stream, _addr)) => tcp_stream,
        Err(e) => return Err(anyhow::anyhow!("failed to accept client: {}", e)),
    };

    // break the client connection into higher level API for ease of use
    let (mut command_stream, mut reply_writer) = transport::server::split_tcp_stream(tcp_stream);

    // answer commands from the client until the connection is closed
    while let Some(result) = command_stream.next().await {
        let reply = match result {
            Ok(StoreCommand::Quit(_)) => break,
            Ok(StoreCommand::CreateRoom(cmd)) => {
                println!("SERVER: creating room {} with {:?}", cmd.name, cmd.config);
                Reply::RoomCreated(reply::RoomCreatedReply { name: cmd.name })
            }
            Ok(StoreCommand::GetRoomUrl(cmd)) => Reply::RoomUrl(reply::RoomUrlReply {
                url: format!("https://meetlink.daily.co/{}", cmd.name),
                name: cmd.name,
            }),
            Ok(command) => {
                println!("SERVER: not handled in this example: {:?}", command);
                Reply::failure(FailureReason::BadRequest, "not handled in this example")
            }
            // client has sent a command which we could not read or parse
            // could be a bug in the client, malicious client, breaking api changes etc.
            Err(e) => Reply::failure(FailureReason::BadRequest, e.to_string()),
        };

        reply_writer.write(&reply).await?;
    }

    Ok(())
}

async fn client_example() -> anyhow::Result<()> {
    let mut client = RoomStoreClient::connect(format!("localhost:{}", PORT)).await?;

    let config = RoomConfig {
        enable_chat: true,
        enable_knocking: false,
        ..Default::default()
    };

    client.create_room("team-sync", &config).await?;
    let url = client.get_room_url("team-sync").await?;
    println!("CLIENT: join the call at {}", url);

    client.quit().await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // bind before starting the client so the connection can not race the listener
    let listener = TcpListener::bind(format!("0.0.0.0:{}", PORT))
        .await
        .context("could not bind to the port")?;

    tokio::try_join!(server_example(listener), client_example())
        .context("one of the examples failed")?;

    println!("example ran without problems");

    Ok(())
}
