use std::sync::Arc;

use anyhow::Context;
use tokio::{
    net::TcpListener,
    signal::unix::{signal, SignalKind},
    sync::broadcast,
    task::JoinSet,
};

use crate::{
    room_store::{RoomStore, RoomUrlResolver},
    settings::ServerSettings,
};

mod room_store;
mod session;
mod settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = ServerSettings::load()?;
    let room_store = Arc::new(RoomStore::new(RoomUrlResolver::new(
        &settings.room_url_base,
    )));
    let mut join_set: JoinSet<anyhow::Result<()>> = JoinSet::new();

    let mut interrupt =
        signal(SignalKind::interrupt()).context("failed to create interrupt signal stream")?;
    let server = TcpListener::bind(format!("0.0.0.0:{}", settings.port))
        .await
        .context("could not bind to the port")?;
    let (quit_tx, quit_rx) = broadcast::channel::<()>(1);

    log::info!(
        "Listening on port {}, rooms resolve under {}",
        settings.port,
        settings.room_url_base
    );
    loop {
        tokio::select! {
            _ = interrupt.recv() => {
                log::info!("Server interrupted. Gracefully shutting down.");
                // no session is listening when nobody is connected
                let _ = quit_tx.send(());
                break;
            }
            Ok((socket, _)) = server.accept() => {
                join_set.spawn(session::handle_store_session(room_store.clone(), quit_rx.resubscribe(), socket));
            }
            Some(joined) = join_set.join_next() => match joined {
                Ok(Err(err)) => log::warn!("session failed: {:#}", err),
                Err(err) => log::error!("session task panicked: {}", err),
                Ok(Ok(())) => (),
            }
        }
    }

    while join_set.join_next().await.is_some() {}
    log::info!("Server shut down");

    Ok(())
}
