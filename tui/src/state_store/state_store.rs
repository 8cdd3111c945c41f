use std::{future, sync::Arc, time::Duration};

use comms::client::RoomStoreClient;
use tokio::sync::{
    broadcast,
    mpsc::{self, UnboundedReceiver, UnboundedSender},
};

use crate::{
    call::{AppMessage, CallWidget},
    settings::TuiSettings,
    Interrupted, Terminator,
};

use super::{
    action::Action,
    call_requests::{self, CallSession},
    store_requests, State,
};

pub struct StateStore {
    state_tx: UnboundedSender<State>,
    call_widget: Arc<dyn CallWidget>,
    /// Where the room store is expected to listen
    store_addr: String,
    /// Sender name put on outgoing chat messages
    display_name: String,
}

impl StateStore {
    pub fn new(
        call_widget: Arc<dyn CallWidget>,
        settings: &TuiSettings,
    ) -> (Self, UnboundedReceiver<State>) {
        let (state_tx, state_rx) = mpsc::unbounded_channel::<State>();

        (
            StateStore {
                state_tx,
                call_widget,
                store_addr: settings.server_addr.clone(),
                display_name: settings.display_name.clone(),
            },
            state_rx,
        )
    }
}

// pends forever while there is no call, so the select branch simply never fires
async fn next_app_message(call_session: &mut Option<CallSession>) -> Option<AppMessage> {
    match call_session.as_mut() {
        Some(call_session) => call_session.recv().await,
        None => future::pending().await,
    }
}

impl StateStore {
    /// Emits the loading state so the UI can show it while the request is awaited
    fn start_request(&self, state: &mut State) -> anyhow::Result<bool> {
        if !state.try_start_loading() {
            return Ok(false);
        }

        self.state_tx.send(state.clone())?;

        Ok(true)
    }

    pub async fn main_loop(
        self,
        mut terminator: Terminator,
        mut action_rx: UnboundedReceiver<Action>,
        mut interrupt_rx: broadcast::Receiver<Interrupted>,
    ) -> anyhow::Result<Interrupted> {
        let mut opt_store_client: Option<RoomStoreClient> = None;
        let mut opt_call_session: Option<CallSession> = None;
        let mut state = State {
            store_addr: self.store_addr.clone(),
            ..State::default()
        };

        // the initial state once
        self.state_tx.send(state.clone())?;

        let mut ticker = tokio::time::interval(Duration::from_secs(1));

        let result = loop {
            tokio::select! {
                // Handle the actions coming from the UI
                // and process them to do async operations
                Some(action) = action_rx.recv() => match action {
                    Action::ConnectToStoreRequest { addr } => {
                        if opt_store_client.is_none() {
                            state.mark_connection_request_start();
                            // emit event to re-render any part depending on the connection status
                            self.state_tx.send(state.clone())?;

                            match RoomStoreClient::connect(addr.as_str()).await {
                                Ok(store_client) => {
                                    log::info!("connected to the room store at {}", addr);
                                    let _ = opt_store_client.insert(store_client);
                                    state.process_connection_request_result(Ok(addr));
                                },
                                Err(err) => {
                                    state.process_connection_request_result(Err(err.into()));
                                }
                            }
                        }
                    },
                    Action::CreateRoom { name, config } => {
                        if let Some(store_client) = opt_store_client.as_mut() {
                            if store_requests::check_room_name(&mut state, &name) && self.start_request(&mut state)? {
                                let result = store_requests::create_room(&mut state, store_client, &name, config).await;
                                state.finish_loading();

                                if let Err(err) = result {
                                    opt_store_client = None;
                                    state.mark_connection_lost(&err.to_string());
                                }
                            }
                        }
                    },
                    Action::LoadRoomConfig { name } => {
                        if let Some(store_client) = opt_store_client.as_mut() {
                            if store_requests::check_room_name(&mut state, &name) && self.start_request(&mut state)? {
                                let result = store_requests::load_room_config(&mut state, store_client, &name).await;
                                state.finish_loading();

                                if let Err(err) = result {
                                    opt_store_client = None;
                                    state.mark_connection_lost(&err.to_string());
                                }
                            }
                        }
                    },
                    Action::SaveRoomConfig { name, config } => {
                        if let Some(store_client) = opt_store_client.as_mut() {
                            if store_requests::check_room_name(&mut state, &name) && self.start_request(&mut state)? {
                                let result = store_requests::save_room_config(&mut state, store_client, &name, config).await;
                                state.finish_loading();

                                if let Err(err) = result {
                                    opt_store_client = None;
                                    state.mark_connection_lost(&err.to_string());
                                }
                            }
                        }
                    },
                    Action::JoinCall => {
                        if opt_call_session.is_none() && !state.is_loading {
                            if let Some(url) = call_requests::check_room_url(&mut state) {
                                if self.start_request(&mut state)? {
                                    opt_call_session = call_requests::join_call(&mut state, self.call_widget.as_ref(), &url).await;
                                    state.finish_loading();
                                }
                            }
                        }
                    },
                    Action::LeaveCall => {
                        if let Some(call_session) = opt_call_session.take() {
                            call_requests::leave_call(&mut state, call_session);
                        }
                    },
                    Action::SendChatMessage { content } => {
                        if let Some(call_session) = opt_call_session.as_ref() {
                            call_requests::send_chat_message(&mut state, call_session, &self.display_name, content);
                        }
                    },
                    Action::DismissError => {
                        state.dismiss_error();
                    },
                    Action::Exit => {
                        let _ = terminator.terminate(Interrupted::UserInt);

                        break Interrupted::UserInt;
                    },
                },
                // Messages other participants sent through the call
                maybe_app_message = next_app_message(&mut opt_call_session) => match maybe_app_message {
                    Some(app_message) => call_requests::receive_chat_message(&mut state, app_message),
                    None => {
                        if let Some(call_session) = opt_call_session.take() {
                            call_requests::call_ended(&mut state, call_session);
                        }
                    },
                },
                // Tick to expire errors and count the seconds spent in the app
                _ = ticker.tick() => {
                    state.tick_timer();
                },
                // Catch and handle interrupt signal to gracefully shutdown
                Ok(interrupted) = interrupt_rx.recv() => {
                    break interrupted;
                }
            }

            self.state_tx.send(state.clone())?;
        };

        // leave the call so other participants do not keep a dangling frame around
        if let Some(call_session) = opt_call_session.take() {
            call_requests::leave_call(&mut state, call_session);
        }

        if let Some(store_client) = opt_store_client.take() {
            if let Err(err) = store_client.quit().await {
                log::warn!("could not end the room store session: {}", err);
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use comms::{
        command::{self, StoreCommand},
        room::RoomConfig,
    };
    use tokio::{net::TcpListener, task::JoinHandle, time::timeout};

    use super::*;
    use crate::{
        call::LocalCallWidget,
        state_store::{fake_store::FakeStore, CallStatus, StoreConnectionStatus},
    };

    const WAIT: Duration = Duration::from_secs(5);

    /// A [StateStore] main loop running in the background, driven like the UI would
    struct RunningStore {
        action_tx: UnboundedSender<Action>,
        state_rx: UnboundedReceiver<State>,
        interrupt_tx: broadcast::Sender<Interrupted>,
        main_loop: JoinHandle<anyhow::Result<Interrupted>>,
    }

    impl RunningStore {
        fn spawn(call_widget: Arc<dyn CallWidget>, store_addr: String, display_name: &str) -> Self {
            let settings = TuiSettings {
                server_addr: store_addr,
                display_name: display_name.into(),
                log_file: None,
            };
            let (state_store, state_rx) = StateStore::new(call_widget, &settings);
            let (interrupt_tx, interrupt_rx) = broadcast::channel(1);
            let (action_tx, action_rx) = mpsc::unbounded_channel();

            let main_loop = tokio::spawn(state_store.main_loop(
                Terminator::new(interrupt_tx.clone()),
                action_rx,
                interrupt_rx,
            ));

            RunningStore {
                action_tx,
                state_rx,
                interrupt_tx,
                main_loop,
            }
        }

        fn send(&self, action: Action) {
            self.action_tx.send(action).unwrap();
        }

        /// Skips emitted states until one matches
        async fn wait_for(&mut self, is_expected: impl Fn(&State) -> bool) -> State {
            timeout(WAIT, async {
                loop {
                    let state = self.state_rx.recv().await.unwrap();

                    if is_expected(&state) {
                        return state;
                    }
                }
            })
            .await
            .unwrap()
        }

        async fn connect(&mut self) {
            let addr = self.wait_for(|_| true).await.store_addr;

            self.send(Action::ConnectToStoreRequest { addr });
            self.wait_for(State::is_connected).await;
        }

        async fn exit(self) -> Interrupted {
            self.send(Action::Exit);

            self.main_loop.await.unwrap().unwrap()
        }
    }

    fn chat_config() -> RoomConfig {
        RoomConfig {
            enable_chat: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_room_emits_loading_then_url() {
        let (_fake_store, addr) = FakeStore::spawn().await;
        let mut store = RunningStore::spawn(
            Arc::new(LocalCallWidget::default()),
            addr.to_string(),
            "alice",
        );
        store.connect().await;

        store.send(Action::CreateRoom {
            name: "team-sync".into(),
            config: chat_config(),
        });

        let loading = store.wait_for(|state| state.is_loading).await;
        assert_eq!(loading.room_url, None);

        let prepared = store.wait_for(|state| state.room_url.is_some()).await;
        assert!(!prepared.is_loading);
        assert_eq!(prepared.room_name, "team-sync");
        assert_eq!(prepared.notice.as_deref(), Some("Room 'team-sync' created."));

        assert!(matches!(store.exit().await, Interrupted::UserInt));
    }

    #[tokio::test]
    async fn test_invalid_room_name_is_not_sent_to_the_store() {
        let (fake_store, addr) = FakeStore::spawn().await;
        let mut store = RunningStore::spawn(
            Arc::new(LocalCallWidget::default()),
            addr.to_string(),
            "alice",
        );
        store.connect().await;

        store.send(Action::CreateRoom {
            name: String::new(),
            config: chat_config(),
        });
        let rejected = store.wait_for(|state| state.error.is_some()).await;
        assert!(rejected.error.unwrap().message.starts_with("Invalid room name"));
        assert!(!rejected.is_loading);

        // a valid request afterwards is the first thing the store sees
        store.send(Action::LoadRoomConfig {
            name: "team-sync".into(),
        });
        store.wait_for(|state| state.notice.is_some()).await;

        assert_eq!(
            fake_store.received_commands(),
            vec![StoreCommand::GetRoomConfig(command::GetRoomConfigCommand {
                name: "team-sync".into(),
            })]
        );

        store.exit().await;
    }

    #[tokio::test]
    async fn test_closed_store_connection_goes_back_to_connect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // accept and hang up right away
            let _ = listener.accept().await;
        });
        let mut store = RunningStore::spawn(
            Arc::new(LocalCallWidget::default()),
            addr.to_string(),
            "alice",
        );
        store.connect().await;

        store.send(Action::CreateRoom {
            name: "team-sync".into(),
            config: chat_config(),
        });

        let lost = store
            .wait_for(|state| {
                matches!(
                    state.store_connection_status,
                    StoreConnectionStatus::Errored { .. }
                )
            })
            .await;
        assert!(!lost.is_loading);
        assert!(!lost.is_connected());
        assert_eq!(lost.room_url, None);

        assert!(matches!(store.exit().await, Interrupted::UserInt));
    }

    #[tokio::test]
    async fn test_join_call_and_chat_between_two_clients() {
        let (_fake_store, addr) = FakeStore::spawn().await;
        let call_widget: Arc<dyn CallWidget> = Arc::new(LocalCallWidget::default());
        let mut alice = RunningStore::spawn(call_widget.clone(), addr.to_string(), "alice");
        let mut bob = RunningStore::spawn(call_widget, addr.to_string(), "bob");
        alice.connect().await;
        bob.connect().await;

        alice.send(Action::CreateRoom {
            name: "team-sync".into(),
            config: chat_config(),
        });
        alice.wait_for(|state| state.room_url.is_some()).await;
        bob.send(Action::LoadRoomConfig {
            name: "team-sync".into(),
        });
        let loaded = bob.wait_for(|state| state.room_url.is_some()).await;
        assert_eq!(loaded.room_config, chat_config());

        alice.send(Action::JoinCall);
        bob.send(Action::JoinCall);
        alice.wait_for(State::has_joined_call).await;
        bob.wait_for(State::has_joined_call).await;

        alice.send(Action::SendChatMessage {
            content: "hello bob".into(),
        });

        let received = bob
            .wait_for(|state| !state.chat_messages.is_empty())
            .await;
        let chat_message = received.chat_messages.iter().next().unwrap();
        assert_eq!(chat_message.sender, "alice");
        assert_eq!(chat_message.message, "hello bob");

        alice.send(Action::LeaveCall);
        let left = alice.wait_for(|state| !state.has_joined_call()).await;
        assert_eq!(left.call_status, CallStatus::Idle);

        alice.exit().await;
        bob.exit().await;
    }

    #[tokio::test]
    async fn test_interrupt_ends_the_loop() {
        let (_fake_store, addr) = FakeStore::spawn().await;
        let mut store = RunningStore::spawn(
            Arc::new(LocalCallWidget::default()),
            addr.to_string(),
            "alice",
        );
        store.connect().await;

        store.interrupt_tx.send(Interrupted::OsSigInt).unwrap();

        let result = timeout(WAIT, store.main_loop).await.unwrap();
        assert!(matches!(result.unwrap().unwrap(), Interrupted::OsSigInt));
    }
}
