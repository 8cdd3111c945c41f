use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{
    AppMessage, AppMessageReceiver, CallError, CallFrame, CallWidget, BROADCAST_RECIPIENT,
};

const BROADCAST_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
struct Envelope {
    from: String,
    to: String,
    message: AppMessage,
}

type CallChannels = Arc<Mutex<HashMap<String, broadcast::Sender<Envelope>>>>;

/// [LocalCallWidget] hosts calls inside the running process.
///
/// Frames that join the same URL share one broadcast channel,
/// app messages reach every other frame of the call but never the sender.
#[derive(Debug, Default)]
pub struct LocalCallWidget {
    calls: CallChannels,
    next_participant: AtomicUsize,
}

impl CallWidget for LocalCallWidget {
    fn create_frame(&self, region: &str) -> Result<Box<dyn CallFrame>, CallError> {
        let participant_id = format!(
            "participant-{}",
            self.next_participant.fetch_add(1, Ordering::Relaxed)
        );
        log::debug!("created call frame {} in {}", participant_id, region);

        Ok(Box::new(LocalCallFrame {
            participant_id,
            calls: self.calls.clone(),
            joined: None,
        }))
    }
}

struct JoinedCall {
    url: String,
    broadcast_tx: broadcast::Sender<Envelope>,
}

struct LocalCallFrame {
    participant_id: String,
    calls: CallChannels,
    joined: Option<JoinedCall>,
}

fn is_valid_room_url(url: &str) -> bool {
    ["https://", "http://"]
        .iter()
        .any(|scheme| url.len() > scheme.len() && url.starts_with(scheme))
        && !url.chars().any(char::is_whitespace)
}

#[async_trait]
impl CallFrame for LocalCallFrame {
    async fn join(&mut self, url: &str) -> Result<(), CallError> {
        if let Some(joined) = self.joined.as_ref() {
            return Err(CallError::AlreadyJoined(joined.url.clone()));
        }

        if !is_valid_room_url(url) {
            return Err(CallError::InvalidUrl(String::from(url)));
        }

        let broadcast_tx = {
            let mut calls = self.calls.lock().map_err(|_| CallError::Disconnected)?;

            calls
                .entry(String::from(url))
                .or_insert_with(|| broadcast::channel(BROADCAST_CHANNEL_CAPACITY).0)
                .clone()
        };

        log::info!("{} joined {}", self.participant_id, url);
        self.joined = Some(JoinedCall {
            url: String::from(url),
            broadcast_tx,
        });

        Ok(())
    }

    fn destroy(self: Box<Self>) {
        let LocalCallFrame {
            participant_id,
            calls,
            joined,
        } = *self;
        let Some(joined) = joined else {
            return;
        };

        log::info!("{} left {}", participant_id, joined.url);

        // forget the call once the last participant is gone
        if let Ok(mut calls) = calls.lock() {
            if joined.broadcast_tx.receiver_count() == 0 {
                calls.remove(&joined.url);
            }
        };
    }

    fn send_app_message(&self, message: AppMessage, recipient: &str) -> Result<(), CallError> {
        let joined = self.joined.as_ref().ok_or(CallError::NotJoined)?;

        // nobody else listening is not an error
        let _ = joined.broadcast_tx.send(Envelope {
            from: self.participant_id.clone(),
            to: String::from(recipient),
            message,
        });

        Ok(())
    }

    fn app_messages(&self) -> Result<Box<dyn AppMessageReceiver>, CallError> {
        let joined = self.joined.as_ref().ok_or(CallError::NotJoined)?;

        Ok(Box::new(LocalAppMessageReceiver {
            participant_id: self.participant_id.clone(),
            broadcast_rx: joined.broadcast_tx.subscribe(),
        }))
    }
}

struct LocalAppMessageReceiver {
    participant_id: String,
    broadcast_rx: broadcast::Receiver<Envelope>,
}

#[async_trait]
impl AppMessageReceiver for LocalAppMessageReceiver {
    async fn recv(&mut self) -> Option<AppMessage> {
        loop {
            match self.broadcast_rx.recv().await {
                Ok(envelope) => {
                    let is_own = envelope.from == self.participant_id;
                    let is_addressed = envelope.to == BROADCAST_RECIPIENT
                        || envelope.to == self.participant_id;

                    if !is_own && is_addressed {
                        return Some(envelope.message);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("{} missed {} app messages", self.participant_id, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
