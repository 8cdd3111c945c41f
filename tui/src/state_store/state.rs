use circular_queue::CircularQueue;
use comms::room::RoomConfig;

use crate::call::AppMessage;

const MAX_CHAT_MESSAGES_TO_STORE: usize = 100;

/// Seconds an error stays on screen unless dismissed earlier
pub const ERROR_DISPLAY_SECS: usize = 6;

/// Sender shown for chat messages composed on this client
pub const LOCAL_SENDER: &str = "You";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: String,
    pub message: String,
}

impl From<AppMessage> for ChatMessage {
    fn from(app_message: AppMessage) -> Self {
        ChatMessage {
            sender: app_message.sender,
            message: app_message.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreConnectionStatus {
    Uninitalized,
    Connecting,
    Connected { addr: String },
    Errored { err: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallStatus {
    Idle,
    Joined { url: String },
}

/// Message shown to the user until it expires or gets dismissed
#[derive(Debug, Clone, PartialEq)]
pub struct UserError {
    pub message: String,
    /// Value of [State::timer] when the error was raised
    pub raised_at: usize,
}

/// State holds the state of the application
#[derive(Debug, Clone)]
pub struct State {
    /// Host and port of the room store
    pub store_addr: String,
    pub store_connection_status: StoreConnectionStatus,
    /// A store or call request is in flight, further requests are ignored
    pub is_loading: bool,
    /// Last error to show the user
    pub error: Option<UserError>,
    /// Last informational message, e.g. a confirmation
    pub notice: Option<String>,
    /// Name of the room the form was last submitted or loaded for
    pub room_name: String,
    /// Config values of the room form
    pub room_config: RoomConfig,
    /// Bumped every time the form values are replaced by a config read from the store
    pub room_config_revision: usize,
    /// Join URL of the prepared room
    pub room_url: Option<String>,
    pub call_status: CallStatus,
    /// Chat messages of the current call in arrival order
    pub chat_messages: CircularQueue<ChatMessage>,
    /// Timer since app was opened
    pub timer: usize,
}

impl Default for State {
    fn default() -> Self {
        State {
            store_addr: String::new(),
            store_connection_status: StoreConnectionStatus::Uninitalized,
            is_loading: false,
            error: None,
            notice: None,
            room_name: String::new(),
            room_config: RoomConfig::default(),
            room_config_revision: 0,
            room_url: None,
            call_status: CallStatus::Idle,
            chat_messages: CircularQueue::with_capacity(MAX_CHAT_MESSAGES_TO_STORE),
            timer: 0,
        }
    }
}

impl State {
    pub fn mark_connection_request_start(&mut self) {
        self.store_connection_status = StoreConnectionStatus::Connecting;
    }

    /// Processes the result of a connection request to change the state of the application
    pub fn process_connection_request_result(&mut self, result: anyhow::Result<String>) {
        self.store_connection_status = match result {
            Ok(addr) => StoreConnectionStatus::Connected { addr },
            Err(err) => StoreConnectionStatus::Errored {
                err: err.to_string(),
            },
        }
    }

    /// The store can not be reached anymore, everything bound to it is reset
    pub fn mark_connection_lost(&mut self, err: &str) {
        self.store_connection_status = StoreConnectionStatus::Errored {
            err: String::from(err),
        };
        self.forget_room_url();
        self.is_loading = false;
    }

    pub fn is_connected(&self) -> bool {
        matches!(
            self.store_connection_status,
            StoreConnectionStatus::Connected { .. }
        )
    }

    pub fn has_joined_call(&self) -> bool {
        matches!(self.call_status, CallStatus::Joined { .. })
    }

    /// Marks the start of a request, returns false if one is already in flight
    pub fn try_start_loading(&mut self) -> bool {
        if self.is_loading {
            return false;
        }

        self.is_loading = true;
        self.notice = None;

        true
    }

    pub fn finish_loading(&mut self) {
        self.is_loading = false;
    }

    /// Shows an error to the user, replacing the previous one
    pub fn raise_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);

        self.error = Some(UserError {
            message,
            raised_at: self.timer,
        });
        self.notice = None;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// A room has been created or loaded, the call can be joined with the given URL
    pub fn room_prepared(&mut self, name: &str, config: RoomConfig, url: String) {
        self.room_name = String::from(name);
        self.room_config = config;
        self.room_url = Some(url);
    }

    /// The prepared room can not be joined anymore
    pub fn forget_room_url(&mut self) {
        self.room_url = None;
    }

    /// Replaces the form values with a config read from the store
    pub fn room_config_loaded(&mut self, name: &str, config: RoomConfig) {
        self.room_name = String::from(name);
        self.room_config = config;
        self.room_config_revision += 1;
    }

    pub fn call_joined(&mut self, url: &str) {
        self.call_status = CallStatus::Joined {
            url: String::from(url),
        };
        self.chat_messages.clear();
    }

    pub fn call_left(&mut self) {
        self.call_status = CallStatus::Idle;
    }

    pub fn push_chat_message(&mut self, chat_message: ChatMessage) {
        self.chat_messages.push(chat_message);
    }

    pub fn tick_timer(&mut self) {
        self.timer += 1;

        let is_expired = self
            .error
            .as_ref()
            .map(|error| self.timer.saturating_sub(error.raised_at) >= ERROR_DISPLAY_SECS)
            .unwrap_or(false);

        if is_expired {
            self.error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_blocks_further_requests() {
        let mut state = State::default();

        assert!(state.try_start_loading());
        assert!(!state.try_start_loading());

        state.finish_loading();
        assert!(state.try_start_loading());
    }

    #[test]
    fn test_error_expires_after_display_time() {
        let mut state = State::default();
        state.tick_timer();
        state.raise_error("Failed to join the call. Please try again.");

        for _ in 0..ERROR_DISPLAY_SECS - 1 {
            state.tick_timer();
        }
        assert!(state.error.is_some());

        state.tick_timer();
        assert!(state.error.is_none());
    }

    #[test]
    fn test_dismiss_error() {
        let mut state = State::default();
        state.raise_error("Invalid room URL. Please try again.");

        state.dismiss_error();

        assert!(state.error.is_none());
    }

    #[test]
    fn test_loaded_config_bumps_revision() {
        let mut state = State::default();
        let config = RoomConfig {
            enable_chat: true,
            ..Default::default()
        };

        state.room_config_loaded("team-sync", config.clone());

        assert_eq!(state.room_name, "team-sync");
        assert_eq!(state.room_config, config);
        assert_eq!(state.room_config_revision, 1);
    }

    #[test]
    fn test_chat_is_reset_when_a_call_is_joined() {
        let mut state = State::default();
        state.push_chat_message(ChatMessage {
            sender: LOCAL_SENDER.into(),
            message: "left over".into(),
        });

        state.call_joined("https://meetlink.daily.co/team-sync");

        assert!(state.has_joined_call());
        assert!(state.chat_messages.is_empty());
    }

    #[test]
    fn test_chat_keeps_arrival_order() {
        let mut state = State::default();

        for idx in 0..3 {
            state.push_chat_message(ChatMessage {
                sender: "ada".into(),
                message: format!("message {}", idx),
            });
        }

        let messages: Vec<&str> = state
            .chat_messages
            .asc_iter()
            .map(|chat_message| chat_message.message.as_str())
            .collect();
        assert_eq!(messages, vec!["message 0", "message 1", "message 2"]);
    }

    #[test]
    fn test_connection_loss_forgets_room_url() {
        let mut state = State::default();
        state.process_connection_request_result(Ok("localhost:8080".into()));
        state.room_prepared(
            "team-sync",
            RoomConfig::default(),
            "https://meetlink.daily.co/team-sync".into(),
        );

        state.mark_connection_lost("room store closed the connection");

        assert!(!state.is_connected());
        assert_eq!(state.room_url, None);
    }
}
