use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::local::LocalCallWidget;

mod local;

/// Screen region the call frame of the call page is bound to
pub const VIDEO_REGION: &str = "video-container";

/// Recipient that addresses every other participant of the call
pub const BROADCAST_RECIPIENT: &str = "*";

/// Application level message relayed through the call, used by the chat panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMessage {
    pub sender: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum CallError {
    #[error("invalid room url '{0}'")]
    InvalidUrl(String),
    #[error("the call frame has already joined {0}")]
    AlreadyJoined(String),
    #[error("the call frame has not joined a call")]
    NotJoined,
    #[error("the call is gone")]
    Disconnected,
}

/// Source of inbound [AppMessage]s for a joined frame
#[async_trait]
pub trait AppMessageReceiver: Send {
    /// Waits for the next message from another participant,
    /// returns `None` once the call is over
    async fn recv(&mut self) -> Option<AppMessage>;
}

/// A single call instance created by a [CallWidget].
///
/// Media, signaling and transport are owned by the widget,
/// the frame is only told where to connect and when to go away.
#[async_trait]
pub trait CallFrame: Send {
    /// Connects the frame to the call behind `url`
    async fn join(&mut self, url: &str) -> Result<(), CallError>;

    /// Leaves the call and tears the frame down
    fn destroy(self: Box<Self>);

    /// Relays a message to `recipient`, or to everybody with [BROADCAST_RECIPIENT]
    fn send_app_message(&self, message: AppMessage, recipient: &str) -> Result<(), CallError>;

    /// Subscribes to the messages other participants send to this frame
    fn app_messages(&self) -> Result<Box<dyn AppMessageReceiver>, CallError>;
}

/// Externally supplied video call widget
pub trait CallWidget: Send + Sync {
    /// Creates a call frame bound to the given screen region
    fn create_frame(&self, region: &str) -> Result<Box<dyn CallFrame>, CallError>;
}
