use crate::call::{
    AppMessage, AppMessageReceiver, CallError, CallFrame, CallWidget, BROADCAST_RECIPIENT,
    VIDEO_REGION,
};

use super::{state::LOCAL_SENDER, ChatMessage, State};

/// [CallSession] pairs the frame of a joined call with its inbound app messages
pub(super) struct CallSession {
    frame: Box<dyn CallFrame>,
    app_messages: Box<dyn AppMessageReceiver>,
}

impl CallSession {
    /// Waits for a message from another participant, `None` once the call is gone
    pub async fn recv(&mut self) -> Option<AppMessage> {
        self.app_messages.recv().await
    }

    fn destroy(self) {
        // stop listening first so the widget sees the frame as the last one out
        drop(self.app_messages);
        self.frame.destroy();
    }
}

/// Returns the URL to join, or reports why the call can not be joined
pub(super) fn check_room_url(state: &mut State) -> Option<String> {
    match state.room_url.as_ref() {
        Some(url) if !url.trim().is_empty() => Some(url.clone()),
        _ => {
            state.raise_error("Invalid room URL. Please try again.");
            None
        }
    }
}

async fn start_call(widget: &dyn CallWidget, url: &str) -> Result<CallSession, CallError> {
    let mut frame = widget.create_frame(VIDEO_REGION)?;

    if let Err(err) = frame.join(url).await {
        frame.destroy();
        return Err(err);
    }

    match frame.app_messages() {
        Ok(app_messages) => Ok(CallSession {
            frame,
            app_messages,
        }),
        Err(err) => {
            frame.destroy();
            Err(err)
        }
    }
}

/// Creates a frame in the video region and joins the call behind `url`
pub(super) async fn join_call(
    state: &mut State,
    widget: &dyn CallWidget,
    url: &str,
) -> Option<CallSession> {
    match start_call(widget, url).await {
        Ok(call_session) => {
            state.call_joined(url);
            Some(call_session)
        }
        Err(err) => {
            log::warn!("could not join {}: {}", url, err);
            state.raise_error("Failed to join the call. Please try again.");
            None
        }
    }
}

/// Tears the frame down and returns to the room page
pub(super) fn leave_call(state: &mut State, call_session: CallSession) {
    call_session.destroy();
    state.call_left();
}

/// The widget ended the call on its own
pub(super) fn call_ended(state: &mut State, call_session: CallSession) {
    leave_call(state, call_session);
    state.raise_error("The call has ended.");
}

/// Shows the message locally and relays it to everybody else in the call
pub(super) fn send_chat_message(
    state: &mut State,
    call_session: &CallSession,
    display_name: &str,
    content: String,
) {
    if content.trim().is_empty() {
        return;
    }

    let app_message = AppMessage {
        sender: String::from(display_name),
        message: content.clone(),
    };

    if let Err(err) = call_session
        .frame
        .send_app_message(app_message, BROADCAST_RECIPIENT)
    {
        log::warn!("could not send chat message: {}", err);
        state.raise_error("Failed to send the message. Please try again.");
        return;
    }

    state.push_chat_message(ChatMessage {
        sender: String::from(LOCAL_SENDER),
        message: content,
    });
}

pub(super) fn receive_chat_message(state: &mut State, app_message: AppMessage) {
    state.push_chat_message(ChatMessage::from(app_message));
}
