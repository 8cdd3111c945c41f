use comms::room::RoomConfig;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{prelude::*, widgets::*, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::call::VIDEO_REGION;
use crate::state_store::{action::Action, CallStatus, State};
use crate::ui_management::components::{
    section::SectionActivation,
    status_bar::StatusBar,
    usage::{render_usage, HasUsageInfo, UsageInfo, UsageInfoLine},
    Component, ComponentRender,
};

use super::components::chat_panel::{self, ChatPanel};

struct Props {
    /// URL of the joined call, empty while idle
    url: String,
    room_name: String,
    room_config: RoomConfig,
    status_bar: StatusBar,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        let url = match &state.call_status {
            CallStatus::Joined { url } => url.clone(),
            CallStatus::Idle => String::new(),
        };

        Props {
            url,
            room_name: state.room_name.clone(),
            room_config: state.room_config.clone(),
            status_bar: StatusBar::from(state),
        }
    }
}

impl Props {
    fn is_chat_enabled(&self) -> bool {
        self.room_config.enable_chat
    }
}

/// CallPage hosts the video region of the joined call and its chat
pub struct CallPage {
    /// Action sender
    pub action_tx: UnboundedSender<Action>,
    /// State Mapped CallPage Props
    props: Props,
    // Internal State
    /// The chat panel handles the keyboard
    pub is_chat_active: bool,
    // Child Components
    pub chat_panel: ChatPanel,
}

impl CallPage {
    fn deactivate_chat(&mut self) {
        self.chat_panel.deactivate();
        self.is_chat_active = false;
    }

    fn feature_lines(&self) -> Vec<Line<'_>> {
        let config = &self.props.room_config;
        let features = [
            ("chat", config.enable_chat),
            ("hand raising", config.enable_hand_raising),
            ("screen sharing", config.enable_screenshare),
            ("recording", config.enable_recording),
            ("knocking", config.enable_knocking),
            ("emoji reactions", config.enable_emoji_reactions),
        ];
        let enabled: Vec<&str> = features
            .iter()
            .filter(|(_, enabled)| *enabled)
            .map(|(name, _)| *name)
            .collect();

        let mut lines = vec![Line::from(format!(
            "Features: {}",
            if enabled.is_empty() {
                String::from("none")
            } else {
                enabled.join(", ")
            }
        ))];

        if config.start_with_video_off {
            lines.push(Line::from("Camera starts off".italic()));
        }
        if let Some(redirect) = config.redirect_on_meeting_exit.as_ref() {
            lines.push(Line::from(format!("On exit participants go to {}", redirect)));
        }

        lines
    }
}

impl Component for CallPage {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self
    where
        Self: Sized,
    {
        CallPage {
            action_tx: action_tx.clone(),
            props: Props::from(state),
            is_chat_active: false,
            chat_panel: ChatPanel::new(state, action_tx),
        }
        .move_with_state(state)
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        let mut call_page = CallPage {
            props: Props::from(state),
            chat_panel: self.chat_panel.move_with_state(state),
            ..self
        };

        // a call left behind does not keep a half written message around
        if call_page.is_chat_active && !state.has_joined_call() {
            call_page.deactivate_chat();
        }

        call_page
    }

    fn name(&self) -> &str {
        "Call Page"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.is_chat_active {
            if key.code == KeyCode::Esc {
                self.deactivate_chat();
            } else {
                self.chat_panel.handle_key_event(key);
            }

            return;
        }

        match key.code {
            KeyCode::Char('e') if self.props.is_chat_enabled() => {
                self.is_chat_active = true;
                self.chat_panel.activate();
            }
            KeyCode::Char('l') => {
                let _ = self.action_tx.send(Action::LeaveCall);
            }
            KeyCode::Char('x') => {
                let _ = self.action_tx.send(Action::DismissError);
            }
            KeyCode::Char('q') => {
                let _ = self.action_tx.send(Action::Exit);
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let _ = self.action_tx.send(Action::Exit);
            }
            _ => {}
        }
    }
}

impl ComponentRender<()> for CallPage {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, _props: ()) {
        let constraints = if self.props.is_chat_enabled() {
            [Constraint::Percentage(65), Constraint::Percentage(35)]
        } else {
            [Constraint::Percentage(100), Constraint::Percentage(0)]
        };
        let [left, right] = *Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints.as_ref())
            .split(frame.size())
        else {
            panic!("The main layout should have 2 chunks")
        };

        let [container_video, container_status, container_usage] = *Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Min(4),
                    Constraint::Length(3),
                    Constraint::Length(7),
                ]
                .as_ref(),
            )
            .split(left)
        else {
            panic!("The left layout should have 3 chunks")
        };

        let mut video_lines = vec![
            Line::from(vec![
                "Connected to ".into(),
                Span::from(format!("#{}", self.props.room_name)).bold(),
            ]),
            Line::from(self.props.url.as_str()),
            Line::default(),
        ];
        video_lines.extend(self.feature_lines());

        let video = Paragraph::new(video_lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Call ({})", VIDEO_REGION)),
        );
        frame.render_widget(video, container_video);

        self.props.status_bar.render(frame, container_status);

        render_usage(frame, container_usage, self.usage_info());

        if self.props.is_chat_enabled() {
            self.chat_panel.render(
                frame,
                chat_panel::RenderProps {
                    area: right,
                    border_color: if self.is_chat_active {
                        Color::Yellow
                    } else {
                        Color::Reset
                    },
                    show_cursor: self.is_chat_active,
                },
            );
        }
    }
}

impl HasUsageInfo for CallPage {
    fn usage_info(&self) -> UsageInfo {
        if self.is_chat_active {
            return self.chat_panel.usage_info();
        }

        let mut lines = vec![
            UsageInfoLine::new(&["q"], "to exit"),
            UsageInfoLine::new(&["l"], "to leave the call"),
        ];
        if self.props.is_chat_enabled() {
            lines.push(UsageInfoLine::new(&["e"], "to write in the chat"));
        }
        if self.props.status_bar.has_error() {
            lines.push(UsageInfoLine::new(&["x"], "to dismiss the error"));
        }

        UsageInfo {
            description: None,
            lines,
        }
    }
}
