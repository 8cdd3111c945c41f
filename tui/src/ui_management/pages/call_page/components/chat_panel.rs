use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    prelude::{Backend, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, ChatMessage, State};
use crate::ui_management::components::{
    input_box::{self, InputBox},
    section::SectionActivation,
    usage::{HasUsageInfo, UsageInfo, UsageInfoLine},
    Component, ComponentRender,
};

struct Props {
    /// Messages of the current call, oldest first
    messages: Vec<ChatMessage>,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Self {
            messages: state.chat_messages.asc_iter().cloned().collect(),
        }
    }
}

/// Side panel listing the chat of the call with an input to write to everybody
pub struct ChatPanel {
    action_tx: UnboundedSender<Action>,
    /// State Mapped ChatPanel Props
    props: Props,
    // Internal State for the Component
    pub input_box: InputBox,
}

impl ChatPanel {
    fn submit_message(&mut self) {
        if self.input_box.text().trim().is_empty() {
            return;
        }

        let _ = self.action_tx.send(Action::SendChatMessage {
            content: String::from(self.input_box.text()),
        });

        self.input_box.reset();
    }
}

impl Component for ChatPanel {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self {
        Self {
            action_tx: action_tx.clone(),
            props: Props::from(state),
            //
            input_box: InputBox::new(state, action_tx),
        }
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        Self {
            props: Props::from(state),
            ..self
        }
    }

    fn name(&self) -> &str {
        "Chat"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.code == KeyCode::Enter {
            self.submit_message();
        } else {
            self.input_box.handle_key_event(key);
        }
    }
}

impl SectionActivation for ChatPanel {
    fn activate(&mut self) {}

    fn deactivate(&mut self) {
        self.input_box.reset();
    }
}

fn calculate_list_offset(height: u16, items_len: usize) -> usize {
    // go back by (container height - 2 for borders) to get the offset
    items_len.saturating_sub((height as usize).saturating_sub(2))
}

pub struct RenderProps {
    pub area: Rect,
    pub border_color: Color,
    pub show_cursor: bool,
}

impl ComponentRender<RenderProps> for ChatPanel {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: RenderProps) {
        let [container_messages, container_input] = *Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
            .split(props.area)
        else {
            panic!("The chat layout should have 2 chunks")
        };

        let message_offset =
            calculate_list_offset(container_messages.height, self.props.messages.len());
        let messages: Vec<ListItem> = self
            .props
            .messages
            .iter()
            .skip(message_offset)
            .map(|chat_message| {
                ListItem::new(Line::from(vec![
                    Span::from(format!("{}: ", chat_message.sender)).bold(),
                    Span::raw(chat_message.message.as_str()),
                ]))
            })
            .collect();

        let messages = List::new(messages).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::new().fg(props.border_color))
                .title("Chat"),
        );
        frame.render_widget(messages, container_messages);

        self.input_box.render(
            frame,
            input_box::RenderProps {
                title: "Message".into(),
                area: container_input,
                border_color: props.border_color,
                show_cursor: props.show_cursor,
            },
        );
    }
}

impl HasUsageInfo for ChatPanel {
    fn usage_info(&self) -> UsageInfo {
        UsageInfo {
            description: Some("Type a message for everybody in the call".into()),
            lines: vec![
                UsageInfoLine::new(&["Esc"], "to cancel"),
                UsageInfoLine::new(&["Enter"], "to send your message"),
            ],
        }
    }
}
