use comms::room::RoomConfig;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    prelude::{Backend, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, State};
use crate::ui_management::components::{
    section::SectionActivation,
    usage::{HasUsageInfo, UsageInfo, UsageInfoLine},
    Component, ComponentRender,
};

const TOGGLE_COUNT: usize = 12;

const TOGGLE_LABELS: [&str; TOGGLE_COUNT] = [
    "Chat",
    "Hand raising",
    "Screen sharing",
    "Recording",
    "Knocking",
    "Prejoin UI",
    "People UI",
    "Network UI",
    "Emoji reactions",
    "Only owners broadcast",
    "Start with video off",
    "Close tab on exit",
];

fn toggles(config: &RoomConfig) -> [bool; TOGGLE_COUNT] {
    [
        config.enable_chat,
        config.enable_hand_raising,
        config.enable_screenshare,
        config.enable_recording,
        config.enable_knocking,
        config.enable_prejoin_ui,
        config.enable_people_ui,
        config.enable_network_ui,
        config.enable_emoji_reactions,
        config.owner_only_broadcast,
        config.start_with_video_off,
        config.close_tab_on_exit,
    ]
}

fn toggles_mut(config: &mut RoomConfig) -> [&mut bool; TOGGLE_COUNT] {
    [
        &mut config.enable_chat,
        &mut config.enable_hand_raising,
        &mut config.enable_screenshare,
        &mut config.enable_recording,
        &mut config.enable_knocking,
        &mut config.enable_prejoin_ui,
        &mut config.enable_people_ui,
        &mut config.enable_network_ui,
        &mut config.enable_emoji_reactions,
        &mut config.owner_only_broadcast,
        &mut config.start_with_video_off,
        &mut config.close_tab_on_exit,
    ]
}

/// The boolean flags of the room form, one line per flag
pub struct ConfigToggleList {
    /// Flag values as edited in the form, the redirect is owned by another field
    config: RoomConfig,
    // Internal Component State
    /// List with optional selection and current offset
    pub list_state: ListState,
}

impl ConfigToggleList {
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: &RoomConfig) {
        self.config = config.clone();
    }

    fn next(&mut self) {
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < TOGGLE_COUNT => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    fn previous(&mut self) {
        let i = match self.list_state.selected() {
            Some(0) | None => TOGGLE_COUNT - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    fn toggle_selected(&mut self) {
        if let Some(flag) = self
            .list_state
            .selected()
            .and_then(|idx| toggles_mut(&mut self.config).into_iter().nth(idx))
        {
            *flag = !*flag;
        }
    }
}

impl Component for ConfigToggleList {
    fn new(state: &State, _action_tx: UnboundedSender<Action>) -> Self {
        Self {
            config: state.room_config.clone(),
            list_state: ListState::default(),
        }
    }

    fn move_with_state(self, _state: &State) -> Self
    where
        Self: Sized,
    {
        Self { ..self }
    }

    fn name(&self) -> &str {
        "Room Settings"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Up => {
                self.previous();
            }
            KeyCode::Down => {
                self.next();
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.toggle_selected();
            }
            _ => (),
        }
    }
}

impl SectionActivation for ConfigToggleList {
    fn activate(&mut self) {
        *self.list_state.offset_mut() = 0;
        self.list_state.select(Some(0));
    }

    fn deactivate(&mut self) {
        *self.list_state.offset_mut() = 0;
        self.list_state.select(None);
    }
}

pub struct RenderProps {
    pub border_color: Color,
    pub area: Rect,
}

impl ComponentRender<RenderProps> for ConfigToggleList {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: RenderProps) {
        let items: Vec<ListItem> = TOGGLE_LABELS
            .iter()
            .zip(toggles(&self.config))
            .map(|(label, enabled)| {
                let (mark, style) = if enabled {
                    ("[x]", Style::default().fg(Color::Green))
                } else {
                    ("[ ]", Style::default())
                };

                ListItem::new(Line::from(vec![
                    Span::styled(mark, style),
                    Span::raw(format!(" {}", label)),
                ]))
            })
            .collect();

        let toggle_list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::new().fg(props.border_color))
                    .title("Room Settings"),
            )
            .highlight_style(
                Style::default()
                    // yellow that would work for both dark / light modes
                    .bg(Color::Rgb(255, 223, 102))
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">");

        let mut list_state = self.list_state.clone();
        frame.render_stateful_widget(toggle_list, props.area, &mut list_state);
    }
}

impl HasUsageInfo for ConfigToggleList {
    fn usage_info(&self) -> UsageInfo {
        UsageInfo {
            description: Some("Choose the features of the room".into()),
            lines: vec![
                UsageInfoLine::new(&["Esc"], "to finish editing"),
                UsageInfoLine::new(&["↑", "↓"], "to navigate"),
                UsageInfoLine::new(&["Space", "Enter"], "to toggle"),
            ],
        }
    }
}
