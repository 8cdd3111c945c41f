use comms::room::RoomConfig;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{prelude::*, widgets::*, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, State, StoreConnectionStatus};
use crate::ui_management::components::{
    section::SectionActivation,
    status_bar::StatusBar,
    usage::{render_usage, HasUsageInfo, UsageInfo, UsageInfoLine},
    Component, ComponentRender,
};

use super::components::{
    config_toggle_list::{self, ConfigToggleList},
    form_field::{self, FormField},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    RoomName,
    ConfigToggles,
    Redirect,
}

impl Section {
    pub const COUNT: usize = 3;

    fn to_usize(&self) -> usize {
        match self {
            Section::RoomName => 0,
            Section::ConfigToggles => 1,
            Section::Redirect => 2,
        }
    }
}

impl TryFrom<usize> for Section {
    type Error = ();

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Section::RoomName),
            1 => Ok(Section::ConfigToggles),
            2 => Ok(Section::Redirect),
            _ => Err(()),
        }
    }
}

struct Props {
    /// Address of the connected room store
    store_addr: String,
    room_name: String,
    room_config: RoomConfig,
    room_config_revision: usize,
    room_url: Option<String>,
    is_loading: bool,
    status_bar: StatusBar,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        let store_addr = match &state.store_connection_status {
            StoreConnectionStatus::Connected { addr } => addr.clone(),
            _ => state.store_addr.clone(),
        };

        Props {
            store_addr,
            room_name: state.room_name.clone(),
            room_config: state.room_config.clone(),
            room_config_revision: state.room_config_revision,
            room_url: state.room_url.clone(),
            is_loading: state.is_loading,
            status_bar: StatusBar::from(state),
        }
    }
}

const DEFAULT_HOVERED_SECTION: Section = Section::RoomName;

/// RoomPage edits the room form and prepares the room to join
pub struct RoomPage {
    /// Action sender
    pub action_tx: UnboundedSender<Action>,
    /// State Mapped RoomPage Props
    props: Props,
    // Internal State
    /// Currently active section, handling input
    pub active_section: Option<Section>,
    /// Section that is currently hovered
    pub last_hovered_section: Section,
    /// Config revision the form values were last reset to
    form_revision: usize,
    // Child Components
    pub room_name_field: FormField,
    pub config_toggle_list: ConfigToggleList,
    pub redirect_field: FormField,
}

impl RoomPage {
    fn get_component_for_section<'a>(&'a self, section: &Section) -> &'a dyn Component {
        match section {
            Section::RoomName => &self.room_name_field,
            Section::ConfigToggles => &self.config_toggle_list,
            Section::Redirect => &self.redirect_field,
        }
    }

    fn get_component_for_section_mut<'a>(&'a mut self, section: &Section) -> &'a mut dyn Component {
        match section {
            Section::RoomName => &mut self.room_name_field,
            Section::ConfigToggles => &mut self.config_toggle_list,
            Section::Redirect => &mut self.redirect_field,
        }
    }

    fn get_section_activation_for_section<'a>(
        &'a mut self,
        section: &Section,
    ) -> &'a mut dyn SectionActivation {
        match section {
            Section::RoomName => &mut self.room_name_field,
            Section::ConfigToggles => &mut self.config_toggle_list,
            Section::Redirect => &mut self.redirect_field,
        }
    }

    fn hover_next(&mut self) {
        let idx: usize = self.last_hovered_section.to_usize();
        let next_idx = (idx + 1) % Section::COUNT;
        self.last_hovered_section = Section::try_from(next_idx).unwrap_or(DEFAULT_HOVERED_SECTION);
    }

    fn hover_previous(&mut self) {
        let idx: usize = self.last_hovered_section.to_usize();
        let previous_idx = if idx == 0 {
            Section::COUNT - 1
        } else {
            idx - 1
        };
        self.last_hovered_section =
            Section::try_from(previous_idx).unwrap_or(DEFAULT_HOVERED_SECTION);
    }

    fn calculate_border_color(&self, section: Section) -> Color {
        match (self.active_section.as_ref(), &self.last_hovered_section) {
            (Some(active_section), _) if active_section.eq(&section) => Color::Yellow,
            (_, last_hovered_section) if last_hovered_section.eq(&section) => Color::Blue,
            _ => Color::Reset,
        }
    }

    fn disable_section(&mut self, section: &Section) {
        self.get_section_activation_for_section(section)
            .deactivate();

        self.active_section = None;
    }

    /// Replaces every form value with what the store last answered
    fn reset_form(&mut self) {
        self.room_name_field.set_value(&self.props.room_name);
        self.config_toggle_list.set_config(&self.props.room_config);
        self.redirect_field.set_value(
            self.props
                .room_config
                .redirect_on_meeting_exit
                .as_deref()
                .unwrap_or_default(),
        );
        self.form_revision = self.props.room_config_revision;
    }

    fn room_name(&self) -> String {
        String::from(self.room_name_field.value())
    }

    /// The config described by the form, a blank redirect means none
    fn form_config(&self) -> RoomConfig {
        let redirect = self.redirect_field.value().trim();

        RoomConfig {
            redirect_on_meeting_exit: if redirect.is_empty() {
                None
            } else {
                Some(String::from(redirect))
            },
            ..self.config_toggle_list.config().clone()
        }
    }

    fn send(&self, action: Action) {
        let _ = self.action_tx.send(action);
    }
}

impl Component for RoomPage {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self
    where
        Self: Sized,
    {
        let mut room_page = RoomPage {
            action_tx: action_tx.clone(),
            // set the props
            props: Props::from(state),
            // internal component state
            active_section: Option::None,
            last_hovered_section: DEFAULT_HOVERED_SECTION,
            form_revision: state.room_config_revision,
            // child components
            room_name_field: FormField::labelled(
                state,
                action_tx.clone(),
                "Room Name",
                "Letters, digits, '-' and '_' only",
            ),
            config_toggle_list: ConfigToggleList::new(state, action_tx.clone()),
            redirect_field: FormField::labelled(
                state,
                action_tx,
                "Redirect On Meeting Exit",
                "URL participants are sent to after the meeting, leave blank for none",
            ),
        };
        room_page.reset_form();

        room_page.move_with_state(state)
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        let mut room_page = RoomPage {
            props: Props::from(state),
            // propogate the update to the child components
            room_name_field: self.room_name_field.move_with_state(state),
            config_toggle_list: self.config_toggle_list.move_with_state(state),
            redirect_field: self.redirect_field.move_with_state(state),
            ..self
        };

        if room_page.form_revision != room_page.props.room_config_revision {
            room_page.reset_form();
        }

        room_page
    }

    fn name(&self) -> &str {
        "Room Page"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        let active_section = self.active_section.clone();

        match active_section {
            None => match key.code {
                KeyCode::Char('e') => {
                    let last_hovered_section = self.last_hovered_section.clone();

                    self.active_section = Some(last_hovered_section.clone());
                    self.get_section_activation_for_section(&last_hovered_section)
                        .activate();
                }
                KeyCode::Left => self.hover_previous(),
                KeyCode::Right => self.hover_next(),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.send(Action::Exit);
                }
                KeyCode::Char('c') => self.send(Action::CreateRoom {
                    name: self.room_name(),
                    config: self.form_config(),
                }),
                KeyCode::Char('l') => self.send(Action::LoadRoomConfig {
                    name: self.room_name(),
                }),
                KeyCode::Char('s') => self.send(Action::SaveRoomConfig {
                    name: self.room_name(),
                    config: self.form_config(),
                }),
                KeyCode::Char('j') => self.send(Action::JoinCall),
                KeyCode::Char('x') => self.send(Action::DismissError),
                KeyCode::Char('q') => self.send(Action::Exit),
                _ => {}
            },
            Some(section) => {
                // the list uses enter to toggle, the text fields to confirm
                let is_leaving = match section {
                    Section::ConfigToggles => key.code == KeyCode::Esc,
                    _ => matches!(key.code, KeyCode::Esc | KeyCode::Enter),
                };

                if is_leaving {
                    self.disable_section(&section);
                } else {
                    self.get_component_for_section_mut(&section)
                        .handle_key_event(key);
                }
            }
        }
    }
}

impl ComponentRender<()> for RoomPage {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, _props: ()) {
        let [left, right] = *Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
            .split(frame.size())
        else {
            panic!("The main layout should have 2 chunks")
        };

        let [container_header, container_room_name, container_toggles, container_redirect, container_room_url, container_status] =
            *Layout::default()
                .direction(Direction::Vertical)
                .constraints(
                    [
                        Constraint::Length(3),
                        Constraint::Length(3),
                        Constraint::Min(3),
                        Constraint::Length(3),
                        Constraint::Length(3),
                        Constraint::Length(3),
                    ]
                    .as_ref(),
                )
                .split(left)
        else {
            panic!("The left layout should have 6 chunks")
        };

        let header = Paragraph::new(Line::from(vec![
            "Room store at ".into(),
            Span::from(self.props.store_addr.as_str()).bold(),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Meetlink"));
        frame.render_widget(header, container_header);

        self.room_name_field.render(
            frame,
            form_field::RenderProps {
                area: container_room_name,
                border_color: self.calculate_border_color(Section::RoomName),
                show_cursor: self.active_section == Some(Section::RoomName),
            },
        );

        self.config_toggle_list.render(
            frame,
            config_toggle_list::RenderProps {
                border_color: self.calculate_border_color(Section::ConfigToggles),
                area: container_toggles,
            },
        );

        self.redirect_field.render(
            frame,
            form_field::RenderProps {
                area: container_redirect,
                border_color: self.calculate_border_color(Section::Redirect),
                show_cursor: self.active_section == Some(Section::Redirect),
            },
        );

        let room_url = match self.props.room_url.as_ref() {
            Some(url) => Line::from(Span::from(url.as_str()).bold()),
            None => Line::from("Create or load a room to get its URL".italic()),
        };
        let room_url = Paragraph::new(room_url)
            .block(Block::default().borders(Borders::ALL).title("Room URL"));
        frame.render_widget(room_url, container_room_url);

        self.props.status_bar.render(frame, container_status);

        render_usage(frame, right, self.usage_info());
    }
}

impl HasUsageInfo for RoomPage {
    fn usage_info(&self) -> UsageInfo {
        if let Some(section) = self.active_section.as_ref() {
            let handler: &dyn HasUsageInfo = match section {
                Section::RoomName => &self.room_name_field,
                Section::ConfigToggles => &self.config_toggle_list,
                Section::Redirect => &self.redirect_field,
            };

            return handler.usage_info();
        }

        let mut lines = vec![
            UsageInfoLine::new(&["q"], "to exit"),
            UsageInfoLine::new(&["←", "→"], "to hover widgets"),
            UsageInfoLine::new(
                &["e"],
                format!(
                    "to edit {}",
                    self.get_component_for_section(&self.last_hovered_section)
                        .name()
                ),
            ),
        ];

        if !self.props.is_loading {
            lines.push(UsageInfoLine::new(&["c"], "to create the room"));
            lines.push(UsageInfoLine::new(&["l"], "to load its saved settings"));
            lines.push(UsageInfoLine::new(&["s"], "to save the settings"));

            if self.props.room_url.is_some() {
                lines.push(UsageInfoLine::new(&["j"], "to join the call"));
            }
        }

        if self.props.status_bar.has_error() {
            lines.push(UsageInfoLine::new(&["x"], "to dismiss the error"));
        }

        UsageInfo {
            description: Some("Prepare a room, then join its call".into()),
            lines,
        }
    }
}
