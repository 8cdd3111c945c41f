use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{prelude::*, widgets::*, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, State, StoreConnectionStatus};

use crate::ui_management::components::{Component, ComponentRender};

struct Props {
    /// Host and port of the room store
    store_addr: String,
    store_connection_status: StoreConnectionStatus,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Props {
            store_addr: state.store_addr.clone(),
            store_connection_status: state.store_connection_status.clone(),
        }
    }
}

/// ConnectPage handles the connection to the room store
pub struct ConnectPage {
    /// Action sender
    pub action_tx: UnboundedSender<Action>,
    /// State Mapped ConnectPage Props
    props: Props,
}

impl ConnectPage {
    fn status_line(&self) -> Line<'_> {
        match &self.props.store_connection_status {
            StoreConnectionStatus::Uninitalized => Line::from(vec![
                "Press ".into(),
                "<Enter>".bold(),
                " to connect.".into(),
            ]),
            StoreConnectionStatus::Connecting => Line::from("Connecting...".italic()),
            StoreConnectionStatus::Errored { err } => Line::from(vec![
                Span::styled(
                    format!("Could not reach the room store: {}. ", err),
                    Style::default().fg(Color::Red),
                ),
                "Press ".into(),
                "<Enter>".bold(),
                " to retry.".into(),
            ]),
            StoreConnectionStatus::Connected { addr } => {
                Line::from(format!("Connected to {}.", addr))
            }
        }
    }
}

impl Component for ConnectPage {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self
    where
        Self: Sized,
    {
        ConnectPage {
            action_tx: action_tx.clone(),
            props: Props::from(state),
        }
        .move_with_state(state)
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        ConnectPage {
            props: Props::from(state),
            ..self
        }
    }

    fn name(&self) -> &str {
        "Connect Page"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Enter
                if self.props.store_connection_status != StoreConnectionStatus::Connecting =>
            {
                let _ = self.action_tx.send(Action::ConnectToStoreRequest {
                    addr: self.props.store_addr.clone(),
                });
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

impl ComponentRender<()> for ConnectPage {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, _props: ()) {
        let [_, vertical_centered, _] = *Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Ratio(1, 3),
                    Constraint::Min(1),
                    Constraint::Ratio(1, 3),
                ]
                .as_ref(),
            )
            .split(frame.size())
        else {
            panic!("The main layout should have 3 chunks")
        };

        let [_, both_centered, _] = *Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                [
                    Constraint::Ratio(1, 4),
                    Constraint::Min(1),
                    Constraint::Ratio(1, 4),
                ]
                .as_ref(),
            )
            .split(vertical_centered)
        else {
            panic!("The horizontal layout should have 3 chunks")
        };

        let [container_addr_input, container_help_text] = *Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(2)].as_ref())
            .split(both_centered)
        else {
            panic!("The centered layout should have 2 chunks")
        };

        let addr_input = Paragraph::new(Text::from(self.props.store_addr.as_str())).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Room Store Host and Port"),
        );
        frame.render_widget(addr_input, container_addr_input);

        let help_text = Paragraph::new(Text::from(vec![
            self.status_line(),
            Line::from(vec!["Press ".into(), "(q)".bold(), " to exit.".into()]),
        ]))
        .wrap(Wrap { trim: true });
        frame.render_widget(help_text, container_help_text);
    }
}
