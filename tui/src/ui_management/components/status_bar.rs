use ratatui::{
    prelude::{Backend, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::state_store::State;

/// Loading indicator, the current error and the last notice, in that priority
pub struct StatusBar {
    is_loading: bool,
    error: Option<String>,
    notice: Option<String>,
}

impl From<&State> for StatusBar {
    fn from(state: &State) -> Self {
        StatusBar {
            is_loading: state.is_loading,
            error: state.error.as_ref().map(|error| error.message.clone()),
            notice: state.notice.clone(),
        }
    }
}

impl StatusBar {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    fn line(&self) -> Line<'_> {
        if self.is_loading {
            return Line::from(Span::raw("Loading...").italic());
        }

        match (self.error.as_ref(), self.notice.as_ref()) {
            (Some(error), _) => Line::from(vec![
                Span::styled(error.as_str(), Style::default().fg(Color::Red)),
                " ".into(),
                "(x)".bold(),
                " to dismiss".into(),
            ]),
            (None, Some(notice)) => Line::from(Span::styled(
                notice.as_str(),
                Style::default().fg(Color::Green),
            )),
            (None, None) => Line::default(),
        }
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, area: Rect) {
        let status = Paragraph::new(self.line())
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Status"));

        frame.render_widget(status, area);
    }
}
