use std::io::{self, Stdout};

use anyhow::Context;
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::{
    broadcast,
    mpsc::{self, UnboundedReceiver},
};
use tokio_stream::StreamExt;

use crate::{
    state_store::{action::Action, State},
    ui_management::components::{Component, ComponentRender},
    Interrupted,
};

use super::pages::AppRouter;

/// [UiManager] owns the terminal, turns key presses into actions and renders every state
pub struct UiManager {
    action_tx: mpsc::UnboundedSender<Action>,
}

impl UiManager {
    pub fn new() -> (Self, UnboundedReceiver<Action>) {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        (Self { action_tx }, action_rx)
    }

    pub async fn main_loop(
        self,
        mut state_rx: UnboundedReceiver<State>,
        mut interrupt_rx: broadcast::Receiver<Interrupted>,
    ) -> anyhow::Result<Interrupted> {
        // the first state decides which page is shown
        let mut app_router = {
            let state = state_rx
                .recv()
                .await
                .context("the state store stopped before sending the first state")?;

            AppRouter::new(&state, self.action_tx.clone())
        };

        let mut terminal_session = TerminalSession::enter()?;
        let mut terminal_events = EventStream::new();

        draw(terminal_session.terminal(), &app_router)?;

        loop {
            tokio::select! {
                maybe_event = terminal_events.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        log::trace!("{} handles {:?}", app_router.name(), key.code);
                        app_router.handle_key_event(key);
                    },
                    // redrawn below with the new size
                    Some(Ok(Event::Resize(..))) => (),
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => {
                        return Err(err).context("could not read terminal events");
                    },
                    None => return Ok(Interrupted::UserInt),
                },
                maybe_state = state_rx.recv() => match maybe_state {
                    Some(state) => {
                        app_router = app_router.move_with_state(&state);
                    },
                    // the state store is gone, nothing left to render
                    None => return Ok(Interrupted::UserInt),
                },
                Ok(interrupted) = interrupt_rx.recv() => {
                    return Ok(interrupted);
                }
            }

            draw(terminal_session.terminal(), &app_router)?;
        }
    }
}

fn draw<B: Backend>(terminal: &mut Terminal<B>, app_router: &AppRouter) -> anyhow::Result<()> {
    terminal
        .draw(|frame| app_router.render(frame, ()))
        .context("could not render to the terminal")?;

    Ok(())
}

/// Raw mode on the alternate screen for as long as the value lives.
/// Mouse capture stays off so the join URL can be selected and copied.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn enter() -> anyhow::Result<Self> {
        enable_raw_mode().context("could not enable raw mode")?;

        // from here on a failure still restores the terminal through drop
        let mut terminal_session = TerminalSession {
            terminal: Terminal::new(CrosstermBackend::new(io::stdout()))?,
        };
        execute!(terminal_session.terminal.backend_mut(), EnterAlternateScreen)?;
        terminal_session.terminal.hide_cursor()?;

        Ok(terminal_session)
    }

    fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }

    fn restore(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;

        self.terminal.show_cursor()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            log::error!("could not restore the terminal: {}", err);
        }
    }
}
