use crossterm::event::KeyEvent;
use ratatui::{prelude::Backend, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, State};

use self::{call_page::CallPage, connect_page::ConnectPage, room_page::RoomPage};

use super::components::{Component, ComponentRender};

mod call_page;
mod connect_page;
mod room_page;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ActivePage {
    ConnectPage,
    RoomPage,
    CallPage,
}

struct Props {
    active_page: ActivePage,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        // a joined call outlives the store connection
        let active_page = if state.has_joined_call() {
            ActivePage::CallPage
        } else if state.is_connected() {
            ActivePage::RoomPage
        } else {
            ActivePage::ConnectPage
        };

        Props { active_page }
    }
}

pub struct AppRouter {
    props: Props,
    //
    connect_page: ConnectPage,
    room_page: RoomPage,
    call_page: CallPage,
}

impl AppRouter {
    fn get_active_page_component(&self) -> &dyn Component {
        match self.props.active_page {
            ActivePage::ConnectPage => &self.connect_page,
            ActivePage::RoomPage => &self.room_page,
            ActivePage::CallPage => &self.call_page,
        }
    }

    fn get_active_page_component_mut(&mut self) -> &mut dyn Component {
        match self.props.active_page {
            ActivePage::ConnectPage => &mut self.connect_page,
            ActivePage::RoomPage => &mut self.room_page,
            ActivePage::CallPage => &mut self.call_page,
        }
    }
}

impl Component for AppRouter {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self
    where
        Self: Sized,
    {
        AppRouter {
            props: Props::from(state),
            //
            connect_page: ConnectPage::new(state, action_tx.clone()),
            room_page: RoomPage::new(state, action_tx.clone()),
            call_page: CallPage::new(state, action_tx),
        }
        .move_with_state(state)
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        AppRouter {
            props: Props::from(state),
            //
            connect_page: self.connect_page.move_with_state(state),
            room_page: self.room_page.move_with_state(state),
            call_page: self.call_page.move_with_state(state),
        }
    }

    // route all functions to the active page
    fn name(&self) -> &str {
        self.get_active_page_component().name()
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        self.get_active_page_component_mut().handle_key_event(key)
    }
}

impl ComponentRender<()> for AppRouter {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: ()) {
        match self.props.active_page {
            ActivePage::ConnectPage => self.connect_page.render(frame, props),
            ActivePage::RoomPage => self.room_page.render(frame, props),
            ActivePage::CallPage => self.call_page.render(frame, props),
        }
    }
}
