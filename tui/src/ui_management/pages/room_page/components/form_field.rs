use crossterm::event::{KeyEvent, KeyEventKind};
use ratatui::{
    prelude::{Backend, Rect},
    style::Color,
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, State};
use crate::ui_management::components::{
    input_box::{self, InputBox},
    section::SectionActivation,
    usage::{HasUsageInfo, UsageInfo, UsageInfoLine},
    Component, ComponentRender,
};

/// Labelled text input of the room form
pub struct FormField {
    label: &'static str,
    hint: &'static str,
    input_box: InputBox,
}

impl FormField {
    pub fn labelled(
        state: &State,
        action_tx: UnboundedSender<Action>,
        label: &'static str,
        hint: &'static str,
    ) -> Self {
        FormField {
            label,
            hint,
            input_box: InputBox::new(state, action_tx),
        }
    }

    pub fn value(&self) -> &str {
        self.input_box.text()
    }

    pub fn set_value(&mut self, value: &str) {
        self.input_box.set_text(value);
    }
}

impl Component for FormField {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self {
        FormField::labelled(state, action_tx, "Field", "Type a value")
    }

    fn move_with_state(self, _state: &State) -> Self
    where
        Self: Sized,
    {
        Self { ..self }
    }

    fn name(&self) -> &str {
        self.label
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        self.input_box.handle_key_event(key);
    }
}

// the value is kept when the field is left, it belongs to the form
impl SectionActivation for FormField {
    fn activate(&mut self) {}

    fn deactivate(&mut self) {}
}

pub struct RenderProps {
    pub area: Rect,
    pub border_color: Color,
    pub show_cursor: bool,
}

impl ComponentRender<RenderProps> for FormField {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: RenderProps) {
        self.input_box.render(
            frame,
            input_box::RenderProps {
                title: String::from(self.label),
                area: props.area,
                border_color: props.border_color,
                show_cursor: props.show_cursor,
            },
        )
    }
}

impl HasUsageInfo for FormField {
    fn usage_info(&self) -> UsageInfo {
        UsageInfo {
            description: Some(String::from(self.hint)),
            lines: vec![
                UsageInfoLine::new(&["Esc", "Enter"], "to finish editing"),
                UsageInfoLine::new(&["←", "→"], "to move the cursor"),
            ],
        }
    }
}
