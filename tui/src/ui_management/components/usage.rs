use ratatui::{
    prelude::{Backend, Rect},
    style::Stylize,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Key bindings that trigger one behaviour
#[derive(Debug, Clone)]
pub struct UsageInfoLine {
    pub keys: Vec<String>,
    pub description: String,
}

impl UsageInfoLine {
    pub fn new(keys: &[&str], description: impl Into<String>) -> Self {
        UsageInfoLine {
            keys: keys.iter().map(|key| String::from(*key)).collect(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UsageInfo {
    pub description: Option<String>,
    pub lines: Vec<UsageInfoLine>,
}

pub trait HasUsageInfo {
    fn usage_info(&self) -> UsageInfo;
}

fn key_to_span<'a>(key: &str) -> Span<'a> {
    Span::from(format!("({})", key)).bold()
}

fn keys_to_spans<'a>(keys: &[String]) -> Vec<Span<'a>> {
    match keys {
        [] => vec![],
        [key] => vec![key_to_span(key)],
        [first, second] => vec![key_to_span(first), " or ".into(), key_to_span(second)],
        [init @ .., last] => {
            let mut bindings: Vec<Span> = Vec::with_capacity(keys.len() * 2);

            for key in init {
                bindings.push(key_to_span(key));
                bindings.push(", ".into());
            }

            bindings.push("or ".into());
            bindings.push(key_to_span(last));

            bindings
        }
    }
}

pub fn widget_usage_to_text<'a>(usage: UsageInfo) -> Text<'a> {
    let mut lines: Vec<Line> = vec![];
    if let Some(description) = usage.description {
        lines.push(Line::from(description));
    }

    for usage_line in usage.lines {
        let mut bindings = keys_to_spans(&usage_line.keys);
        bindings.push(Span::from(format!(" {}", usage_line.description)));

        lines.push(Line::from(bindings));
    }

    Text::from(lines)
}

/// Renders the usage of whatever currently handles the keyboard in a bordered box
pub fn render_usage<B: Backend>(frame: &mut Frame<B>, area: Rect, usage: UsageInfo) {
    let usage = Paragraph::new(widget_usage_to_text(usage))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Usage"));

    frame.render_widget(usage, area);
}
