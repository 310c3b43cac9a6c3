//! Conversation history display component

use crate::message::{Message, Sender};
use crate::state::ViewState;
use crate::ui::text::wrap_text;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Message list widget: placeholder, bubbles and the thinking indicator
pub struct HistoryView<'a> {
    state: &'a ViewState,
    tick: usize,
}

impl<'a> HistoryView<'a> {
    pub fn new(state: &'a ViewState, tick: usize) -> Self {
        Self { state, tick }
    }

    fn block() -> Block<'static> {
        Block::default().borders(Borders::ALL)
    }

    /// Furthest the view can be scrolled up within `area`
    pub fn max_scroll(&self, area: Rect) -> u16 {
        let inner = Self::block().inner(area);
        let total = self.lines(inner.width).len();
        u16::try_from(total.saturating_sub(inner.height as usize)).unwrap_or(u16::MAX)
    }

    /// All lines of the conversation at the given width
    fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut all_lines = Vec::new();
        for message in self.state.messages() {
            all_lines.extend(message_lines(message, width));
            all_lines.push(Line::raw(""));
        }
        if self.state.shows_thinking() {
            all_lines.extend(thinking_lines(self.tick));
        }
        all_lines
    }
}

impl Widget for HistoryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Self::block();
        let inner_area = block.inner(area);

        if self.state.messages().is_empty() && !self.state.shows_thinking() {
            Paragraph::new(placeholder_lines())
                .alignment(Alignment::Center)
                .block(block)
                .render(area, buf);
            return;
        }

        let lines = self.lines(inner_area.width);
        let total = lines.len();
        let height = inner_area.height as usize;
        let max_offset = total.saturating_sub(height);
        let offset = (self.state.scroll_offset() as usize).min(max_offset);
        let top = u16::try_from(max_offset - offset).unwrap_or(u16::MAX);

        Paragraph::new(lines)
            .block(block)
            .scroll((top, 0))
            .render(area, buf);
    }
}

fn placeholder_lines() -> Vec<Line<'static>> {
    vec![
        Line::raw(""),
        Line::from(Span::styled("🤖", Style::default().fg(Color::DarkGray))),
        Line::raw(""),
        Line::from(Span::styled(
            "Start a conversation",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "I'm your AI assistant. How can I help you today?",
            Style::default().fg(Color::Gray),
        )),
    ]
}

fn bubble_style(sender: Sender) -> Style {
    match sender {
        Sender::User => Style::default().fg(Color::White).bg(Color::Blue),
        Sender::Bot => Style::default().fg(Color::Black).bg(Color::Gray),
    }
}

/// Bubbles take at most 70% of the row, in cells
fn bubble_width(width: u16) -> usize {
    (width as usize * 7 / 10).max(10).min(width as usize)
}

fn message_lines(message: &Message, width: u16) -> Vec<Line<'static>> {
    let sender = message.sender();
    let alignment = match sender {
        Sender::User => Alignment::Right,
        Sender::Bot => Alignment::Left,
    };
    let meta_style = Style::default().fg(Color::DarkGray);

    let header = match sender {
        Sender::User => Line::from(vec![
            Span::styled(format!("{} ", message.timestamp()), meta_style),
            Span::raw(sender.avatar()),
        ]),
        Sender::Bot => Line::from(vec![
            Span::raw(sender.avatar()),
            Span::styled(format!(" {}", message.timestamp()), meta_style),
        ]),
    };

    let mut lines = vec![header.alignment(alignment)];
    let style = bubble_style(sender);
    for content_line in wrap_text(message.text(), bubble_width(width).saturating_sub(2)) {
        lines.push(Line::from(Span::styled(format!(" {content_line} "), style)).alignment(alignment));
    }
    lines
}

fn thinking_lines(tick: usize) -> Vec<Line<'static>> {
    let frame = SPINNER[tick % SPINNER.len()];
    vec![
        Line::from(Span::raw(Sender::Bot.avatar())),
        Line::from(Span::styled(
            format!(" {frame} Thinking... "),
            bubble_style(Sender::Bot).add_modifier(Modifier::ITALIC),
        )),
    ]
}
