use crate::ui::text::visual_rows;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

const PLACEHOLDER: &str = "Type your message...";
const CURSOR: char = '▌';

/// Result of feeding one key to the composer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerAction {
    /// Enter without a modifier; nothing was inserted
    Submit,
    /// The input text changed
    Edited,
    /// Only the cursor moved, or the key was not for the composer
    None,
}

/// Text being composed, with a cursor kept on a char boundary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextAreaState {
    content: String,
    cursor_position: usize,
}

impl TextAreaState {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn set(&mut self, text: &str) {
        self.content = text.to_string();
        self.cursor_position = self.content.len();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor_position = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor_position, c);
        self.cursor_position += c.len_utf8();
    }

    pub fn insert_str(&mut self, text: &str) {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        self.content.insert_str(self.cursor_position, &text);
        self.cursor_position += text.len();
    }

    /// Delete the char before the cursor
    pub fn backspace(&mut self) -> bool {
        match self.content[..self.cursor_position].chars().next_back() {
            Some(c) => {
                self.cursor_position -= c.len_utf8();
                self.content.remove(self.cursor_position);
                true
            }
            None => false,
        }
    }

    /// Delete the char under the cursor
    pub fn delete(&mut self) -> bool {
        if self.cursor_position < self.content.len() {
            self.content.remove(self.cursor_position);
            true
        } else {
            false
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.content[..self.cursor_position].chars().next_back() {
            self.cursor_position -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.content[self.cursor_position..].chars().next() {
            self.cursor_position += c.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_position = self.content.len();
    }

    /// Content with the cursor glyph drawn in place
    fn with_cursor(&self) -> String {
        let mut content = self.content.clone();
        content.insert(self.cursor_position, CURSOR);
        content
    }

    /// Wrapped rows of the content at `width` cells, cursor cell included
    fn rows(&self, width: usize) -> Vec<String> {
        visual_rows(&self.with_cursor(), width)
    }

    /// Wrapped row holding the cursor
    fn cursor_row(&self, width: usize) -> usize {
        let mut before = self.content[..self.cursor_position].to_string();
        before.push(CURSOR);
        visual_rows(&before, width).len() - 1
    }
}

/// Shift+Enter inserts a newline. Alt+Enter does too because many terminals
/// never report Shift on Enter.
fn is_newline_modifier(modifiers: KeyModifiers) -> bool {
    modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT)
}

/// Apply a key press to the input text
pub fn handle_key(state: &mut TextAreaState, key: KeyEvent) -> ComposerAction {
    if key.kind != KeyEventKind::Press {
        return ComposerAction::None;
    }

    match key.code {
        KeyCode::Enter if is_newline_modifier(key.modifiers) => {
            state.insert_char('\n');
            ComposerAction::Edited
        }
        KeyCode::Enter => ComposerAction::Submit,
        KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => ComposerAction::None,
        KeyCode::Char(c) => {
            state.insert_char(c);
            ComposerAction::Edited
        }
        KeyCode::Backspace if state.backspace() => ComposerAction::Edited,
        KeyCode::Delete if state.delete() => ComposerAction::Edited,
        KeyCode::Left => {
            state.move_left();
            ComposerAction::None
        }
        KeyCode::Right => {
            state.move_right();
            ComposerAction::None
        }
        KeyCode::Home => {
            state.move_home();
            ComposerAction::None
        }
        KeyCode::End => {
            state.move_end();
            ComposerAction::None
        }
        _ => ComposerAction::None,
    }
}

/// Rows the input bar needs at `width` columns: wrapped content rows capped
/// at `max_lines`, plus borders
pub fn height(state: &TextAreaState, width: u16, max_lines: u16) -> u16 {
    let inner_width = width.saturating_sub(2) as usize;
    let rows = u16::try_from(state.rows(inner_width).len()).unwrap_or(u16::MAX);
    rows.clamp(1, max_lines.max(1)) + 2
}

/// Input bar widget
pub struct ComposerView<'a> {
    state: &'a TextAreaState,
    has_focus: bool,
    can_send: bool,
}

impl<'a> ComposerView<'a> {
    pub fn new(state: &'a TextAreaState, has_focus: bool, can_send: bool) -> Self {
        Self {
            state,
            has_focus,
            can_send,
        }
    }

    fn title(&self) -> Line<'static> {
        let hint_style = if self.can_send {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Line::from(vec![
            Span::raw(" Message "),
            Span::styled("· Enter to send, Shift+Enter for new line ", hint_style),
        ])
    }
}

impl Widget for ComposerView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title())
            .border_style(if self.has_focus {
                Style::default().fg(Color::Magenta)
            } else {
                Style::default().fg(Color::Gray)
            });

        let inner_area = block.inner(area);
        block.render(area, buf);

        if inner_area.height == 0 {
            return;
        }

        if self.state.content().is_empty() {
            let mut spans = Vec::new();
            if self.has_focus {
                spans.push(Span::raw(CURSOR.to_string()));
            }
            spans.push(Span::styled(
                PLACEHOLDER,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ));
            buf.set_line(inner_area.x, inner_area.y, &Line::from(spans), inner_area.width);
            return;
        }

        let width = inner_area.width as usize;
        let rows = if self.has_focus {
            self.state.rows(width)
        } else {
            visual_rows(self.state.content(), width)
        };

        // Keep the cursor row in view once the content outgrows the bar.
        let height = inner_area.height as usize;
        let first = (self.state.cursor_row(width) + 1)
            .saturating_sub(height)
            .min(rows.len().saturating_sub(height));

        for (i, row) in rows.into_iter().skip(first).take(height).enumerate() {
            let line = Line::from(vec![Span::raw(row)]);
            buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
        }
    }
}
