use crate::config::UiConfig;
use crate::error::TransportFailure;
use crate::events::AppEvent;
use crate::llm::ChatTransport;
use crate::state::ViewState;
use crate::ui::conversation::composer::{self, ComposerAction, ComposerView};
use crate::ui::conversation::history::HistoryView;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

type Reply = Result<String, TransportFailure>;

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Exit,
}

/// Drives the conversation view: routes events into [`ViewState`] and runs
/// the one in-flight request.
pub struct ConversationManager {
    state: ViewState,
    transport: Arc<dyn ChatTransport>,
    reply_tx: mpsc::UnboundedSender<Reply>,
    reply_rx: mpsc::UnboundedReceiver<Reply>,
    ui: UiConfig,
    tick: usize,
    history_area: Rect,
}

impl ConversationManager {
    pub fn new(transport: Arc<dyn ChatTransport>, ui: UiConfig) -> Self {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        Self {
            state: ViewState::new(),
            transport,
            reply_tx,
            reply_rx,
            ui,
            tick: 0,
            history_area: Rect::default(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Handle one normalised terminal event
    pub fn handle_event(&mut self, event: AppEvent) -> ConversationAction {
        match event {
            AppEvent::Key(key) => return self.handle_key(key),
            AppEvent::Paste(text) => self.state.edit_input().insert_str(&text),
            AppEvent::FocusGained => self.state.set_focus(true),
            AppEvent::FocusLost => self.state.set_focus(false),
            AppEvent::Tick => self.on_tick(),
            AppEvent::Resize(width, height) => debug!(width, height, "terminal resized"),
        }
        ConversationAction::None
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        if key.kind != KeyEventKind::Press {
            return ConversationAction::None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let page = self.history_area.height.saturating_sub(2).max(1);
        match key.code {
            KeyCode::Esc => return ConversationAction::Exit,
            KeyCode::Char('c') if ctrl => return ConversationAction::Exit,
            KeyCode::PageUp => self.state.scroll_up(page),
            KeyCode::PageDown => self.state.scroll_down(page),
            KeyCode::Up if ctrl => self.state.scroll_up(1),
            KeyCode::Down if ctrl => self.state.scroll_down(1),
            _ => {
                if composer::handle_key(self.state.edit_input(), key) == ComposerAction::Submit {
                    self.submit();
                }
            }
        }
        ConversationAction::None
    }

    /// Start an exchange if the view allows one. Returns whether a request
    /// was dispatched.
    pub fn submit(&mut self) -> bool {
        let Some(request) = self.state.begin_submit() else {
            return false;
        };

        let transport = Arc::clone(&self.transport);
        let reply_tx = self.reply_tx.clone();
        tokio::spawn(async move {
            let reply = transport.send(&request).await;
            // The receiver lives as long as the manager; a send error only
            // means the app is shutting down.
            let _ = reply_tx.send(reply);
        });
        true
    }

    /// Apply any finished exchange (called from the main loop)
    pub fn process_replies(&mut self) {
        while let Ok(reply) = self.reply_rx.try_recv() {
            self.state.finish_submit(reply);
        }
    }

    /// Wait for the in-flight exchange to finish and apply it. Returns
    /// immediately when nothing is in flight.
    pub async fn wait_for_reply(&mut self) {
        if !self.state.is_loading() {
            return;
        }
        if let Some(reply) = self.reply_rx.recv().await {
            self.state.finish_submit(reply);
        }
    }

    /// Advance the spinner animation
    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Render the whole conversation screen
    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let composer_height = composer::height(self.state.input(), area.width, self.ui.max_input_lines);
        let error_height = u16::from(self.state.error().is_some());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),               // Header
                Constraint::Min(3),                  // History
                Constraint::Length(composer_height), // Composer
                Constraint::Length(error_height),    // Error line
            ])
            .split(area);

        self.history_area = chunks[1];
        let max_scroll = HistoryView::new(&self.state, self.tick).max_scroll(chunks[1]);
        self.state.clamp_scroll(max_scroll);

        self.render_header(chunks[0], buf);
        HistoryView::new(&self.state, self.tick).render(chunks[1], buf);
        ComposerView::new(self.state.input(), self.state.has_focus(), self.state.can_submit())
            .render(chunks[2], buf);

        if let Some(error) = self.state.error() {
            Paragraph::new(Line::from(Span::styled(error.to_string(), Style::default().fg(Color::Red))))
                .alignment(Alignment::Center)
                .render(chunks[3], buf);
        }
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let title = Line::from(Span::styled(
            self.ui.title.clone(),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ));
        Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .render(area, buf);
    }
}
