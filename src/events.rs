use crossterm::event::{Event, KeyEvent, KeyEventKind};

/// Terminal events the conversation view reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Key press event
    Key(KeyEvent),

    /// Bracketed paste
    Paste(String),

    /// Terminal window gained focus
    FocusGained,

    /// Terminal window lost focus
    FocusLost,

    /// Terminal resize
    Resize(u16, u16),

    /// Animation tick
    Tick,
}

impl AppEvent {
    /// Map a raw crossterm event, dropping the ones the view ignores
    pub fn from_terminal(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
            Event::Paste(text) => Some(AppEvent::Paste(text)),
            Event::FocusGained => Some(AppEvent::FocusGained),
            Event::FocusLost => Some(AppEvent::FocusLost),
            Event::Resize(width, height) => Some(AppEvent::Resize(width, height)),
            _ => None,
        }
    }
}
