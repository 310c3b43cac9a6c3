//! The conversation view's state record.
//!
//! Every mutation goes through one of the transitions below: submit start,
//! submit finish (success or failure), input change, focus change and
//! scrolling. The thinking indicator is not stored; it is whatever
//! [`ViewState::is_loading`] says.

use crate::error::TransportFailure;
use crate::llm::ChatRequest;
use crate::message::Message;
use crate::ui::conversation::composer::TextAreaState;
use tracing::{debug, warn};

/// Bot message appended when an exchange fails
pub const APOLOGY_TEXT: &str =
    "Sorry, there was a problem connecting to the server. Please check your network connection or try again later.";

/// Error line shown under the input after a failed exchange
pub const FAILURE_TEXT: &str = "Connection failed, please try again later.";

#[derive(Debug, Clone)]
pub struct ViewState {
    messages: Vec<Message>,
    input: TextAreaState,
    is_loading: bool,
    error: Option<String>,
    has_focus: bool,
    /// Lines scrolled up from the newest entry
    scroll_offset: u16,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            input: TextAreaState::default(),
            is_loading: false,
            error: None,
            has_focus: true,
            scroll_offset: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &TextAreaState {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn scroll_offset(&self) -> u16 {
        self.scroll_offset
    }

    /// Whether the transient "thinking" bubble is shown
    pub fn shows_thinking(&self) -> bool {
        self.is_loading
    }

    /// Submission needs non-blank input and no request in flight
    pub fn can_submit(&self) -> bool {
        !self.is_loading && !self.input.is_blank()
    }

    /// Input change: hand out the text area for editing
    pub fn edit_input(&mut self) -> &mut TextAreaState {
        &mut self.input
    }

    /// Input change: replace the whole input text
    pub fn set_input(&mut self, text: &str) {
        self.input.set(text);
    }

    /// Focus change. Cosmetic only.
    pub fn set_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }

    /// Submit start.
    ///
    /// Returns the request to send, or `None` when submission is disabled.
    pub fn begin_submit(&mut self) -> Option<ChatRequest> {
        if !self.can_submit() {
            debug!(loading = self.is_loading, "submit ignored");
            return None;
        }

        let text = self.input.content().trim().to_string();
        self.push(Message::user(text.clone()));
        self.input.clear();
        self.is_loading = true;
        self.error = None;

        let request = ChatRequest::new(text);
        debug!(conversation_id = %request.conversation_id, "submit started");
        Some(request)
    }

    /// Submit finish. Both outcomes clear the loading flag.
    pub fn finish_submit(&mut self, outcome: Result<String, TransportFailure>) {
        if !self.is_loading {
            warn!("reply arrived with no request in flight, dropping it");
            return;
        }

        match outcome {
            Ok(text) => {
                debug!("submit succeeded");
                self.push(Message::bot(text));
            }
            Err(err) => {
                warn!(error = %err, "failed to send message");
                self.push(Message::bot(APOLOGY_TEXT));
                self.error = Some(FAILURE_TEXT.to_string());
            }
        }

        self.is_loading = false;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Keep the offset within what the history can actually scroll
    pub fn clamp_scroll(&mut self, max_offset: u16) {
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    /// Append and snap to the newest entry
    fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.scroll_offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Sender;

    fn loading_state(text: &str) -> (ViewState, ChatRequest) {
        let mut state = ViewState::new();
        state.set_input(text);
        let request = state.begin_submit().expect("submit should start");
        (state, request)
    }

    #[test]
    fn blank_input_is_a_no_op() {
        let mut state = ViewState::new();
        assert!(state.begin_submit().is_none());

        state.set_input("   \n\t ");
        assert!(state.begin_submit().is_none());
        assert!(state.messages().is_empty());
        assert!(!state.is_loading());
        assert_eq!(state.input().content(), "   \n\t ");
    }

    #[test]
    fn submit_start_appends_trimmed_user_message() {
        let (state, request) = loading_state("  hello there \n");

        assert_eq!(request.message, "hello there");
        assert!(request.conversation_id.starts_with("chat_"));
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.messages()[0].text(), "hello there");
        assert_eq!(state.messages()[0].sender(), Sender::User);
        assert!(state.input().content().is_empty());
        assert!(state.is_loading());
        assert!(state.shows_thinking());
    }

    #[test]
    fn submit_while_loading_is_ignored() {
        let (mut state, _) = loading_state("first");
        state.set_input("second");

        assert!(!state.can_submit());
        assert!(state.begin_submit().is_none());
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.input().content(), "second");
    }

    #[test]
    fn success_appends_one_bot_message() {
        let (mut state, _) = loading_state("hello");
        state.finish_submit(Ok("hi".to_string()));

        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[1].text(), "hi");
        assert_eq!(state.messages()[1].sender(), Sender::Bot);
        assert!(!state.is_loading());
        assert!(!state.shows_thinking());
        assert_eq!(state.error(), None);
    }

    #[test]
    fn failure_signals_twice() {
        let (mut state, _) = loading_state("hello");
        state.finish_submit(Err(TransportFailure::Status(500)));

        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[1].text(), APOLOGY_TEXT);
        assert_eq!(state.messages()[1].sender(), Sender::Bot);
        assert_eq!(state.error(), Some(FAILURE_TEXT));
        assert!(!state.is_loading());
    }

    #[test]
    fn next_submit_clears_previous_error() {
        let (mut state, _) = loading_state("hello");
        state.finish_submit(Err(TransportFailure::Status(502)));

        state.set_input("again");
        assert!(state.begin_submit().is_some());
        assert_eq!(state.error(), None);
    }

    #[test]
    fn stray_reply_is_dropped() {
        let mut state = ViewState::new();
        state.finish_submit(Ok("late".to_string()));
        assert!(state.messages().is_empty());
    }

    #[test]
    fn appends_snap_scroll_to_newest() {
        let (mut state, _) = loading_state("hello");
        state.scroll_up(7);
        assert_eq!(state.scroll_offset(), 7);

        state.finish_submit(Ok("hi".to_string()));
        assert_eq!(state.scroll_offset(), 0);

        state.scroll_up(4);
        state.clamp_scroll(2);
        assert_eq!(state.scroll_offset(), 2);
        state.scroll_down(5);
        assert_eq!(state.scroll_offset(), 0);
    }

    #[test]
    fn focus_is_tracked() {
        let mut state = ViewState::new();
        assert!(state.has_focus());
        state.set_focus(false);
        assert!(!state.has_focus());
    }
}
