//! Conversation UI components for the chat screen

pub mod composer;
pub mod history;
pub mod manager;

pub use composer::{ComposerView, TextAreaState};
pub use history::HistoryView;
pub use manager::{ConversationAction, ConversationManager};
