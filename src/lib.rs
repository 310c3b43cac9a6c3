//! Terminal chat client for a remote chat-completion endpoint.
//!
//! One screen: a scrolling message list, an input bar, and a single POST per
//! submitted message. [`state::ViewState`] holds everything the screen shows;
//! [`ui::conversation::ConversationManager`] feeds it terminal events and the
//! replies coming back from a [`llm::ChatTransport`].

pub mod config;
pub mod error;
pub mod events;
pub mod llm;
pub mod message;
pub mod state;
pub mod terminal;
pub mod ui;

pub use config::{Config, UiConfig};
pub use error::TransportFailure;
pub use llm::{ChatRequest, ChatTransport, LlmClient};
pub use message::{Message, Sender};
pub use state::ViewState;
