use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Avatar glyph shown beside the bubble
    pub fn avatar(&self) -> &'static str {
        match self {
            Sender::User => "👤",
            Sender::Bot => "🤖",
        }
    }
}

/// A single entry in the conversation. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    id: i64,
    text: String,
    sender: Sender,
    timestamp: String,
}

impl Message {
    fn at(now: DateTime<Utc>, id_offset: i64, text: String, sender: Sender) -> Self {
        Self {
            id: now.timestamp_millis() + id_offset,
            text,
            sender,
            timestamp: now.with_timezone(&Local).format("%H:%M:%S").to_string(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::at(Utc::now(), 0, text.into(), Sender::User)
    }

    /// Bot ids sit one millisecond after "now" so a reply never collides
    /// with the user message created in the same millisecond.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::at(Utc::now(), 1, text.into(), Sender::Bot)
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}
