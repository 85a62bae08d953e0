//! Message DTOs exchanged with the emoji chat server.

use serde::{Deserialize, Serialize};

/// One chat message as sent by the server.
///
/// `author` and `content` are split into grapheme units so that each
/// glyph can be rendered on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub author: Vec<String>,
    pub content: Vec<String>,
    /// Milliseconds since the server epoch, see `emoji_chat_shared::time`.
    pub timestamp: i64,
}

impl MessageRecord {
    pub fn author_text(&self) -> String {
        self.author.concat()
    }

    pub fn content_text(&self) -> String {
        self.content.concat()
    }
}

/// Server → client messages, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Full message history; replaces the rendered log.
    Messages { messages: Vec<MessageRecord> },
    /// A single new message.
    Message { message: MessageRecord },
    /// Connection greeting carrying the current user's identity.
    Init { current_user: Vec<String> },
    /// Connected users; diagnostic only.
    Users { users: serde_json::Value },
    /// The last submission was rate limited.
    Ratelimit {
        #[serde(rename = "Retry-After")]
        retry_after: f64,
    },
    /// The last submission was rejected.
    Error { error: String },
    /// Any `type` this client does not know.
    #[serde(skip)]
    Unknown { kind: String },
}

impl ServerMessage {
    /// `type` values handled by this client.
    pub const KNOWN_TYPES: [&'static str; 6] =
        ["messages", "message", "init", "users", "ratelimit", "error"];

    pub fn kind(&self) -> &str {
        match self {
            ServerMessage::Messages { .. } => "messages",
            ServerMessage::Message { .. } => "message",
            ServerMessage::Init { .. } => "init",
            ServerMessage::Users { .. } => "users",
            ServerMessage::Ratelimit { .. } => "ratelimit",
            ServerMessage::Error { .. } => "error",
            ServerMessage::Unknown { kind } => kind,
        }
    }
}

/// Client → server messages, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Submit chat text.
    Message { message: String },
}
