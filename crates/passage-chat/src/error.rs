//! Error taxonomy for the conversation engine.
//!
//! `EmptyQuestion`, `Busy`, and `ChatNotFound` are local, synchronous
//! rejections surfaced at the call site with no partial state change.
//! `Transport` and `MalformedResponse` never cross the gateway boundary:
//! the gateway converts them to diagnostic answer payloads before they can
//! reach the store.

use crate::types::ChatId;

/// Errors from the conversation engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("question cannot be empty")]
    EmptyQuestion,
    #[error("chat {0} already has a request in flight")]
    Busy(ChatId),
    #[error("chat not found: {0}")]
    ChatNotFound(ChatId),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for ChatError {
    fn from(e: toml::de::Error) -> Self {
        ChatError::Config(e.to_string())
    }
}

/// A specialized `Result` type for engine operations.
pub type Result<T> = std::result::Result<T, ChatError>;
