//! Core data model for the conversation-and-citation engine.
//!
//! Chats own an append-only message sequence; assistant messages carry the
//! citations extracted from the backend's answer. All types here are plain
//! data — mutation rules live in the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of characters of the first user message used for a chat title.
pub const TITLE_MAX_CHARS: usize = 30;

/// Title given to a chat before its first user message arrives.
pub const UNTITLED_CHAT: &str = "New conversation";

/// Opaque chat identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub Uuid);

impl ChatId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChatId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque message identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Author {
    User,
    Assistant,
}

/// A line span within a cited source document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub from: u32,
    pub to: u32,
}

/// A cited source passage attached to an assistant answer.
///
/// Citations are derived data, scoped to the [`AnswerPayload`] that produced
/// them; they are not globally addressable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Verbatim content of the cited passage.
    pub text: String,
    /// Identifier of the source document the passage came from.
    pub source_label: String,
    /// Line span within the source, when the backend reported one.
    pub line_range: Option<LineRange>,
}

/// Canonical answer shape: normalized text plus its citations.
///
/// This is the unit stored as the "current document" for the citation panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerPayload {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl AnswerPayload {
    /// An answer with no citations.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }
}

/// One turn in a chat. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub author: Author,
    pub created_at: DateTime<Utc>,
    /// Citations carried by assistant messages; always empty for user messages.
    pub citations: Vec<Citation>,
}

impl Message {
    pub fn from_user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            content: content.into(),
            author: Author::User,
            created_at: Utc::now(),
            citations: Vec::new(),
        }
    }

    pub fn from_assistant(payload: &AnswerPayload) -> Self {
        Self {
            id: MessageId::new(),
            content: payload.text.clone(),
            author: Author::Assistant,
            created_at: Utc::now(),
            citations: payload.citations.clone(),
        }
    }
}

/// Request lifecycle state of a chat.
///
/// `Idle -> AwaitingResponse` on `begin_send`, back to `Idle` on
/// `complete_send`. There is no other transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatState {
    Idle,
    AwaitingResponse,
}

/// An ordered, independent conversation thread.
#[derive(Clone, Debug)]
pub struct Chat {
    pub id: ChatId,
    pub title: String,
    pub messages: Vec<Message>,
    pub state: ChatState,
    /// The chat's own most recent answer, kept so a front end can re-pin the
    /// citation panel when switching chats.
    pub last_answer: Option<AnswerPayload>,
}

impl Chat {
    pub fn new() -> Self {
        Self {
            id: ChatId::new(),
            title: UNTITLED_CHAT.to_string(),
            messages: Vec::new(),
            state: ChatState::Idle,
            last_answer: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state == ChatState::AwaitingResponse
    }

    /// Content of the newest message, for the chat-list sidebar.
    pub fn last_message_preview(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or(UNTITLED_CHAT)
    }
}

impl Default for Chat {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive a chat title from its first user message.
///
/// Truncates to [`TITLE_MAX_CHARS`] characters plus an ellipsis when longer.
pub fn derive_title(first_message: &str) -> String {
    let mut chars = first_message.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// A 2D coordinate, in front-end viewport units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A transient user text-highlight used to seed a follow-up question.
///
/// Lives from a selection gesture until submission or dismissal; never
/// persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub text: String,
    pub anchor: Point,
}
