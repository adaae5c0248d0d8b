use serde::{Deserialize, Serialize};

use crate::types::{Author, ChatId, ChatState, MessageId};

/// All store mutations that observers can react to.
///
/// Events are emitted by the conversation store after state changes and
/// consumed by:
/// - Front-end listeners (transcript, sidebar, citation panel redraws)
/// - Structured logging
#[derive(Clone, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub enum StoreEvent {
    /// A new chat was created and made active.
    ChatCreated { chat_id: ChatId },

    /// An existing chat became the active chat.
    ChatSelected { chat_id: ChatId },

    /// A message was appended to a chat's transcript.
    MessageAppended {
        chat_id: ChatId,
        message_id: MessageId,
        author: Author,
    },

    /// A chat moved between `Idle` and `AwaitingResponse`.
    ChatStateChanged { chat_id: ChatId, state: ChatState },

    /// The process-wide current document (citation panel source) was replaced.
    CurrentDocumentChanged { chat_id: ChatId },
}

impl StoreEvent {
    /// Returns a human-readable event name for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            StoreEvent::ChatCreated { .. } => "chat_created",
            StoreEvent::ChatSelected { .. } => "chat_selected",
            StoreEvent::MessageAppended { .. } => "message_appended",
            StoreEvent::ChatStateChanged { .. } => "chat_state_changed",
            StoreEvent::CurrentDocumentChanged { .. } => "current_document_changed",
        }
    }

    /// The chat this event concerns.
    pub fn chat_id(&self) -> ChatId {
        match self {
            StoreEvent::ChatCreated { chat_id }
            | StoreEvent::ChatSelected { chat_id }
            | StoreEvent::MessageAppended { chat_id, .. }
            | StoreEvent::ChatStateChanged { chat_id, .. }
            | StoreEvent::CurrentDocumentChanged { chat_id } => *chat_id,
        }
    }
}
