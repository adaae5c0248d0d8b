//! Conversation store: the single owner of all chat state.
//!
//! Chats are kept in creation order. Each chat runs its own
//! `Idle -> AwaitingResponse -> Idle` cycle; a second send on a busy chat is
//! rejected with [`ChatError::Busy`] rather than queued, so for any one chat
//! the append order always equals the send order. The "current document"
//! (the answer pinned in the citation panel) is a process-wide slot,
//! last-writer-wins across chats; switching the active chat does not touch
//! it, only completing a send does.

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::{ChatError, Result};
use crate::events::StoreEvent;
use crate::types::{
    derive_title, AnswerPayload, Author, Chat, ChatId, ChatState, Message,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

pub struct ConversationStore {
    chats: Vec<Chat>,
    active: Option<ChatId>,
    current_document: Option<(ChatId, AnswerPayload)>,
    events: broadcast::Sender<StoreEvent>,
}

impl ConversationStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            chats: Vec::new(),
            active: None,
            current_document: None,
            events,
        }
    }

    /// Subscribe to store mutations. Slow subscribers may observe
    /// `Lagged`; the store itself never blocks on them.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ---- queries ----

    /// All chats, in creation order.
    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn chat(&self, id: ChatId) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == id)
    }

    pub fn active_chat_id(&self) -> Option<ChatId> {
        self.active
    }

    pub fn active_chat(&self) -> Option<&Chat> {
        self.active.and_then(|id| self.chat(id))
    }

    /// The answer currently pinned in the citation panel, with the chat
    /// whose completion produced it.
    pub fn current_document(&self) -> Option<(ChatId, &AnswerPayload)> {
        self.current_document.as_ref().map(|(id, p)| (*id, p))
    }

    // ---- mutations ----

    /// Create an empty chat and make it active.
    pub fn create_chat(&mut self) -> ChatId {
        let chat = Chat::new();
        let id = chat.id;
        self.chats.push(chat);
        self.active = Some(id);
        info!(chat_id = %id, "chat created");
        self.emit(StoreEvent::ChatCreated { chat_id: id });
        self.emit(StoreEvent::ChatSelected { chat_id: id });
        id
    }

    /// Make an existing chat active. Does not move the current document.
    pub fn select_chat(&mut self, id: ChatId) -> Result<()> {
        if self.chat(id).is_none() {
            return Err(ChatError::ChatNotFound(id));
        }
        self.active = Some(id);
        debug!(chat_id = %id, "chat selected");
        self.emit(StoreEvent::ChatSelected { chat_id: id });
        Ok(())
    }

    /// Record an outgoing user message and mark the chat busy.
    ///
    /// The network round trip happens elsewhere; the message is appended and
    /// returned synchronously so the transcript updates immediately. The
    /// chat's title freezes from its first message.
    pub fn begin_send(&mut self, chat_id: ChatId, text: &str) -> Result<Message> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyQuestion);
        }
        let chat = self
            .chats
            .iter_mut()
            .find(|c| c.id == chat_id)
            .ok_or(ChatError::ChatNotFound(chat_id))?;
        if chat.is_busy() {
            return Err(ChatError::Busy(chat_id));
        }

        if chat.messages.is_empty() {
            chat.title = derive_title(text);
        }
        let message = Message::from_user(text);
        chat.messages.push(message.clone());
        chat.state = ChatState::AwaitingResponse;
        debug!(chat_id = %chat_id, message_id = %message.id, "send started");

        self.emit(StoreEvent::MessageAppended {
            chat_id,
            message_id: message.id,
            author: Author::User,
        });
        self.emit(StoreEvent::ChatStateChanged {
            chat_id,
            state: ChatState::AwaitingResponse,
        });
        Ok(message)
    }

    /// Record the answer for an in-flight send and mark the chat idle.
    ///
    /// Always succeeds for a known chat: the gateway converts every failure
    /// to a diagnostic payload before this is called. The payload also
    /// becomes the process-wide current document.
    pub fn complete_send(&mut self, chat_id: ChatId, payload: AnswerPayload) -> Result<Message> {
        let chat = self
            .chats
            .iter_mut()
            .find(|c| c.id == chat_id)
            .ok_or(ChatError::ChatNotFound(chat_id))?;

        let message = Message::from_assistant(&payload);
        chat.messages.push(message.clone());
        chat.state = ChatState::Idle;
        chat.last_answer = Some(payload.clone());
        self.current_document = Some((chat_id, payload));
        debug!(chat_id = %chat_id, message_id = %message.id, "send completed");

        self.emit(StoreEvent::MessageAppended {
            chat_id,
            message_id: message.id,
            author: Author::Assistant,
        });
        self.emit(StoreEvent::ChatStateChanged {
            chat_id,
            state: ChatState::Idle,
        });
        self.emit(StoreEvent::CurrentDocumentChanged { chat_id });
        Ok(message)
    }

    fn emit(&self, event: StoreEvent) {
        // No receivers is fine; the store never depends on observers.
        let _ = self.events.send(event);
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
