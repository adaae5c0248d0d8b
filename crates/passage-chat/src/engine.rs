//! The chat engine: one object wiring the store, the answering gateway, the
//! citation presenter, and the selection bridge.
//!
//! All mutation happens on one logical thread; the gateway call is the only
//! suspension point. A send is split into three phases so that other chats
//! stay fully usable while one chat awaits its answer:
//! [`begin_send`](ChatEngine::begin_send) records the user message and
//! marks the chat busy, the shared [`gateway`](ChatEngine::gateway) handle
//! resolves the answer without borrowing the engine, and
//! [`complete_send`](ChatEngine::complete_send) appends the reply. The
//! `send_*` conveniences run all three phases for callers with nothing else
//! to do meanwhile.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use crate::error::Result;
use crate::events::StoreEvent;
use crate::gateway::{AnsweringGateway, QuestionTransport};
use crate::presenter::CitationPresenter;
use crate::selection::SelectionBridge;
use crate::store::ConversationStore;
use crate::types::{AnswerPayload, Chat, ChatId, Message, Point};

pub struct ChatEngine<T: QuestionTransport> {
    store: ConversationStore,
    gateway: Arc<AnsweringGateway<T>>,
    presenter: CitationPresenter,
    selection: SelectionBridge,
}

impl<T: QuestionTransport> ChatEngine<T> {
    /// Build an engine with one empty chat already active, so the first
    /// message needs no setup step.
    pub fn new(transport: T) -> Self {
        let mut store = ConversationStore::new();
        store.create_chat();
        info!("chat engine ready");
        Self {
            store,
            gateway: Arc::new(AnsweringGateway::new(transport)),
            presenter: CitationPresenter::new(),
            selection: SelectionBridge::new(),
        }
    }

    // ---- chat management ----

    pub fn create_chat(&mut self) -> ChatId {
        self.store.create_chat()
    }

    pub fn select_chat(&mut self, id: ChatId) -> Result<()> {
        self.store.select_chat(id)
    }

    pub fn chats(&self) -> &[Chat] {
        self.store.chats()
    }

    pub fn active_chat(&self) -> Option<&Chat> {
        self.store.active_chat()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.subscribe()
    }

    pub fn presenter(&self) -> &CitationPresenter {
        &self.presenter
    }

    // ---- messaging ----

    /// Shared handle to the answering gateway, for resolving a begun send
    /// without borrowing the engine. The returned handle can be moved into
    /// a spawned task.
    pub fn gateway(&self) -> Arc<AnsweringGateway<T>> {
        Arc::clone(&self.gateway)
    }

    /// Start a send: record the user message and mark the chat busy.
    ///
    /// Validation errors (`EmptyQuestion`, `Busy`, `ChatNotFound`) surface
    /// here, synchronously, before any network activity. The caller then
    /// resolves the answer via [`gateway`](Self::gateway) and hands it to
    /// [`complete_send`](Self::complete_send).
    pub fn begin_send(&mut self, chat_id: ChatId, text: &str) -> Result<Message> {
        self.store.begin_send(chat_id, text)
    }

    /// Finish a send: append the assistant reply, return the chat to idle,
    /// and pin the answer's citations in the presenter.
    pub fn complete_send(&mut self, chat_id: ChatId, answer: AnswerPayload) -> Result<Message> {
        let message = self.store.complete_send(chat_id, answer.clone())?;
        self.presenter.set_current(answer);
        Ok(message)
    }

    /// Send a question on the active chat and wait for its answer.
    ///
    /// Convenience over the begin/resolve/complete phases; holds the engine
    /// for the whole round trip, so use the phased calls when other chats
    /// must stay interactive meanwhile.
    pub async fn send_message(&mut self, text: &str) -> Result<Message> {
        let chat_id = match self.store.active_chat_id() {
            Some(id) => id,
            None => self.store.create_chat(),
        };
        self.send_on(chat_id, text).await
    }

    /// Send a question on a specific chat and wait for its answer.
    pub async fn send_on(&mut self, chat_id: ChatId, text: &str) -> Result<Message> {
        self.begin_send(chat_id, text)?;
        let answer = self.gateway.ask(text).await;
        self.complete_send(chat_id, answer)
    }

    // ---- text selection ----

    /// Record a text selection over the citation panel.
    pub fn on_select(&mut self, text: &str, anchor: Point) {
        self.selection.on_select(text, anchor);
    }

    pub fn selection(&self) -> &SelectionBridge {
        &self.selection
    }

    /// Dismiss the live selection without asking anything.
    pub fn dismiss_selection(&mut self) {
        self.selection.dismiss();
    }

    /// Compose the selection into a question and clear it, without sending.
    /// For callers that drive the phased send themselves.
    pub fn take_selection_question(&mut self, free_text: Option<&str>) -> Option<String> {
        self.selection.take_question(free_text)
    }

    /// Turn the live selection into a question and send it on the active
    /// chat. The selection is cleared unconditionally. Returns `Ok(None)`
    /// when nothing was sent: no live selection, or no active chat.
    pub async fn submit_selection(&mut self, free_text: Option<&str>) -> Result<Option<Message>> {
        let Some(question) = self.selection.take_question(free_text) else {
            return Ok(None);
        };
        let Some(chat_id) = self.store.active_chat_id() else {
            return Ok(None);
        };
        let message = self.send_on(chat_id, &question).await?;
        Ok(Some(message))
    }
}
