//! Conversation-and-citation engine for Passage.
//!
//! Manages independent chat threads against a remote question-answering
//! backend, normalizes the backend's drifting response shapes into one
//! canonical answer type, and tracks the citations and text selections that
//! drive the citation panel.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod gateway;
pub mod normalize;
pub mod presenter;
pub mod selection;
pub mod store;
pub mod suggest;
pub mod types;

pub use config::{validate_log_level, PassageConfig};
pub use engine::ChatEngine;
pub use error::{ChatError, Result};
pub use events::StoreEvent;
pub use gateway::{AnsweringClient, AnsweringGateway, QuestionTransport, TransportError};
pub use normalize::{normalize, RawAnswer};
pub use presenter::CitationPresenter;
pub use selection::SelectionBridge;
pub use store::ConversationStore;
pub use suggest::{fallback_suggestions, SuggestionGateway, MAX_SUGGESTIONS};
pub use types::{
    derive_title, AnswerPayload, Author, Chat, ChatId, ChatState, Citation, LineRange, Message,
    MessageId, Point, Selection, TITLE_MAX_CHARS, UNTITLED_CHAT,
};
