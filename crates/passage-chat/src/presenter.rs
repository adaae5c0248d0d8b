//! Citation presenter: display ordering and highlight state for the
//! citation panel.
//!
//! Highlighting is purely cosmetic and deterministic: a citation is
//! highlighted while its text is a substring of the previous turn's answer
//! text, which visually separates newly relevant passages from carryovers.

use crate::types::{AnswerPayload, Citation};

#[derive(Debug, Default)]
pub struct CitationPresenter {
    current: Option<AnswerPayload>,
    previous: Option<AnswerPayload>,
}

impl CitationPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the answer to present, rotating the old one into the
    /// previous-turn slot used by [`is_highlighted`](Self::is_highlighted).
    pub fn set_current(&mut self, payload: AnswerPayload) {
        self.previous = self.current.take();
        self.current = Some(payload);
    }

    /// Citations of the current answer, in backend encounter order.
    pub fn citations(&self) -> &[Citation] {
        self.current
            .as_ref()
            .map(|p| p.citations.as_slice())
            .unwrap_or(&[])
    }

    pub fn current(&self) -> Option<&AnswerPayload> {
        self.current.as_ref()
    }

    /// Whether a citation's text appears inside the previous turn's answer.
    pub fn is_highlighted(&self, citation_text: &str) -> bool {
        self.previous
            .as_ref()
            .is_some_and(|p| p.text.contains(citation_text))
    }
}
