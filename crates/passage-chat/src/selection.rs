//! Selection-to-question bridge.
//!
//! Holds the one live text selection made over the citation panel and turns
//! it into a question for the active chat. At most one selection exists at a
//! time; submitting or dismissing always clears it, so a stale popup can
//! never be double-submitted.

use crate::types::{Point, Selection};

#[derive(Debug, Default)]
pub struct SelectionBridge {
    current: Option<Selection>,
}

impl SelectionBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new selection, replacing any prior one. A selection that is
    /// empty after trimming clears the bridge instead (the gesture selected
    /// nothing worth asking about).
    pub fn on_select(&mut self, text: &str, anchor: Point) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.current = None;
        } else {
            self.current = Some(Selection {
                text: trimmed.to_string(),
                anchor,
            });
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    /// Clear the live selection. This is the explicit cancel affordance;
    /// a click outside the popup maps here.
    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Compose a question from the live selection without consuming it.
    ///
    /// With free text: `{free_text} (Regarding: "{selection}")`. Without,
    /// the bare selected text stands as an implicit "ask about this".
    /// Returns `None` when no selection is live.
    pub fn compose_question(&self, free_text: Option<&str>) -> Option<String> {
        let selection = self.current.as_ref()?;
        Some(match free_text {
            Some(free) => format!("{free} (Regarding: \"{}\")", selection.text),
            None => selection.text.clone(),
        })
    }

    /// Compose the question and clear the selection in one step.
    pub fn take_question(&mut self, free_text: Option<&str>) -> Option<String> {
        let question = self.compose_question(free_text);
        self.current = None;
        question
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> Point {
        Point { x: 10.0, y: 20.0 }
    }

    // ---- Selection lifecycle ----

    #[test]
    fn test_starts_with_no_selection() {
        let bridge = SelectionBridge::new();
        assert!(bridge.selection().is_none());
        assert!(bridge.compose_question(None).is_none());
    }

    #[test]
    fn test_on_select_records_trimmed_text() {
        let mut bridge = SelectionBridge::new();
        bridge.on_select("  some passage  ", anchor());
        assert_eq!(bridge.selection().unwrap().text, "some passage");
    }

    #[test]
    fn test_new_selection_replaces_prior_one() {
        let mut bridge = SelectionBridge::new();
        bridge.on_select("first", anchor());
        bridge.on_select("second", Point { x: 1.0, y: 2.0 });
        assert_eq!(bridge.selection().unwrap().text, "second");
    }

    #[test]
    fn test_whitespace_only_selection_clears() {
        let mut bridge = SelectionBridge::new();
        bridge.on_select("something", anchor());
        bridge.on_select("   ", anchor());
        assert!(bridge.selection().is_none());
    }

    #[test]
    fn test_dismiss_clears_selection() {
        let mut bridge = SelectionBridge::new();
        bridge.on_select("passage", anchor());
        bridge.dismiss();
        assert!(bridge.selection().is_none());
    }

    // ---- Question composition ----

    #[test]
    fn test_compose_with_free_text() {
        let mut bridge = SelectionBridge::new();
        bridge.on_select("the selected bit", anchor());
        assert_eq!(
            bridge.compose_question(Some("What does this mean?")).unwrap(),
            "What does this mean? (Regarding: \"the selected bit\")"
        );
    }

    #[test]
    fn test_compose_without_free_text_is_bare_selection() {
        let mut bridge = SelectionBridge::new();
        bridge.on_select("just this", anchor());
        assert_eq!(bridge.compose_question(None).unwrap(), "just this");
    }

    #[test]
    fn test_compose_does_not_consume_selection() {
        let mut bridge = SelectionBridge::new();
        bridge.on_select("keep me", anchor());
        bridge.compose_question(Some("q"));
        assert!(bridge.selection().is_some());
    }

    #[test]
    fn test_take_question_clears_selection() {
        let mut bridge = SelectionBridge::new();
        bridge.on_select("once only", anchor());
        let question = bridge.take_question(None).unwrap();
        assert_eq!(question, "once only");
        assert!(bridge.selection().is_none());
        // A second submit has nothing to send.
        assert!(bridge.take_question(None).is_none());
    }
}
