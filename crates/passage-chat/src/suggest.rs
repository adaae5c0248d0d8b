//! Follow-up suggestions for assistant answers.
//!
//! An optional collaborator: given an assistant message's text, the remote
//! service returns suggested follow-up questions as newline-separated text,
//! with the same stray-trailing-byte artifact as the answering backend.
//! Like the answering gateway, this never fails — any problem substitutes a
//! deterministic fallback trio.

use tracing::warn;

use crate::gateway::QuestionTransport;
use crate::normalize::strip_stray_trailing_byte;

/// Upper bound on suggestions shown per answer.
pub const MAX_SUGGESTIONS: usize = 3;

/// Characters of the source message embedded into a fallback suggestion.
const FALLBACK_EXCERPT_CHARS: usize = 30;

pub struct SuggestionGateway<T: QuestionTransport> {
    transport: T,
}

impl<T: QuestionTransport> SuggestionGateway<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Fetch up to [`MAX_SUGGESTIONS`] follow-up questions for an assistant
    /// message. Infallible: failures and empty responses fall back to
    /// [`fallback_suggestions`].
    pub async fn follow_ups(&self, message_text: &str) -> Vec<String> {
        let body = match self.transport.post_question(message_text).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "suggestion service unavailable, using fallbacks");
                return fallback_suggestions(message_text);
            }
        };

        let suggestions: Vec<String> = strip_stray_trailing_byte(&body)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(MAX_SUGGESTIONS)
            .map(str::to_string)
            .collect();

        if suggestions.is_empty() {
            return fallback_suggestions(message_text);
        }
        suggestions
    }
}

/// Three generic follow-ups, one quoting the start of the source message.
pub fn fallback_suggestions(message_text: &str) -> Vec<String> {
    let excerpt: String = message_text.chars().take(FALLBACK_EXCERPT_CHARS).collect();
    vec![
        "Can you tell me more about that?".to_string(),
        format!("What else should I know about \"{excerpt}\"?"),
        "Where in the sources does this come from?".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::TransportError;
    use async_trait::async_trait;

    struct StaticTransport(std::result::Result<String, String>);

    #[async_trait]
    impl QuestionTransport for StaticTransport {
        async fn post_question(
            &self,
            _question: &str,
        ) -> std::result::Result<String, TransportError> {
            match &self.0 {
                Ok(body) => Ok(body.clone()),
                Err(cause) => Err(TransportError::Connection(cause.clone())),
            }
        }
    }

    #[tokio::test]
    async fn test_follow_ups_splits_lines_and_caps_at_three() {
        let gateway = SuggestionGateway::new(StaticTransport(Ok(
            "one?\ntwo?\nthree?\nfour?".to_string(),
        )));
        let suggestions = gateway.follow_ups("answer").await;
        assert_eq!(suggestions, vec!["one?", "two?", "three?"]);
    }

    #[tokio::test]
    async fn test_follow_ups_tolerates_trailing_byte_and_blank_lines() {
        let gateway = SuggestionGateway::new(StaticTransport(Ok(
            "one?\n\n  two?  \n%".to_string(),
        )));
        let suggestions = gateway.follow_ups("answer").await;
        assert_eq!(suggestions, vec!["one?", "two?"]);
    }

    #[tokio::test]
    async fn test_follow_ups_transport_failure_uses_fallbacks() {
        let gateway =
            SuggestionGateway::new(StaticTransport(Err("connection refused".to_string())));
        let suggestions = gateway.follow_ups("some answer text").await;
        assert_eq!(suggestions, fallback_suggestions("some answer text"));
    }

    #[tokio::test]
    async fn test_follow_ups_empty_body_uses_fallbacks() {
        let gateway = SuggestionGateway::new(StaticTransport(Ok("\n\n".to_string())));
        let suggestions = gateway.follow_ups("text").await;
        assert_eq!(suggestions.len(), 3);
    }

    #[test]
    fn test_fallbacks_embed_first_thirty_chars() {
        let message = "x".repeat(50);
        let suggestions = fallback_suggestions(&message);
        assert_eq!(suggestions.len(), 3);
        assert!(suggestions[1].contains(&"x".repeat(30)));
        assert!(!suggestions[1].contains(&"x".repeat(31)));
    }

    #[test]
    fn test_fallbacks_are_deterministic() {
        assert_eq!(fallback_suggestions("m"), fallback_suggestions("m"));
    }

    #[test]
    fn test_fallbacks_short_message_embedded_whole() {
        let suggestions = fallback_suggestions("short");
        assert!(suggestions[1].contains("\"short\""));
    }
}
