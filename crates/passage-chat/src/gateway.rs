//! Answering gateway: the one place that talks to the remote QA backend.
//!
//! [`AnsweringGateway::ask`] never fails. Transport errors, non-2xx
//! statuses, and unparseable bodies are all converted to diagnostic
//! [`AnswerPayload`]s here, so the store can treat every answer uniformly
//! and `complete_send` always succeeds.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{ChatError, Result};
use crate::normalize::normalize;
use crate::types::AnswerPayload;

/// Failure modes of the wire transport, before normalization.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, refused, timeout).
    #[error("{0}")]
    Connection(String),
    /// The backend answered with a non-success status.
    #[error("status {0}")]
    Status(u16),
}

/// Posts one question, returns the raw response body.
///
/// The trait seam keeps the gateway testable without a live backend.
#[async_trait]
pub trait QuestionTransport: Send + Sync {
    async fn post_question(&self, question: &str) -> std::result::Result<String, TransportError>;
}

/// HTTP transport for the answering service.
pub struct AnsweringClient {
    http: reqwest::Client,
    endpoint: String,
}

impl AnsweringClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl QuestionTransport for AnsweringClient {
    async fn post_question(&self, question: &str) -> std::result::Result<String, TransportError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&serde_json::json!({ "question": question }))
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        response
            .text()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))
    }
}

/// Wraps a transport and guarantees an answer for every question.
pub struct AnsweringGateway<T: QuestionTransport> {
    transport: T,
}

impl<T: QuestionTransport> AnsweringGateway<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Ask the backend a question. Infallible: every failure path yields a
    /// diagnostic payload with empty citations instead of an error.
    pub async fn ask(&self, question: &str) -> AnswerPayload {
        let body = match self.transport.post_question(question).await {
            Ok(body) => body,
            Err(TransportError::Status(code)) => {
                warn!(status = code, "answering backend returned an error status");
                return AnswerPayload::text_only(
                    "Hello! I'm currently having trouble connecting. \
                     Could you check the network tab for specific errors?",
                );
            }
            Err(TransportError::Connection(cause)) => {
                warn!(%cause, "answering backend unreachable");
                return connection_fallback(&cause);
            }
        };

        match normalize(&body) {
            Ok(raw) => AnswerPayload {
                text: raw
                    .text
                    .unwrap_or_else(|| format!("I received your message: {question}")),
                citations: raw.citations,
            },
            Err(e) => {
                warn!(error = %e, "answering backend sent an unparseable body");
                connection_fallback(&e.to_string())
            }
        }
    }
}

fn connection_fallback(cause: &str) -> AnswerPayload {
    AnswerPayload::text_only(format!(
        "Connection error: {cause}. Could you check if the API endpoint \
         is accessible from your browser?"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StaticTransport(std::result::Result<String, TransportError>);

    #[async_trait]
    impl QuestionTransport for StaticTransport {
        async fn post_question(
            &self,
            _question: &str,
        ) -> std::result::Result<String, TransportError> {
            match &self.0 {
                Ok(body) => Ok(body.clone()),
                Err(TransportError::Status(code)) => Err(TransportError::Status(*code)),
                Err(TransportError::Connection(cause)) => {
                    Err(TransportError::Connection(cause.clone()))
                }
            }
        }
    }

    // ---- HTTP transport ----

    #[tokio::test]
    async fn test_client_posts_question_and_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_json(serde_json::json!({ "question": "why?" })))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"text":"because"}"#))
            .mount(&server)
            .await;

        let client = AnsweringClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let body = client.post_question("why?").await.unwrap();
        assert_eq!(body, r#"{"text":"because"}"#);
    }

    #[tokio::test]
    async fn test_client_maps_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = AnsweringClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let err = client.post_question("q").await.unwrap_err();
        assert!(matches!(err, TransportError::Status(500)));
    }

    #[tokio::test]
    async fn test_client_maps_unreachable_endpoint_to_connection() {
        // Port 9 (discard) is not listening.
        let client =
            AnsweringClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let err = client.post_question("q").await.unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
    }

    // ---- Gateway fallback behavior ----

    #[tokio::test]
    async fn test_ask_success_with_citations() {
        let body = r#"{"text":"hi","sourceDocuments":[{"pageContent":"A","metadata":{"source":"doc1"}}]}%"#;
        let gateway = AnsweringGateway::new(StaticTransport(Ok(body.to_string())));
        let answer = gateway.ask("q").await;
        assert_eq!(answer.text, "hi");
        assert_eq!(answer.citations.len(), 1);
        assert_eq!(answer.citations[0].source_label, "doc1");
    }

    #[tokio::test]
    async fn test_ask_error_status_yields_trouble_connecting() {
        let gateway = AnsweringGateway::new(StaticTransport(Err(TransportError::Status(502))));
        let answer = gateway.ask("q").await;
        assert!(answer.text.starts_with("Hello! I'm currently having trouble connecting"));
        assert!(answer.citations.is_empty());
    }

    #[tokio::test]
    async fn test_ask_connection_failure_embeds_cause() {
        let gateway = AnsweringGateway::new(StaticTransport(Err(TransportError::Connection(
            "connection refused".to_string(),
        ))));
        let answer = gateway.ask("q").await;
        assert!(answer.text.starts_with("Connection error: connection refused."));
        assert!(answer.citations.is_empty());
    }

    #[tokio::test]
    async fn test_ask_malformed_body_yields_connection_error_text() {
        let gateway =
            AnsweringGateway::new(StaticTransport(Ok("<html>oops</html>".to_string())));
        let answer = gateway.ask("q").await;
        assert!(answer.text.starts_with("Connection error:"));
        assert!(answer.citations.is_empty());
    }

    #[tokio::test]
    async fn test_ask_missing_text_acknowledges_question() {
        let gateway = AnsweringGateway::new(StaticTransport(Ok(
            r#"{"sourceDocuments":[{"pageContent":"A"}]}"#.to_string(),
        )));
        let answer = gateway.ask("what is a passage?").await;
        assert_eq!(answer.text, "I received your message: what is a passage?");
        // Citations still survive a missing text field.
        assert_eq!(answer.citations.len(), 1);
    }

    #[tokio::test]
    async fn test_ask_end_to_end_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"text":"from the wire","sourceDocuments":[]}"#),
            )
            .mount(&server)
            .await;

        let client = AnsweringClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let gateway = AnsweringGateway::new(client);
        let answer = gateway.ask("q").await;
        assert_eq!(answer.text, "from the wire");
    }
}
