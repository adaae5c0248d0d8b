//! Response normalization for the answering backend.
//!
//! The backend's schema has drifted between deployments: citations arrive
//! either as a flat `sourceDocuments` list or nested under
//! `agentReasoning[*].sourceDocuments`, the body is sometimes JSON-encoded
//! twice, and the transport framing can append one stray trailing byte.
//! Everything here exists to absorb that drift behind [`RawAnswer`] so no
//! downstream code ever branches on backend version.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ChatError, Result};
use crate::types::{Citation, LineRange};

/// A normalized backend response: optional answer text plus flattened
/// citations in encounter order.
///
/// `text` stays optional here; the gateway substitutes an acknowledgment
/// when it is absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawAnswer {
    pub text: Option<String>,
    pub citations: Vec<Citation>,
}

/// The two citation layouts seen across backend deployments.
enum CitationShape {
    /// `sourceDocuments` directly on the payload.
    Flat(Vec<Value>),
    /// `agentReasoning[*].sourceDocuments`, steps may omit or null entries.
    Nested(Vec<Value>),
    Absent,
}

/// One cited document as the backend sends it.
#[derive(Debug, Deserialize)]
struct SourceDocument {
    #[serde(rename = "pageContent")]
    page_content: String,
    #[serde(default)]
    metadata: DocumentMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct DocumentMetadata {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    loc: Option<DocumentLoc>,
}

#[derive(Debug, Deserialize)]
struct DocumentLoc {
    lines: DocumentLines,
}

#[derive(Debug, Deserialize)]
struct DocumentLines {
    from: u32,
    to: u32,
}

/// Drop one trailing control/padding byte left over from the transport
/// framing, if present. Trailing whitespace is removed first so the
/// artifact is found even when the body ends with a newline.
pub(crate) fn strip_stray_trailing_byte(body: &str) -> &str {
    let trimmed = body.trim_end();
    match trimmed.chars().last() {
        Some(c) if c.is_ascii_control() || c == '%' => &trimmed[..trimmed.len() - c.len_utf8()],
        _ => trimmed,
    }
}

/// Normalize a raw backend body into a [`RawAnswer`].
///
/// Fails with [`ChatError::MalformedResponse`] only when the cleaned body is
/// not parseable at all; a parseable body with unexpected fields degrades to
/// an answer with no text and no citations.
pub fn normalize(body: &str) -> Result<RawAnswer> {
    let cleaned = strip_stray_trailing_byte(body);
    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;

    // Some deployments JSON-encode the payload twice.
    let value = match value {
        Value::String(inner) => serde_json::from_str(&inner)
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?,
        other => other,
    };

    let text = value
        .get("text")
        .and_then(Value::as_str)
        .map(str::to_string);
    let citations = extract_citations(citation_shape(&value));
    debug!(citation_count = citations.len(), has_text = text.is_some(), "normalized backend response");

    Ok(RawAnswer { text, citations })
}

fn citation_shape(value: &Value) -> CitationShape {
    if let Some(docs) = value.get("sourceDocuments").and_then(Value::as_array) {
        return CitationShape::Flat(docs.clone());
    }
    if let Some(steps) = value.get("agentReasoning").and_then(Value::as_array) {
        return CitationShape::Nested(steps.clone());
    }
    CitationShape::Absent
}

fn extract_citations(shape: CitationShape) -> Vec<Citation> {
    match shape {
        CitationShape::Flat(docs) => docs.into_iter().filter_map(to_citation).collect(),
        CitationShape::Nested(steps) => steps
            .into_iter()
            .filter_map(|step| {
                step.get("sourceDocuments")
                    .and_then(Value::as_array)
                    .cloned()
            })
            .flatten()
            .filter_map(to_citation)
            .collect(),
        CitationShape::Absent => Vec::new(),
    }
}

/// Null entries and documents with empty content are dropped.
fn to_citation(doc: Value) -> Option<Citation> {
    let doc: SourceDocument = serde_json::from_value(doc).ok()?;
    if doc.page_content.is_empty() {
        return None;
    }
    Some(Citation {
        text: doc.page_content,
        source_label: doc.metadata.source.unwrap_or_default(),
        line_range: doc
            .metadata
            .loc
            .map(|loc| LineRange { from: loc.lines.from, to: loc.lines.to }),
    })
}
