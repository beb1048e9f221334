//! Error taxonomy for a transcription run.

use serde_json::Value;

/// Errors produced by a [`RemoteTranscriber`](crate::RemoteTranscriber) call
/// or a whole orchestrator run.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    /// The caller cancelled the run. Not a failure; render as "stopped".
    #[error("transcription cancelled")]
    Cancelled,

    /// The inference service rejected or failed the request.
    #[error("API error: {status} {status_text}{}", render_details(.details.as_ref()))]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for `status`.
        status_text: String,
        /// Structured error details returned by the service, if any.
        details: Option<Value>,
    },

    /// The service reported success but returned no text.
    #[error("transcription returned no text")]
    EmptyResult,

    /// Input the adapter cannot turn into a request (e.g. malformed credentials).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A success response whose body is not the expected envelope.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Transport failure before a response was received.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A chunk of a multi-chunk run failed.
    #[error("chunk {index} of {total} failed: {source}")]
    Chunk {
        /// 1-based position of the failing chunk.
        index: usize,
        /// Number of chunks in the run.
        total: usize,
        /// Underlying failure.
        #[source]
        source: Box<TranscriptionError>,
    },
}

fn render_details(details: Option<&Value>) -> String {
    match details {
        None => String::new(),
        Some(Value::String(s)) if s.is_empty() => String::new(),
        Some(Value::String(s)) => format!("\nDetails: {s}"),
        Some(v) => format!(
            "\nDetails: {}",
            serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
        ),
    }
}

impl TranscriptionError {
    /// Wrap `self` with its 1-based chunk position.
    ///
    /// Cancellation is never wrapped so callers can match it directly.
    #[must_use]
    pub fn in_chunk(self, index: usize, total: usize) -> Self {
        match self {
            Self::Cancelled => Self::Cancelled,
            other => Self::Chunk {
                index,
                total,
                source: Box::new(other),
            },
        }
    }

    /// Whether this outcome is a caller-initiated cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::Chunk { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }

    /// HTTP status of the underlying remote failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Chunk { source, .. } => source.status(),
            _ => None,
        }
    }

    /// 1-based index of the failing chunk for chunked runs.
    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            Self::Chunk { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The innermost error, with chunk wrapping removed.
    pub fn root(&self) -> &Self {
        match self {
            Self::Chunk { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn remote(details: Option<Value>) -> TranscriptionError {
        TranscriptionError::Remote {
            status: 400,
            status_text: "Bad Request".into(),
            details,
        }
    }

    #[test]
    fn remote_display_without_details() {
        assert_eq!(remote(None).to_string(), "API error: 400 Bad Request");
    }

    #[test]
    fn remote_display_pretty_prints_details() {
        let e = remote(Some(json!([{"code": 5006, "message": "bad audio"}])));
        let s = e.to_string();
        assert!(s.starts_with("API error: 400 Bad Request\nDetails: ["));
        assert!(s.contains("\"code\": 5006"));
    }

    #[test]
    fn remote_display_with_raw_text_details() {
        let e = remote(Some(Value::String("upstream timeout".into())));
        assert_eq!(e.to_string(), "API error: 400 Bad Request\nDetails: upstream timeout");
    }

    #[test]
    fn in_chunk_wraps_with_index() {
        let e = TranscriptionError::EmptyResult.in_chunk(2, 3);
        assert_eq!(e.chunk_index(), Some(2));
        assert_eq!(e.to_string(), "chunk 2 of 3 failed: transcription returned no text");
        assert_matches!(e.root(), TranscriptionError::EmptyResult);
    }

    #[test]
    fn in_chunk_leaves_cancellation_alone() {
        let e = TranscriptionError::Cancelled.in_chunk(1, 4);
        assert_matches!(e, TranscriptionError::Cancelled);
        assert!(e.is_cancelled());
        assert_eq!(e.chunk_index(), None);
    }

    #[test]
    fn status_walks_through_chunk_wrapper() {
        let e = remote(None).in_chunk(3, 5);
        assert_eq!(e.status(), Some(400));
        assert!(!e.is_cancelled());
        assert_eq!(TranscriptionError::EmptyResult.status(), None);
    }
}
