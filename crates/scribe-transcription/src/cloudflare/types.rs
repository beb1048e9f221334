//! Workers AI response envelope.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::TranscriptionError;

/// `{ success, result, errors, messages }` wrapper around every response.
#[derive(Debug, Deserialize)]
pub struct CloudflareEnvelope {
    /// Whether the service considers the call successful.
    #[serde(default)]
    pub success: bool,
    /// Model output; absent on failure.
    #[serde(default)]
    pub result: Option<WhisperOutput>,
    /// Structured errors reported by the service.
    #[serde(default)]
    pub errors: Vec<Value>,
    /// Informational messages.
    #[serde(default)]
    pub messages: Vec<Value>,
}

/// Whisper model output.
#[derive(Debug, Deserialize)]
pub struct WhisperOutput {
    /// Transcribed text.
    #[serde(default)]
    pub text: Option<String>,
    /// Word count, when the model reports it.
    #[serde(default)]
    pub word_count: Option<u64>,
    /// Per-word timings, when the model reports them.
    #[serde(default)]
    pub words: Option<Vec<WordTiming>>,
}

/// Timing for one recognized word, in seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WordTiming {
    /// The word.
    pub word: String,
    /// Start offset.
    pub start: f64,
    /// End offset.
    pub end: f64,
}

impl CloudflareEnvelope {
    /// The service's `errors` array, or `None` when it is empty.
    pub fn error_details(&self) -> Option<Value> {
        (!self.errors.is_empty()).then(|| Value::Array(self.errors.clone()))
    }

    /// Extract the transcript from a 2xx envelope.
    ///
    /// `success=false` is a remote failure carrying the service errors;
    /// a successful envelope with missing or empty text is [`TranscriptionError::EmptyResult`].
    pub fn into_text(self, status: u16, status_text: &str) -> Result<String, TranscriptionError> {
        if !self.success {
            return Err(TranscriptionError::Remote {
                status,
                status_text: status_text.to_string(),
                details: self.error_details(),
            });
        }
        match self.result.and_then(|r| r.text) {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(TranscriptionError::EmptyResult),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn envelope(v: Value) -> CloudflareEnvelope {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn parses_full_output() {
        let env = envelope(json!({
            "success": true,
            "result": {
                "text": "hello world",
                "word_count": 2,
                "words": [
                    {"word": "hello", "start": 0.0, "end": 0.4},
                    {"word": "world", "start": 0.5, "end": 0.9}
                ]
            },
            "errors": [],
            "messages": []
        }));
        let out = env.result.as_ref().unwrap();
        assert_eq!(out.word_count, Some(2));
        assert_eq!(out.words.as_ref().unwrap()[1].word, "world");
        assert_eq!(env.into_text(200, "OK").unwrap(), "hello world");
    }

    #[test]
    fn unsuccessful_envelope_is_remote_error() {
        let env = envelope(json!({
            "success": false,
            "errors": [{"code": 3010, "message": "Invalid input"}]
        }));
        let err = env.into_text(200, "OK").unwrap_err();
        assert_matches!(err, TranscriptionError::Remote { status: 200, details: Some(_), .. });
    }

    #[test]
    fn missing_text_is_empty_result() {
        let env = envelope(json!({"success": true, "result": {}}));
        assert_matches!(env.into_text(200, "OK"), Err(TranscriptionError::EmptyResult));
    }

    #[test]
    fn missing_result_is_empty_result() {
        let env = envelope(json!({"success": true}));
        assert_matches!(env.into_text(200, "OK"), Err(TranscriptionError::EmptyResult));
    }

    #[test]
    fn empty_text_is_empty_result() {
        let env = envelope(json!({"success": true, "result": {"text": ""}}));
        assert_matches!(env.into_text(200, "OK"), Err(TranscriptionError::EmptyResult));
    }

    #[test]
    fn error_details_none_when_empty() {
        let env = envelope(json!({"success": false}));
        assert!(env.error_details().is_none());
    }
}
