//! Cloudflare Workers AI transport implementing [`RemoteTranscriber`].
//!
//! One `POST {base_url}/accounts/{account_id}/ai/run/{model_id}` per call,
//! raw audio bytes as the body, Bearer auth.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument};

use crate::errors::TranscriptionError;
use crate::remote::{Credentials, RemoteTranscriber};

pub use scribe_core::defaults::{DEFAULT_BASE_URL, DEFAULT_MODEL_ID};
pub use types::{CloudflareEnvelope, WhisperOutput, WordTiming};

/// Workers AI speech-to-text client.
pub struct CloudflareTranscriber {
    client: reqwest::Client,
    base_url: String,
}

impl CloudflareTranscriber {
    /// Create a transcriber whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TranscriptionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a transcriber with a shared HTTP client.
    #[must_use]
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Inference URL for one account and model.
    pub fn endpoint(&self, account_id: &str, model_id: &str) -> String {
        format!("{}/accounts/{account_id}/ai/run/{model_id}", self.base_url)
    }

    fn build_headers(credentials: &Credentials) -> Result<HeaderMap, TranscriptionError> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", credentials.api_token))
            .map_err(|e| TranscriptionError::InvalidInput(format!("invalid API token: {e}")))?;
        auth.set_sensitive(true);
        let _ = headers.insert(AUTHORIZATION, auth);
        Ok(headers)
    }

    async fn request(
        &self,
        credentials: &Credentials,
        model_id: &str,
        chunk: &[u8],
    ) -> Result<String, TranscriptionError> {
        let url = self.endpoint(&credentials.account_id, model_id);
        let headers = Self::build_headers(credentials)?;

        debug!(bytes = chunk.len(), "sending transcription request");

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .body(Bytes::copy_from_slice(chunk))
            .send()
            .await?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = remote_error(status, &body);
            error!(status = status.as_u16(), "transcription API error");
            return Err(err);
        }

        let body = response.bytes().await?;
        let envelope: CloudflareEnvelope = serde_json::from_slice(&body)
            .map_err(|e| TranscriptionError::InvalidResponse(e.to_string()))?;
        if !envelope.messages.is_empty() {
            debug!(messages = ?envelope.messages, "service messages");
        }
        envelope.into_text(status.as_u16(), status_text)
    }
}

/// Build a [`TranscriptionError::Remote`] from a non-2xx response body.
///
/// Details are the envelope's `errors` array when the body parses, otherwise
/// the raw body text.
fn remote_error(status: StatusCode, body: &str) -> TranscriptionError {
    let details = match serde_json::from_str::<CloudflareEnvelope>(body) {
        Ok(envelope) => envelope.error_details(),
        Err(_) => {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| Value::String(trimmed.to_string()))
        }
    };
    TranscriptionError::Remote {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        details,
    }
}

#[async_trait]
impl RemoteTranscriber for CloudflareTranscriber {
    #[instrument(skip_all, fields(provider = "cloudflare", model = %model_id, bytes = chunk.len()))]
    async fn send(
        &self,
        credentials: &Credentials,
        model_id: &str,
        chunk: &[u8],
        cancel: &CancellationToken,
    ) -> Result<String, TranscriptionError> {
        if cancel.is_cancelled() {
            debug!("cancelled before request");
            return Err(TranscriptionError::Cancelled);
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("request cancelled in flight");
                Err(TranscriptionError::Cancelled)
            }
            result = self.request(credentials, model_id, chunk) => result,
        }
    }
}
