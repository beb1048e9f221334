//! The remote transcription port.

use std::fmt;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::errors::TranscriptionError;

/// Account and bearer token for the inference endpoint.
///
/// Opaque to the orchestrator; only the transport reads them.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account identifier, part of the endpoint path.
    pub account_id: String,
    /// Bearer API token.
    pub api_token: String,
}

impl Credentials {
    /// Create credentials, trimming surrounding whitespace.
    pub fn new(account_id: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into().trim().to_string(),
            api_token: api_token.into().trim().to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &self.account_id)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// One network request that turns a chunk of audio into text.
///
/// Implementations make exactly one request per call and never retry.
/// They must return [`TranscriptionError::Cancelled`] when `cancel` is
/// already set, or becomes set while the request is in flight.
#[async_trait]
pub trait RemoteTranscriber: Send + Sync {
    /// Transcribe `chunk` with `model_id`.
    async fn send(
        &self,
        credentials: &Credentials,
        model_id: &str,
        chunk: &[u8],
        cancel: &CancellationToken,
    ) -> Result<String, TranscriptionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_whitespace() {
        let c = Credentials::new("  acct ", "\ttok\n");
        assert_eq!(c.account_id, "acct");
        assert_eq!(c.api_token, "tok");
    }

    #[test]
    fn debug_redacts_token() {
        let c = Credentials::new("acct", "super-secret");
        let s = format!("{c:?}");
        assert!(s.contains("acct"));
        assert!(!s.contains("super-secret"));
    }
}
