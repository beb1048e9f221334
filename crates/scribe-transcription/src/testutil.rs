//! In-memory [`RemoteTranscriber`] fakes for orchestrator tests.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::errors::TranscriptionError;
use crate::remote::{Credentials, RemoteTranscriber};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Replays a scripted list of results, one per call, and records the
/// bytes of every call.
///
/// Calls past the end of the script return [`TranscriptionError::EmptyResult`].
pub struct ScriptedTranscriber {
    script: Mutex<VecDeque<Result<String, TranscriptionError>>>,
    calls: Mutex<Vec<Vec<u8>>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl ScriptedTranscriber {
    /// Empty script.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            cancel_after: None,
        }
    }

    /// Script that succeeds with each text in turn.
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts.into_iter().fold(Self::new(), |t, s| t.then_ok(s))
    }

    /// Builder: append a successful result.
    #[must_use]
    pub fn then_ok(self, text: impl Into<String>) -> Self {
        lock(&self.script).push_back(Ok(text.into()));
        self
    }

    /// Builder: append a failure.
    #[must_use]
    pub fn then_err(self, err: TranscriptionError) -> Self {
        lock(&self.script).push_back(Err(err));
        self
    }

    /// Builder: cancel `token` right after the `calls`-th call returns.
    #[must_use]
    pub fn cancel_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    /// Bytes received by each call, in call order.
    pub fn calls(&self) -> Vec<Vec<u8>> {
        lock(&self.calls).clone()
    }

    /// Number of calls made.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

impl Default for ScriptedTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteTranscriber for ScriptedTranscriber {
    async fn send(
        &self,
        _credentials: &Credentials,
        _model_id: &str,
        chunk: &[u8],
        cancel: &CancellationToken,
    ) -> Result<String, TranscriptionError> {
        let call_number = {
            let mut calls = lock(&self.calls);
            calls.push(chunk.to_vec());
            calls.len()
        };
        if cancel.is_cancelled() {
            return Err(TranscriptionError::Cancelled);
        }

        let result = lock(&self.script)
            .pop_front()
            .unwrap_or(Err(TranscriptionError::EmptyResult));

        if let Some((after, token)) = &self.cancel_after {
            if *after == call_number {
                token.cancel();
            }
        }
        result
    }
}

/// Returns each chunk's bytes as (lossy) UTF-8 text.
pub struct EchoTranscriber;

#[async_trait]
impl RemoteTranscriber for EchoTranscriber {
    async fn send(
        &self,
        _credentials: &Credentials,
        _model_id: &str,
        chunk: &[u8],
        cancel: &CancellationToken,
    ) -> Result<String, TranscriptionError> {
        if cancel.is_cancelled() {
            return Err(TranscriptionError::Cancelled);
        }
        Ok(String::from_utf8_lossy(chunk).into_owned())
    }
}
