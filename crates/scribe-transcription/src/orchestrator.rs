//! Chunked transcription orchestrator.
//!
//! Drives one run: plan the chunks, send them one at a time through a
//! [`RemoteTranscriber`], join the texts in input order, and report progress.
//!
//! Cancellation is checked before starting, before every chunk, and after
//! every remote call (before its progress event). The transport watches the
//! same token while a request is in flight. A run ends in exactly one of
//! success, [`TranscriptionError::Cancelled`], or a failure; no partial
//! transcript is ever returned.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use scribe_core::chunk;
use scribe_core::progress::{ProgressEvent, ProgressSink};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::errors::TranscriptionError;
use crate::remote::{Credentials, RemoteTranscriber};

const MSG_PREPARING: &str = "preparing";
const MSG_SINGLE: &str = "single-request transcription";
const MSG_CHUNKING: &str = "chunking";
const MSG_COMPLETE: &str = "complete";

/// Progress reported once the chunk plan is known (multi-chunk path).
const CHUNKING_PERCENT: u8 = 5;
/// Share of the progress bar spread across chunks.
const CHUNK_SPAN_PERCENT: u64 = 90;

/// Progress after chunk `index` (0-based) of `total` completes:
/// `5 + round((index + 1) / total * 90)`, rounding halves up.
pub fn chunk_percentage(index: usize, total: usize) -> u8 {
    let total = total.max(1) as u64;
    let done = (index as u64 + 1).min(total);
    let span = (done * CHUNK_SPAN_PERCENT * 2 + total) / (total * 2);
    CHUNKING_PERCENT + span as u8
}

fn checkpoint(cancel: &CancellationToken) -> Result<(), TranscriptionError> {
    if cancel.is_cancelled() {
        return Err(TranscriptionError::Cancelled);
    }
    Ok(())
}

/// Splits audio into chunks and transcribes them sequentially.
///
/// Holds no per-run state; concurrent `transcribe` calls are independent.
pub struct TranscriptionOrchestrator {
    transcriber: Arc<dyn RemoteTranscriber>,
    model_id: String,
}

impl TranscriptionOrchestrator {
    /// Create an orchestrator sending every chunk to `model_id`.
    pub fn new(transcriber: Arc<dyn RemoteTranscriber>, model_id: impl Into<String>) -> Self {
        Self {
            transcriber,
            model_id: model_id.into(),
        }
    }

    /// Model every chunk is sent to.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Transcribe `audio`, splitting it when it exceeds `chunk_size`.
    ///
    /// Progress events are non-decreasing and end at 100 on success.
    /// Failures on a chunked run carry the 1-based chunk index.
    #[instrument(
        skip_all,
        fields(model = %self.model_id, bytes = audio.len(), chunk_size = chunk_size.get())
    )]
    pub async fn transcribe(
        &self,
        audio: &[u8],
        credentials: &Credentials,
        chunk_size: NonZeroUsize,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<String, TranscriptionError> {
        let started = Instant::now();
        let result = self
            .run(audio, credentials, chunk_size, progress, cancel)
            .await;

        let outcome = match &result {
            Ok(text) => {
                info!(
                    chars = text.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "transcription complete"
                );
                "success"
            }
            Err(e) if e.is_cancelled() => {
                info!("transcription cancelled");
                "cancelled"
            }
            Err(e) => {
                warn!(error = %e, chunk = ?e.chunk_index(), status = ?e.status(), "transcription failed");
                "failed"
            }
        };
        counter!("transcription_runs_total", "outcome" => outcome).increment(1);

        result
    }

    async fn run(
        &self,
        audio: &[u8],
        credentials: &Credentials,
        chunk_size: NonZeroUsize,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<String, TranscriptionError> {
        progress.report(ProgressEvent::new(MSG_PREPARING, 0));
        checkpoint(cancel)?;

        let plan = chunk::plan(audio.len(), chunk_size);

        if plan.is_single() {
            progress.report(ProgressEvent::new(MSG_SINGLE, 10));
            let text = self.send_chunk(credentials, audio, cancel).await?;
            checkpoint(cancel)?;
            progress.report(ProgressEvent::new(MSG_COMPLETE, 100));
            return Ok(text);
        }

        let total = plan.len();
        info!(chunks = total, "input exceeds chunk size, splitting");
        progress.report(ProgressEvent::new(MSG_CHUNKING, CHUNKING_PERCENT));

        let mut transcript = String::new();
        for (i, range) in plan.iter().enumerate() {
            checkpoint(cancel)?;

            let bytes = range.slice(audio).ok_or_else(|| {
                TranscriptionError::InvalidInput(format!(
                    "chunk {}..{} outside {} byte input",
                    range.offset,
                    range.end(),
                    audio.len()
                ))
            })?;
            debug!(chunk = i + 1, total, offset = range.offset, len = range.length, "sending chunk");

            let text = self
                .send_chunk(credentials, bytes, cancel)
                .await
                .map_err(|e| e.in_chunk(i + 1, total))?;
            checkpoint(cancel)?;

            transcript.push_str(&text);
            transcript.push(' ');

            progress.report(ProgressEvent::new(
                format!("transcribed chunk {} of {total}", i + 1),
                chunk_percentage(i, total),
            ));
        }

        progress.report(ProgressEvent::new(MSG_COMPLETE, 100));
        Ok(transcript.trim().to_string())
    }

    async fn send_chunk(
        &self,
        credentials: &Credentials,
        bytes: &[u8],
        cancel: &CancellationToken,
    ) -> Result<String, TranscriptionError> {
        let started = Instant::now();
        let result = self
            .transcriber
            .send(credentials, &self.model_id, bytes, cancel)
            .await;
        counter!("transcription_chunks_total").increment(1);
        histogram!("transcription_chunk_duration_seconds").record(started.elapsed().as_secs_f64());
        result
    }
}
