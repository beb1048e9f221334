//! Progress reporting for a transcription run.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One progress update: a short status message and a percentage in `0..=100`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    /// Human-readable stage description.
    pub message: String,
    /// Completion percentage, clamped to 100.
    pub percentage: u8,
}

impl ProgressEvent {
    /// Create an event. Percentages above 100 are clamped.
    pub fn new(message: impl Into<String>, percentage: u8) -> Self {
        Self {
            message: message.into(),
            percentage: percentage.min(100),
        }
    }

    /// Whether this event marks the end of a successful run.
    pub fn is_complete(&self) -> bool {
        self.percentage == 100
    }
}

/// Receiver of progress events for a single run.
///
/// Events are delivered in emission order on the caller's task.
pub trait ProgressSink: Send + Sync {
    /// Deliver one event.
    fn report(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn report(&self, event: ProgressEvent) {
        self(event);
    }
}

/// Stream form: events are pushed into an unbounded channel.
/// A dropped receiver is not an error; events are discarded.
impl ProgressSink for mpsc::UnboundedSender<ProgressEvent> {
    fn report(&self, event: ProgressEvent) {
        let _ = self.send(event);
    }
}
