//! # scribe-transcription
//!
//! Turns an audio buffer into one transcript through a remote speech-to-text
//! endpoint, splitting it into sequential requests when it exceeds the
//! endpoint's size limit.
//!
//! # Architecture
//!
//! ```text
//! audio bytes → ChunkPlan (scribe-core)
//!             → TranscriptionOrchestrator: one RemoteTranscriber::send per chunk, in order
//!             → CloudflareTranscriber: POST raw bytes, parse {success, result.text, errors}
//!             → texts joined with spaces → transcript
//! ```
//!
//! ## Crate Position
//!
//! Depends on: scribe-core.
//! Depended on by: scribe-cli.

#![deny(unsafe_code)]

pub mod cloudflare;
pub mod errors;
pub mod orchestrator;
pub mod remote;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use cloudflare::{CloudflareTranscriber, DEFAULT_BASE_URL, DEFAULT_MODEL_ID};
pub use errors::TranscriptionError;
pub use orchestrator::{TranscriptionOrchestrator, chunk_percentage};
pub use remote::{Credentials, RemoteTranscriber};
pub use tokio_util::sync::CancellationToken;
