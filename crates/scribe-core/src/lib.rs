//! # scribe-core
//!
//! Foundation pieces shared by the transcription crates:
//!
//! - [`chunk`]: splitting a byte length into an ordered [`ChunkPlan`]
//! - [`defaults`]: endpoint and model defaults
//! - [`progress`]: [`ProgressEvent`] and the [`ProgressSink`] capability
//! - [`logging`]: `tracing` subscriber setup
//!
//! ## Crate Position
//!
//! Standalone (no scribe crate dependencies).
//! Depended on by: scribe-settings, scribe-transcription, scribe-cli.

#![deny(unsafe_code)]

pub mod chunk;
pub mod defaults;
pub mod logging;
pub mod progress;

pub use chunk::{ChunkPlan, ChunkRange, plan};
pub use defaults::{DEFAULT_BASE_URL, DEFAULT_MODEL_ID};
pub use progress::{ProgressEvent, ProgressSink};
