//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` for the JSON file
//! format and `#[serde(default)]` so partial files are accepted.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use scribe_core::defaults::{DEFAULT_BASE_URL, DEFAULT_MODEL_ID};
use serde::{Deserialize, Serialize};

use crate::errors::SettingsError;

const MIB: usize = 1024 * 1024;

/// Root settings type.
///
/// ```json
/// {
///   "transcription": { "chunkSize": "8mb", "accountId": "abc123" },
///   "logging": { "level": "debug" }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScribeSettings {
    /// Settings schema version.
    pub version: String,
    /// Remote transcription settings.
    pub transcription: TranscriptionSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for ScribeSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            transcription: TranscriptionSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl ScribeSettings {
    /// Correct out-of-range values in place.
    ///
    /// Called automatically during loading. Bad values are raised to their
    /// minimum with a warning rather than rejected.
    pub fn validate(&mut self) {
        let t = &mut self.transcription;
        if t.max_input_bytes == 0 {
            tracing::warn!("max_input_bytes is 0, raising to 1");
            t.max_input_bytes = 1;
        }
        if t.timeout_ms < MIN_TIMEOUT_MS {
            tracing::warn!(
                "timeout_ms ({}) below minimum, raising to {MIN_TIMEOUT_MS}",
                t.timeout_ms
            );
            t.timeout_ms = MIN_TIMEOUT_MS;
        }
    }
}

/// Lowest accepted request timeout.
pub const MIN_TIMEOUT_MS: u64 = 1000;

/// Selectable chunk-size thresholds, in binary megabytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkSizePreset {
    /// 1 MiB.
    #[serde(rename = "1mb")]
    Mb1,
    /// 2 MiB.
    #[serde(rename = "2mb")]
    Mb2,
    /// 4 MiB.
    #[default]
    #[serde(rename = "4mb")]
    Mb4,
    /// 8 MiB.
    #[serde(rename = "8mb")]
    Mb8,
    /// 16 MiB.
    #[serde(rename = "16mb")]
    Mb16,
}

impl ChunkSizePreset {
    /// Every preset, smallest first.
    pub const ALL: [Self; 5] = [Self::Mb1, Self::Mb2, Self::Mb4, Self::Mb8, Self::Mb16];

    /// Threshold in bytes.
    pub const fn bytes(self) -> NonZeroUsize {
        let mib = match self {
            Self::Mb1 => 1,
            Self::Mb2 => 2,
            Self::Mb4 => 4,
            Self::Mb8 => 8,
            Self::Mb16 => 16,
        };
        match NonZeroUsize::new(mib * MIB) {
            Some(n) => n,
            None => NonZeroUsize::MIN,
        }
    }

    /// Wire name, e.g. `"4mb"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mb1 => "1mb",
            Self::Mb2 => "2mb",
            Self::Mb4 => "4mb",
            Self::Mb8 => "8mb",
            Self::Mb16 => "16mb",
        }
    }
}

impl fmt::Display for ChunkSizePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkSizePreset {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| {
                SettingsError::InvalidValue(format!(
                    "unknown chunk size '{s}' (expected one of 1mb, 2mb, 4mb, 8mb, 16mb)"
                ))
            })
    }
}

/// Remote transcription settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptionSettings {
    /// API base URL; the account and model path are appended per request.
    pub base_url: String,
    /// Inference model identifier.
    pub model_id: String,
    /// Chunk-size threshold preset.
    pub chunk_size: ChunkSizePreset,
    /// Largest file accepted before any request is made.
    pub max_input_bytes: u64,
    /// Per-request HTTP timeout in milliseconds.
    pub timeout_ms: u64,
    /// Account identifier for the inference endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Bearer API token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            chunk_size: ChunkSizePreset::default(),
            max_input_bytes: 25 * MIB as u64,
            timeout_ms: 300_000,
            account_id: None,
            api_token: None,
        }
    }
}

impl fmt::Debug for TranscriptionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptionSettings")
            .field("base_url", &self.base_url)
            .field("model_id", &self.model_id)
            .field("chunk_size", &self.chunk_size)
            .field("max_input_bytes", &self.max_input_bytes)
            .field("timeout_ms", &self.timeout_ms)
            .field("account_id", &self.account_id)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default level filter when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
