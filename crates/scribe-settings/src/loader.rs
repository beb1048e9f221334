//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ScribeSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply `SCRIBE_*` environment overrides (highest priority)
//! 4. [`ScribeSettings::validate`]

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::{ChunkSizePreset, ScribeSettings};

/// Resolve the default settings file path (`~/.scribe/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".scribe").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ScribeSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ScribeSettings> {
    load_settings_with(path, |name| std::env::var(name).ok())
}

/// Load settings from `path`, taking overrides from `lookup` instead of the
/// process environment.
pub fn load_settings_with(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ScribeSettings> {
    let mut settings = read_settings_file(path)?;
    apply_overrides_from(&mut settings, lookup);
    settings.validate();
    Ok(settings)
}

/// Read and merge the settings file over defaults, without env overrides.
pub fn read_settings_file(path: &Path) -> Result<ScribeSettings> {
    let defaults = serde_json::to_value(ScribeSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are ignored with a warning (file/default value kept).
pub fn apply_env_overrides(settings: &mut ScribeSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides using `lookup` in place of the process environment.
pub fn apply_overrides_from(
    settings: &mut ScribeSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let string = |name: &str| lookup(name).filter(|v| !v.is_empty());

    let t = &mut settings.transcription;
    if let Some(v) = string("SCRIBE_BASE_URL") {
        t.base_url = v.trim_end_matches('/').to_string();
    }
    if let Some(v) = string("SCRIBE_MODEL") {
        t.model_id = v;
    }
    if let Some(v) = string("SCRIBE_CHUNK_SIZE") {
        match v.parse::<ChunkSizePreset>() {
            Ok(preset) => t.chunk_size = preset,
            Err(e) => tracing::warn!(key = "SCRIBE_CHUNK_SIZE", error = %e, "ignoring env var"),
        }
    }
    if let Some(v) = string("SCRIBE_MAX_INPUT_BYTES") {
        match parse_u64_range(&v, 1024, 1_073_741_824) {
            Some(n) => t.max_input_bytes = n,
            None => warn_invalid("SCRIBE_MAX_INPUT_BYTES", &v),
        }
    }
    if let Some(v) = string("SCRIBE_TIMEOUT_MS") {
        match parse_u64_range(&v, 1000, 3_600_000) {
            Some(n) => t.timeout_ms = n,
            None => warn_invalid("SCRIBE_TIMEOUT_MS", &v),
        }
    }
    if let Some(v) = string("SCRIBE_ACCOUNT_ID") {
        t.account_id = Some(v);
    }
    if let Some(v) = string("SCRIBE_API_TOKEN") {
        t.api_token = Some(v);
    }

    let l = &mut settings.logging;
    if let Some(v) = string("SCRIBE_LOG_LEVEL") {
        l.level = v;
    }
    if let Some(v) = string("SCRIBE_LOG_JSON") {
        match parse_bool(&v) {
            Some(b) => l.json = b,
            None => warn_invalid("SCRIBE_LOG_JSON", &v),
        }
    }
}

fn warn_invalid(key: &str, value: &str) {
    tracing::warn!(key, value, "invalid env var, ignoring");
}

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}
