//! # scribe-settings
//!
//! Configuration with layered sources:
//! 1. **Compiled defaults** ([`ScribeSettings::default()`])
//! 2. **Settings file** (`~/.scribe/settings.json`, deep-merged over defaults)
//! 3. **Environment variables** (`SCRIBE_*` overrides, highest priority)
//!
//! ```no_run
//! let settings = scribe_settings::load_settings().unwrap_or_default();
//! println!("chunk size: {}", settings.transcription.chunk_size);
//! ```
//!
//! ## Crate Position
//!
//! Depends on: scribe-core (endpoint defaults).
//! Depended on by: scribe-cli.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides_from, deep_merge, load_settings, load_settings_from_path,
    load_settings_with, settings_path,
};
pub use types::*;
