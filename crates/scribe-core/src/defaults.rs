//! Default remote endpoint values shared by settings and the HTTP adapter.

/// Public Workers AI API root.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Whisper model used when none is configured.
pub const DEFAULT_MODEL_ID: &str = "@cf/openai/whisper-large-v3-turbo";
