//! # scribe
//!
//! Command-line front end: reads an audio file, resolves credentials and
//! settings, and prints the transcript to stdout. Progress and logs go to
//! stderr. Ctrl-C stops the run.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use scribe_core::ProgressEvent;
use scribe_settings::{ChunkSizePreset, ScribeSettings};
use scribe_transcription::{
    CancellationToken, CloudflareTranscriber, Credentials, TranscriptionOrchestrator,
};
use tracing::{debug, info};

/// Exit status for a run stopped with Ctrl-C.
const EXIT_CANCELLED: u8 = 130;

/// Transcribe an audio file with a remote Whisper model.
#[derive(Parser, Debug)]
#[command(name = "scribe", version, about)]
struct Cli {
    /// Audio file to transcribe.
    file: PathBuf,

    /// Split files larger than this into sequential requests.
    #[arg(long, value_name = "PRESET")]
    chunk_size: Option<ChunkSizePreset>,

    /// Inference model identifier.
    #[arg(long)]
    model: Option<String>,

    /// Account identifier (overrides settings and `SCRIBE_ACCOUNT_ID`).
    #[arg(long)]
    account_id: Option<String>,

    /// Settings file (default `~/.scribe/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the transcript to a file instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Log level when `RUST_LOG` is unset.
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    /// Fold command-line overrides into the loaded settings.
    fn apply(&self, settings: &mut ScribeSettings) {
        let t = &mut settings.transcription;
        if let Some(preset) = self.chunk_size {
            t.chunk_size = preset;
        }
        if let Some(model) = &self.model {
            t.model_id.clone_from(model);
        }
        if let Some(account) = &self.account_id {
            t.account_id = Some(account.clone());
        }
        if let Some(level) = &self.log_level {
            settings.logging.level.clone_from(level);
        }
        if self.json_logs {
            settings.logging.json = true;
        }
    }
}

/// Resolve credentials, rejecting missing or blank values.
fn credentials(settings: &ScribeSettings) -> Result<Credentials> {
    let t = &settings.transcription;
    let account = t.account_id.as_deref().map(str::trim).unwrap_or_default();
    let token = t.api_token.as_deref().map(str::trim).unwrap_or_default();
    if account.is_empty() {
        bail!("no account id: pass --account-id or set SCRIBE_ACCOUNT_ID");
    }
    if token.is_empty() {
        bail!("no API token: set SCRIBE_API_TOKEN or apiToken in the settings file");
    }
    Ok(Credentials::new(account, token))
}

/// Reject files over the configured limit before anything is read or sent.
fn check_size(path: &Path, len: u64, max: u64) -> Result<()> {
    if len > max {
        bail!(
            "{} is too large: {len} bytes (max {max} bytes)",
            path.display()
        );
    }
    Ok(())
}

fn render_progress(event: &ProgressEvent) -> String {
    format!("[{:>3}%] {}", event.percentage, event.message)
}

/// Load the settings file, fold in overrides from `lookup`, then the flags.
fn resolve_settings(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ScribeSettings> {
    let path = cli
        .settings
        .clone()
        .unwrap_or_else(scribe_settings::settings_path);
    let mut settings = scribe_settings::load_settings_with(&path, lookup)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    cli.apply(&mut settings);
    Ok(settings)
}

async fn run(
    cli: Cli,
    settings: ScribeSettings,
    cancel: CancellationToken,
) -> Result<Option<String>> {
    scribe_core::logging::init_subscriber(&settings.logging.level, settings.logging.json);
    debug!(?settings, "settings resolved");

    let credentials = credentials(&settings)?;
    let t = &settings.transcription;

    let meta = tokio::fs::metadata(&cli.file)
        .await
        .with_context(|| format!("cannot read {}", cli.file.display()))?;
    check_size(&cli.file, meta.len(), t.max_input_bytes)?;
    let audio = tokio::fs::read(&cli.file)
        .await
        .with_context(|| format!("cannot read {}", cli.file.display()))?;

    let transcriber = CloudflareTranscriber::new(&t.base_url, Duration::from_millis(t.timeout_ms))
        .context("failed to build HTTP client")?;
    let orchestrator = TranscriptionOrchestrator::new(Arc::new(transcriber), &t.model_id);

    info!(
        file = %cli.file.display(),
        model = orchestrator.model_id(),
        bytes = audio.len(),
        chunk_size = %t.chunk_size,
        "starting transcription"
    );

    let progress = |event: ProgressEvent| eprintln!("{}", render_progress(&event));
    match orchestrator
        .transcribe(&audio, &credentials, t.chunk_size.bytes(), &progress, &cancel)
        .await
    {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.is_cancelled() => Ok(None),
        Err(e) => Err(e).context("transcription failed"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = cli.output.clone();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    let _signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let settings = match resolve_settings(&cli, |name| std::env::var(name).ok()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli, settings, cancel).await {
        Ok(Some(text)) => {
            if let Some(path) = output {
                if let Err(e) = std::fs::write(&path, format!("{text}\n")) {
                    eprintln!("error: cannot write {}: {e}", path.display());
                    return ExitCode::FAILURE;
                }
            } else {
                println!("{text}");
            }
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("stopped");
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
