//! End-to-end runs of the orchestrator against a mock Workers AI endpoint.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use scribe_core::ProgressEvent;
use scribe_transcription::{
    CancellationToken, CloudflareTranscriber, Credentials, DEFAULT_MODEL_ID,
    TranscriptionError, TranscriptionOrchestrator,
};
use serde_json::json;
use wiremock::matchers::{body_bytes, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RUN_PATH: &str = "/accounts/acct-1/ai/run/@cf/openai/whisper-large-v3-turbo";

fn orchestrator(server: &MockServer) -> TranscriptionOrchestrator {
    let transcriber = CloudflareTranscriber::new(server.uri(), Duration::from_secs(10)).unwrap();
    TranscriptionOrchestrator::new(Arc::new(transcriber), DEFAULT_MODEL_ID)
}

fn creds() -> Credentials {
    Credentials::new("acct-1", "token-1")
}

fn ok_text(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "result": {"text": text},
        "errors": [],
        "messages": []
    }))
}

async fn mount_chunk(server: &MockServer, bytes: &[u8], response: ResponseTemplate, times: u64) {
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .and(header("authorization", "Bearer token-1"))
        .and(body_bytes(bytes.to_vec()))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

fn chunk_size(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

#[tokio::test]
async fn chunked_file_is_transcribed_in_order() {
    let server = MockServer::start().await;
    let audio: Vec<u8> = (0..100).collect();
    mount_chunk(&server, &audio[0..40], ok_text("the quick"), 1).await;
    mount_chunk(&server, &audio[40..80], ok_text("brown fox"), 1).await;
    mount_chunk(&server, &audio[80..100], ok_text("jumps"), 1).await;

    let events = Mutex::new(Vec::new());
    let sink = |e: ProgressEvent| events.lock().unwrap().push(e);

    let text = orchestrator(&server)
        .transcribe(&audio, &creds(), chunk_size(40), &sink, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(text, "the quick brown fox jumps");
    let pct: Vec<u8> = events.lock().unwrap().iter().map(|e| e.percentage).collect();
    assert_eq!(pct, [0, 5, 35, 65, 95, 100]);
}

#[tokio::test]
async fn small_file_takes_single_request() {
    let server = MockServer::start().await;
    let audio = vec![9u8; 10];
    mount_chunk(&server, &audio, ok_text("short clip"), 1).await;

    let text = orchestrator(&server)
        .transcribe(&audio, &creds(), chunk_size(40), &|_: ProgressEvent| {}, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(text, "short clip");
}

#[tokio::test]
async fn remote_failure_names_the_chunk_and_stops() {
    let server = MockServer::start().await;
    let audio: Vec<u8> = (0..30).collect();
    mount_chunk(&server, &audio[0..10], ok_text("one"), 1).await;
    mount_chunk(
        &server,
        &audio[10..20],
        ResponseTemplate::new(429).set_body_json(json!({
            "success": false,
            "errors": [{"code": 3040, "message": "Capacity temporarily exceeded"}]
        })),
        1,
    )
    .await;
    mount_chunk(&server, &audio[20..30], ok_text("three"), 0).await;

    let err = orchestrator(&server)
        .transcribe(&audio, &creds(), chunk_size(10), &|_: ProgressEvent| {}, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.chunk_index(), Some(2));
    assert_eq!(err.status(), Some(429));
    let msg = err.to_string();
    assert!(msg.starts_with("chunk 2 of 3 failed: API error: 429 Too Many Requests"), "{msg}");
    assert!(msg.contains("Capacity temporarily exceeded"));
}

#[tokio::test]
async fn empty_chunk_result_fails_the_run() {
    let server = MockServer::start().await;
    let audio: Vec<u8> = (0..20).collect();
    mount_chunk(&server, &audio[0..10], ok_text(""), 1).await;
    mount_chunk(&server, &audio[10..20], ok_text("never"), 0).await;

    let err = orchestrator(&server)
        .transcribe(&audio, &creds(), chunk_size(10), &|_: ProgressEvent| {}, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.chunk_index(), Some(1));
    assert_matches!(err.root(), TranscriptionError::EmptyResult);
}

#[tokio::test]
async fn cancelling_from_progress_stops_before_next_chunk() {
    let server = MockServer::start().await;
    let audio: Vec<u8> = (0..30).collect();
    mount_chunk(&server, &audio[0..10], ok_text("one"), 1).await;
    mount_chunk(&server, &audio[10..20], ok_text("two"), 0).await;
    mount_chunk(&server, &audio[20..30], ok_text("three"), 0).await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let sink = move |e: ProgressEvent| {
        if e.message == "transcribed chunk 1 of 3" {
            trigger.cancel();
        }
    };

    let err = orchestrator(&server)
        .transcribe(&audio, &creds(), chunk_size(10), &sink, &cancel)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
}
