//! Client integration tests against a local mock of the chat-completions API.
//!
//! No network access or API key is needed; every request goes to an
//! `httpmock` server bound on localhost.

use exercise_corrector::prompts::SAME_LANGUAGE_DIRECTIVE;
use exercise_corrector::{
    format_as_markdown, CorrectionClient, CorrectionConfig, CorrectionError,
    CorrectionProgressCallback, CorrectionRequest, CorrectionSession, ImageInput,
};
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// ── Test helpers ─────────────────────────────────────────────────────────────

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\nfirst";
const JPEG_MAGIC: &[u8] = b"\xff\xd8\xff\xe0second";

fn client_for(server: &MockServer) -> CorrectionClient {
    let config = CorrectionConfig::builder()
        .api_key("test-key")
        .base_url(format!("{}/v1", server.base_url()))
        .model("test/vision-model")
        .api_timeout_secs(5)
        .build()
        .unwrap();
    CorrectionClient::new(config).unwrap()
}

fn two_images() -> Vec<ImageInput> {
    vec![
        ImageInput::new(PNG_MAGIC, "image/png"),
        ImageInput::new(JPEG_MAGIC, "image/jpeg"),
    ]
}

fn correction_content() -> Value {
    json!({
        "exercises": [
            {
                "exercise_name": "Exercise 1",
                "given_data": "x = 5",
                "questions": [
                    { "question": "What is 2x?", "answer": "2x = 2 × 5 = 10" },
                    { "question": "What is x²?", "answer": "x² = 25" }
                ]
            },
            {
                "exercise_name": "Exercise 2",
                "given_data": "None",
                "questions": [
                    { "question": "Name a prime.", "answer": "7" }
                ]
            }
        ]
    })
}

/// Wrap `content` (serialised to a string) in a chat-completion envelope.
fn completion(content: &Value) -> Value {
    json!({
        "id": "gen-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content.to_string() },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 1200, "completion_tokens": 300 }
    })
}

#[derive(Default)]
struct RecordingCallback {
    starts: Mutex<Vec<(usize, String)>>,
    completes: AtomicUsize,
    errors: AtomicUsize,
}

impl CorrectionProgressCallback for RecordingCallback {
    fn on_request_start(&self, image_count: usize, model: &str) {
        self.starts
            .lock()
            .unwrap()
            .push((image_count, model.to_string()));
    }

    fn on_request_complete(&self, exercise_count: usize, _duration_ms: u64) {
        self.completes.fetch_add(exercise_count, Ordering::SeqCst);
    }

    fn on_request_error(&self, _error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Success path ─────────────────────────────────────────────────────────────

#[test]
fn successful_correction_is_parsed() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("authorization", "Bearer test-key");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(completion(&correction_content()));
    });

    let result = client_for(&server)
        .correct_exercises_sync(&CorrectionRequest::new(two_images()))
        .unwrap();

    mock.assert();
    assert_eq!(result.exercises.len(), 2);
    assert_eq!(result.exercises[0].questions[1].answer, "x² = 25");
    assert_eq!(result.exercises[1].visible_given_data(), None);
    assert_eq!(result.question_count(), 3);
}

#[test]
fn request_carries_schema_language_preferences_and_images() {
    let server = MockServer::start();
    let png_b64 = "data:image/png;base64,iVBORw0KGgpmaXJzdA==";
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .body_includes("\"model\":\"test/vision-model\"")
            .body_includes("\"name\":\"exercise_correction\"")
            .body_includes("\"strict\":true")
            .body_includes("IMPORTANT: Respond in French.")
            .body_includes("User preferences: Show every step.")
            .body_includes(png_b64)
            .body_includes("data:image/jpeg;base64,");
        then.status(200)
            .json_body(completion(&correction_content()));
    });

    let request = CorrectionRequest::new(two_images())
        .output_language("French")
        .user_preferences("Show every step.");
    client_for(&server).correct_exercises_sync(&request).unwrap();

    mock.assert();
}

#[test]
fn blank_language_falls_back_to_same_language_directive() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .body_includes(SAME_LANGUAGE_DIRECTIVE)
            .body_excludes("Respond in   .")
            .body_excludes("Respond in .");
        then.status(200)
            .json_body(completion(&json!({ "exercises": [] })));
    });

    let request = CorrectionRequest::new(two_images()).output_language("   ");
    let result = client_for(&server).correct_exercises_sync(&request).unwrap();

    mock.assert();
    assert!(result.exercises.is_empty());
    assert_eq!(format_as_markdown(&result), "");
}

#[test]
fn fenced_content_is_accepted() {
    let server = MockServer::start();
    let fenced = format!("```json\n{}\n```", correction_content());
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(json!({
            "choices": [{ "message": { "role": "assistant", "content": fenced } }]
        }));
    });

    let result = client_for(&server)
        .correct_exercises_sync(&CorrectionRequest::new(two_images()))
        .unwrap();
    assert_eq!(result.exercises.len(), 2);
}

// ── Failure paths ────────────────────────────────────────────────────────────

#[test]
fn non_2xx_is_transport_error_with_status() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(401)
            .json_body(json!({ "error": { "message": "No auth credentials found", "code": 401 } }));
    });

    let err = client_for(&server)
        .correct_exercises_sync(&CorrectionRequest::new(two_images()))
        .unwrap_err();

    mock.assert();
    assert_eq!(err.status(), Some(401));
    match err {
        CorrectionError::Transport { detail, .. } => {
            assert!(detail.contains("No auth credentials found"), "got: {detail}")
        }
        other => panic!("expected Transport, got {other:?}"),
    }
}

#[test]
fn slow_provider_times_out_as_transport_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .delay(Duration::from_secs(4))
            .json_body(completion(&correction_content()));
    });

    let config = CorrectionConfig::builder()
        .api_key("test-key")
        .base_url(format!("{}/v1", server.base_url()))
        .api_timeout_secs(1)
        .build()
        .unwrap();
    let started = Instant::now();
    let err = CorrectionClient::new(config)
        .unwrap()
        .correct_exercises_sync(&CorrectionRequest::new(two_images()))
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(4));
    match err {
        CorrectionError::Transport { status, detail } => {
            assert_eq!(status, None);
            assert!(detail.contains("timed out"), "got: {detail}");
        }
        other => panic!("expected Transport, got {other:?}"),
    }
}

#[test]
fn server_error_without_envelope_uses_reason() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(502).body("upstream exploded");
    });

    let err = client_for(&server)
        .correct_exercises_sync(&CorrectionRequest::new(two_images()))
        .unwrap_err();
    assert_eq!(err.status(), Some(502));
}

#[test]
fn missing_answer_is_malformed_response() {
    let server = MockServer::start();
    let content = json!({
        "exercises": [{
            "exercise_name": "Exercise 1",
            "given_data": "x = 5",
            "questions": [{ "question": "What is 2x?" }]
        }]
    });
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(completion(&content));
    });

    let err = client_for(&server)
        .correct_exercises_sync(&CorrectionRequest::new(two_images()))
        .unwrap_err();
    assert!(
        matches!(err, CorrectionError::MalformedResponse { .. }),
        "got {err:?}"
    );
}

#[test]
fn prose_content_is_malformed_response() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .json_body(completion(&json!("Sure! Here are your corrections")));
    });

    let err = client_for(&server)
        .correct_exercises_sync(&CorrectionRequest::new(two_images()))
        .unwrap_err();
    assert!(matches!(err, CorrectionError::MalformedResponse { .. }));
}

#[test]
fn empty_images_never_reach_the_server() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .json_body(completion(&correction_content()));
    });

    let err = client_for(&server)
        .correct_exercises_sync(&CorrectionRequest::new(vec![]))
        .unwrap_err();

    assert!(matches!(err, CorrectionError::InvalidArgument(_)));
    mock.assert_calls(0);
}

#[test]
fn blank_key_is_rejected_before_any_request() {
    let err = CorrectionConfig::builder()
        .api_key("")
        .build()
        .unwrap_err();
    assert!(matches!(err, CorrectionError::Configuration(_)));
    assert!(err.to_string().contains("OPENROUTER_KEY"));
}

// ── Progress & session ───────────────────────────────────────────────────────

#[test]
fn progress_callback_sees_start_and_completion() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .json_body(completion(&correction_content()));
    });

    let cb = Arc::new(RecordingCallback::default());
    let config = CorrectionConfig::builder()
        .api_key("test-key")
        .base_url(format!("{}/v1", server.base_url()))
        .model("test/vision-model")
        .progress_callback(cb.clone())
        .build()
        .unwrap();
    CorrectionClient::new(config)
        .unwrap()
        .correct_exercises_sync(&CorrectionRequest::new(two_images()))
        .unwrap();

    assert_eq!(
        *cb.starts.lock().unwrap(),
        vec![(2, "test/vision-model".to_string())]
    );
    assert_eq!(cb.completes.load(Ordering::SeqCst), 2);
    assert_eq!(cb.errors.load(Ordering::SeqCst), 0);
}

#[test]
fn progress_callback_sees_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(500);
    });

    let cb = Arc::new(RecordingCallback::default());
    let config = CorrectionConfig::builder()
        .api_key("test-key")
        .base_url(format!("{}/v1", server.base_url()))
        .progress_callback(cb.clone())
        .build()
        .unwrap();
    let _ = CorrectionClient::new(config)
        .unwrap()
        .correct_exercises_sync(&CorrectionRequest::new(two_images()));

    assert_eq!(cb.errors.load(Ordering::SeqCst), 1);
    assert_eq!(cb.completes.load(Ordering::SeqCst), 0);
}

#[test]
fn session_replaces_result_and_exports_text() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .json_body(completion(&correction_content()));
    });

    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut session = CorrectionSession::new(client_for(&server));
    rt.block_on(session.correct(&CorrectionRequest::new(two_images())))
        .unwrap();

    let md = session.markdown().unwrap();
    assert!(md.starts_with("## Exercise 1\n\n*x = 5*\n\n**1. What is 2x?**"));
    assert!(md.contains("## Exercise 2\n\n**1. Name a prime.**"));

    let dir = tempfile::tempdir().unwrap();
    let report = session
        .export(
            dir.path(),
            &[
                exercise_corrector::ExportFormat::Markdown,
                exercise_corrector::ExportFormat::Json,
            ],
            &exercise_corrector::DocumentOptions::default(),
        )
        .unwrap();
    assert_eq!(report.written.len(), 2);

    let json: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("corrections.json")).unwrap())
            .unwrap();
    assert_eq!(json, correction_content());
}
