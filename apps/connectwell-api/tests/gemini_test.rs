//! Gemini gateways against a local stand-in for the Generative Language API.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use connectwell_api::ai::gemini::GeminiClient;
use connectwell_api::ai::image::GeminiImageGenerator;
use connectwell_api::ai::moderation::GeminiModerator;
use connectwell_api::ai::{ImageGenerator, ModerationService};
use connectwell_api::error::{GenerationError, ModerationError};

const API_KEY: &str = "test-key";

type Captured = Arc<Mutex<Vec<Value>>>;

fn text_response(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
}

async fn fake_gemini(
    State(captured): State<Captured>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some(API_KEY) {
        return StatusCode::FORBIDDEN.into_response();
    }
    captured.lock().push(body);

    let path = uri.path();
    let reply = if path.ends_with("/mod-harmful:generateContent") {
        text_response(r#"{"isHarmful": true, "reason": "Promotes self-harm"}"#)
    } else if path.ends_with("/mod-fenced:generateContent") {
        text_response("```json\n{\"isHarmful\": false, \"reason\": \"\"}\n```")
    } else if path.ends_with("/mod-garbled:generateContent") {
        text_response("I think it is fine.")
    } else if path.ends_with("/mod-blocked:generateContent") {
        json!({ "promptFeedback": { "blockReason": "SAFETY" } })
    } else if path.ends_with("/img-ok:generateContent") {
        json!({ "candidates": [{ "content": { "parts": [
            { "text": "Here is your icon." },
            { "inlineData": { "mimeType": "image/png", "data": "aWNvbg==" } }
        ] } }] })
    } else if path.ends_with("/img-text:generateContent") {
        text_response("I can only describe the icon.")
    } else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    Json(reply).into_response()
}

/// Serve the stand-in on an ephemeral port and return its base URL.
async fn spawn_fake() -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .fallback(fake_gemini)
        .with_state(captured.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/v1beta"), captured)
}

fn client(base: &str) -> GeminiClient {
    GeminiClient::new(base, Some(API_KEY.to_string()), Duration::from_secs(5))
}

// ---------------------------------------------------------------------------
// Moderation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn moderator_returns_verdict_and_sends_safety_settings() {
    let (base, captured) = spawn_fake().await;
    let moderator = GeminiModerator::new(client(&base), "mod-harmful");

    let verdict = moderator.moderate("some risky text").await.unwrap();
    assert!(verdict.is_harmful);
    assert_eq!(verdict.reason, "Promotes self-harm");

    let sent = captured.lock()[0].clone();
    assert_eq!(sent["generationConfig"]["responseMimeType"], "application/json");
    let prompt = sent["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.ends_with("some risky text"));
    let dangerous = sent["safetySettings"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["category"] == "HARM_CATEGORY_DANGEROUS_CONTENT")
        .unwrap();
    assert_eq!(dangerous["threshold"], "BLOCK_NONE");
}

#[tokio::test]
async fn moderator_accepts_fenced_json() {
    let (base, _) = spawn_fake().await;
    let moderator = GeminiModerator::new(client(&base), "mod-fenced");

    let verdict = moderator.moderate("hello").await.unwrap();
    assert!(!verdict.is_harmful);
}

#[tokio::test]
async fn moderator_treats_blocked_prompt_as_harmful() {
    let (base, _) = spawn_fake().await;
    let moderator = GeminiModerator::new(client(&base), "mod-blocked");

    let verdict = moderator.moderate("something awful").await.unwrap();
    assert!(verdict.is_harmful);
    assert!(verdict.reason.contains("SAFETY"));
}

#[tokio::test]
async fn moderator_never_reports_safe_on_failure() {
    let (base, _) = spawn_fake().await;

    let err = GeminiModerator::new(client(&base), "mod-garbled")
        .moderate("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::InvalidVerdict(_)));

    let err = GeminiModerator::new(client(&base), "unknown-model")
        .moderate("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::Status(500)));

    let unconfigured = GeminiClient::new(&base, None, Duration::from_secs(5));
    let err = GeminiModerator::new(unconfigured, "mod-harmful")
        .moderate("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::Unconfigured));
}

// ---------------------------------------------------------------------------
// Image generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn image_generator_returns_first_inline_image() {
    let (base, captured) = spawn_fake().await;
    let generator = GeminiImageGenerator::new(client(&base), "img-ok");

    let image = generator.generate_image("a calm blue heart").await.unwrap();
    assert_eq!(image.image_data_uri, "data:image/png;base64,aWNvbg==");

    let sent = captured.lock()[0].clone();
    assert_eq!(
        sent["generationConfig"]["responseModalities"],
        json!(["TEXT", "IMAGE"])
    );
}

#[tokio::test]
async fn image_generator_without_image_part_fails() {
    let (base, _) = spawn_fake().await;
    let generator = GeminiImageGenerator::new(client(&base), "img-text");

    let err = generator.generate_image("a calm blue heart").await.unwrap_err();
    assert!(matches!(err, GenerationError::NoImage));
}

#[tokio::test]
async fn image_generator_reports_unreachable_service() {
    let generator = GeminiImageGenerator::new(client("http://127.0.0.1:1/v1beta"), "img-ok");

    let err = generator.generate_image("anything").await.unwrap_err();
    assert!(matches!(err, GenerationError::Transport(_)));
}
