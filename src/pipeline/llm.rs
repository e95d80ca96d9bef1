//! Provider interaction: build the chat-completions body and send it.
//!
//! ## Message Layout
//!
//! ```text
//! messages[0]  system  build_system_prompt(language, preferences)
//! messages[1]  user    [ text: USER_INSTRUCTION,
//!                        image_url: data:<mime>;base64,… ,   × N, input order
//!                      ]
//! response_format      strict json_schema (see pipeline::schema)
//! ```
//!
//! This is the only stage with network I/O. It is a single attempt: there is
//! no retry loop, and the reqwest client carries the configured timeout.

use crate::config::CorrectionConfig;
use crate::error::CorrectionError;
use crate::output::CorrectionRequest;
use crate::pipeline::{encode, schema};
use crate::prompts::{build_system_prompt, USER_INSTRUCTION};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

// ── Request wire types ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum ChatMessage {
    System { content: String },
    User { content: Vec<ContentPart> },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

// ── Response wire types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

/// Content of the first choice plus token accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Build the JSON request body for one correction call.
pub fn build_request_body(
    request: &CorrectionRequest,
    config: &CorrectionConfig,
) -> Result<Value, CorrectionError> {
    let mut content = Vec::with_capacity(request.images.len() + 1);
    content.push(ContentPart::Text {
        text: USER_INSTRUCTION.to_string(),
    });
    content.extend(
        encode::encode_images(&request.images)
            .into_iter()
            .map(|url| ContentPart::ImageUrl {
                image_url: ImageUrl { url },
            }),
    );

    let body = ChatRequest {
        model: &config.model,
        messages: vec![
            ChatMessage::System {
                content: build_system_prompt(request.language(), request.preferences()),
            },
            ChatMessage::User { content },
        ],
        response_format: schema::response_format(),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };

    serde_json::to_value(body)
        .map_err(|e| CorrectionError::Internal(format!("serialising request body: {e}")))
}

/// POST the body to the completions endpoint and return the first choice's content.
pub async fn send(
    http: &reqwest::Client,
    config: &CorrectionConfig,
    body: &Value,
) -> Result<Completion, CorrectionError> {
    let url = config.completions_url();
    debug!("POST {}", url);

    let response = http
        .post(&url)
        .bearer_auth(&config.api_key)
        .json(body)
        .send()
        .await
        .map_err(|e| transport_error(e, config.api_timeout_secs))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| transport_error(e, config.api_timeout_secs))?;

    if !status.is_success() {
        let detail = provider_error_message(&text)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
        warn!("Provider returned HTTP {}: {}", status.as_u16(), detail);
        return Err(CorrectionError::Transport {
            status: Some(status.as_u16()),
            detail,
        });
    }

    extract_completion(&text)
}

/// Pull the first choice's content out of a 2xx response body.
///
/// Some gateways report upstream failures as `200 {"error": {...}}`; those are
/// transport failures, not malformed corrections.
pub fn extract_completion(body: &str) -> Result<Completion, CorrectionError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| CorrectionError::MalformedResponse {
            detail: format!("response body is not a chat completion: {e}"),
        })?;

    if let Some(err) = parsed.error {
        if parsed.choices.is_empty() {
            return Err(CorrectionError::Transport {
                status: err
                    .code
                    .as_ref()
                    .and_then(Value::as_u64)
                    .and_then(|c| u16::try_from(c).ok()),
                detail: err.message.unwrap_or_else(|| "provider error".into()),
            });
        }
    }

    let usage = parsed.usage.unwrap_or_default();
    let content = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CorrectionError::MalformedResponse {
            detail: "response has no choices".into(),
        })?
        .message
        .content
        .ok_or_else(|| CorrectionError::MalformedResponse {
            detail: "first choice has no message content".into(),
        })?;

    Ok(Completion {
        content,
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
    })
}

fn provider_error_message(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    envelope.error.message.filter(|m| !m.trim().is_empty())
}

fn transport_error(e: reqwest::Error, timeout_secs: u64) -> CorrectionError {
    let detail = if e.is_timeout() {
        format!("timed out after {timeout_secs}s")
    } else {
        e.to_string()
    };
    CorrectionError::Transport {
        status: e.status().map(|s| s.as_u16()),
        detail,
    }
}
