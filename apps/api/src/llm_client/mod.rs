/// LLM Client — the single point of entry for all generation-API calls.
///
/// ARCHITECTURAL RULE: No other module may call the generation API directly.
/// All LLM interactions MUST go through this module.
///
/// Model: gemini-3-pro-preview (hardcoded — do not make configurable to prevent drift)
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-3-pro-preview";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Classifies errors the retry wrapper is allowed to retry.
    /// Covers rate limiting (429), temporary unavailability (503), the
    /// provider's textual overload markers, and transport-level timeouts.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_timeout() || e.is_connect(),
            LlmError::Api { status, message } => {
                matches!(status, 429 | 503)
                    || message.contains("UNAVAILABLE")
                    || message.to_ascii_lowercase().contains("high demand")
                    || message.to_ascii_lowercase().contains("overloaded")
            }
            LlmError::RateLimited { .. } => false,
            LlmError::EmptyContent => false,
        }
    }
}

/// One request to the generation service. Model identity and safety settings
/// are client-internal configuration, not part of this contract.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub user_content: String,
    pub temperature: f32,
}

/// A stream of text deltas from one generation call.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// The generation capability consumed by the interview engine.
/// Constructed once at startup and injected via `AppState` — no module reads
/// credentials from ambient process state at call time.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Initiates one streaming generation call. Each stream item is the text
    /// of one received chunk (a delta, not the accumulated output).
    async fn stream_generate(&self, req: GenerationRequest) -> Result<TextStream, LlmError>;

    /// Non-streaming single-shot variant. The interview engine streams every
    /// turn; this exists for callers that want the full text in one piece.
    async fn generate(&self, req: GenerationRequest) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// The single LLM client used by the whole service.
/// Speaks the Gemini `streamGenerateContent?alt=sse` wire format.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            api_key,
        }
    }

    async fn post(
        &self,
        endpoint: &str,
        req: &GenerationRequest,
    ) -> Result<reqwest::Response, LlmError> {
        let url = format!("{GEMINI_API_URL}/{MODEL}:{endpoint}");
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&build_request_body(req))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Generation API returned {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn stream_generate(&self, req: GenerationRequest) -> Result<TextStream, LlmError> {
        let response = self.post("streamGenerateContent?alt=sse", &req).await?;
        let mut bytes = response.bytes_stream();

        let stream = async_stream::stream! {
            let mut buf = String::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(LlmError::Http(e));
                        return;
                    }
                };
                buf.push_str(&String::from_utf8_lossy(&chunk));
                // SSE events are newline-delimited; parse every complete line.
                while let Some(pos) = buf.find('\n') {
                    let line: String = buf.drain(..=pos).collect();
                    match parse_sse_line(line.trim_end()) {
                        Ok(Some(text)) => yield Ok(text),
                        Ok(None) => {}
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn generate(&self, req: GenerationRequest) -> Result<String, LlmError> {
        let response = self.post("generateContent", &req).await?;
        let parsed: GenerateContentResponse = response.json().await?;
        let text = extract_text(&parsed);
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        debug!("Generation call succeeded: {} chars", text.len());
        Ok(text)
    }
}

/// Builds the Gemini request body. Safety settings are passthrough
/// configuration matching the product's moderation posture.
fn build_request_body(req: &GenerationRequest) -> serde_json::Value {
    let safety_settings: Vec<serde_json::Value> = [
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .iter()
    .map(|category| json!({ "category": category, "threshold": "BLOCK_NONE" }))
    .collect();

    json!({
        "systemInstruction": { "parts": [{ "text": req.system_instruction }] },
        "contents": [{ "role": "user", "parts": [{ "text": req.user_content }] }],
        "generationConfig": { "temperature": req.temperature },
        "safetySettings": safety_settings,
    })
}

/// Parses one SSE line. Returns `Ok(Some(text))` for a data line carrying
/// text, `Ok(None)` for lines to skip (comments, event/id lines, empty
/// chunks, end-of-stream markers).
fn parse_sse_line(line: &str) -> Result<Option<String>, LlmError> {
    let trimmed = line.trim();

    let json_str = if let Some(rest) = trimmed.strip_prefix("data:") {
        rest.trim_start()
    } else {
        // Skip non-data SSE lines (event:, id:, retry:, comments, empty)
        return Ok(None);
    };

    if json_str.is_empty() || json_str == "[DONE]" {
        return Ok(None);
    }

    let parsed: GenerateContentResponse =
        serde_json::from_str(json_str).map_err(|e| LlmError::Api {
            status: 0,
            message: format!("unparseable stream chunk: {e}"),
        })?;

    let text = extract_text(&parsed);
    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}
