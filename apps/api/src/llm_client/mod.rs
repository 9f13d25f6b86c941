//! Client for the resume rewriting service (Anthropic Messages API).
//!
//! The tailoring module is the only caller and only ever wants one JSON
//! document back, so [`LlmClient::call_json`] is the whole public surface.
//! 429, 529 and other 5xx replies are retried with exponential backoff; any
//! other non-success status fails immediately. A reply cut off at the token
//! limit is an error rather than a parse failure, since a truncated resume is
//! the likely cause.

use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const MODEL: &str = "claude-sonnet-4-5";
/// A full tailored resume with every bullet fits comfortably.
const MAX_TOKENS: u32 = 8192;
const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },

    #[error("reply stopped at the {max_tokens}-token limit")]
    Truncated { max_tokens: u32 },

    #[error("reply has no text content")]
    EmptyContent,

    #[error("reply is not the expected JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesReply {
    #[serde(default)]
    content: Vec<ReplyBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Reply handling
// ────────────────────────────────────────────────────────────────────────────

/// How a non-success status is handled.
#[derive(Debug)]
enum Failure {
    Retry(LlmError),
    Fatal(LlmError),
}

fn is_retryable(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Maps a non-success status and its body to an error, preferring the API's
/// own `error.message` over the raw body.
fn classify_failure(status: u16, body: String) -> Failure {
    let message = serde_json::from_str::<ErrorReply>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    let error = LlmError::Api { status, message };
    if is_retryable(status) {
        Failure::Retry(error)
    } else {
        Failure::Fatal(error)
    }
}

/// Delay before attempt `attempt` (1-based retries): base, 2×base, 4×base...
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * (1u32 << attempt.saturating_sub(1).min(16))
}

/// Concatenated text blocks of a reply.
fn reply_text(reply: MessagesReply) -> Result<String, LlmError> {
    if reply.stop_reason.as_deref() == Some("max_tokens") {
        return Err(LlmError::Truncated {
            max_tokens: MAX_TOKENS,
        });
    }
    let text: String = reply
        .content
        .into_iter()
        .filter(|b| b.kind == "text")
        .filter_map(|b| b.text)
        .collect();
    if text.trim().is_empty() {
        Err(LlmError::EmptyContent)
    } else {
        Ok(text)
    }
}

/// Strips a surrounding ```json ... ``` (or bare ```) fence.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    Ok(serde_json::from_str(strip_json_fences(text))?)
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Messages API client. Cheap to clone.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
    retry_base: Duration,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key,
            endpoint: ANTHROPIC_API_URL.to_string(),
            retry_base: RETRY_BASE,
        })
    }

    /// Sends one user prompt and deserializes the text reply as `T`.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let reply = self.send_with_retries(prompt, system).await?;
        parse_json_reply(&reply_text(reply)?)
    }

    async fn send_with_retries(&self, prompt: &str, system: &str) -> Result<MessagesReply, LlmError> {
        let request = MessagesRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: [UserMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last = String::new();
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = backoff_delay(self.retry_base, attempt);
                warn!(attempt, delay_ms = delay.as_millis() as u64, %last, "retrying LLM call");
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(&self.endpoint)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&request)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) if e.is_timeout() || e.is_connect() => {
                    last = e.to_string();
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status().as_u16();
            if response.status().is_success() {
                let reply: MessagesReply = response.json().await?;
                debug!(
                    attempt,
                    blocks = reply.content.len(),
                    stop_reason = reply.stop_reason.as_deref().unwrap_or("none"),
                    "LLM call succeeded"
                );
                return Ok(reply);
            }

            let body = response.text().await.unwrap_or_default();
            match classify_failure(status, body) {
                Failure::Retry(e) => last = e.to_string(),
                Failure::Fatal(e) => return Err(e),
            }
        }

        Err(LlmError::Exhausted {
            attempts: MAX_ATTEMPTS,
            last,
        })
    }
}
