/// LLM Client — the single point of entry for all OpenAI calls in HirePrep.
///
/// ARCHITECTURAL RULE: No other module may call the OpenAI API directly.
/// Handlers talk to `CompletionProvider`; `LlmClient` is its production implementation.
///
/// Model: gpt-4o-mini (hardcoded — do not make configurable to prevent drift)
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::chat::Message;

pub mod prompts;
pub mod sse;

use sse::{SseDecoder, SseEvent};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// The model used for all LLM calls in HirePrep.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 2048;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    /// The provider stopped because it ran out of tokens (`finish_reason: "length"`).
    #[error("LLM output truncated at the token limit")]
    Truncated,

    #[error("Stream error: {0}")]
    Stream(String),
}

/// Incremental text deltas of one streamed completion.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// Completion backend used by the generation handlers.
///
/// Carried in `AppState` as `Arc<dyn CompletionProvider>` so tests can swap in
/// a scripted provider without touching the handlers.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Full, non-streamed completion.
    async fn complete(&self, system: &str, messages: &[Message]) -> Result<String, LlmError>;

    /// Streamed completion. An `Err` here means the provider rejected the
    /// request before any text was produced.
    async fn stream(&self, system: &str, messages: &[Message]) -> Result<TextStream, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }

    pub fn is_truncated(&self) -> bool {
        self.choices
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            == Some("length")
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// The single LLM client used by all services in HirePrep.
/// Wraps the OpenAI Chat Completions API with retry logic and streaming.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request<'a>(system: &'a str, messages: &'a [Message], stream: bool) -> ChatRequest<'a> {
        let mut wire = Vec::with_capacity(messages.len() + 1);
        wire.push(ChatMessage {
            role: "system",
            content: system,
        });
        wire.extend(messages.iter().map(|m| ChatMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));
        ChatRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            messages: wire,
            stream,
        }
    }

    /// Makes a raw call to the API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(&self, system: &str, messages: &[Message]) -> Result<ChatResponse, LlmError> {
        let request_body = Self::build_request(system, messages, false);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(self.completions_url())
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                return Err(api_error(status.as_u16(), response.text().await.unwrap_or_default()));
            }

            let chat_response: ChatResponse = response.json().await?;

            if let Some(usage) = &chat_response.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            if chat_response.is_truncated() {
                return Err(LlmError::Truncated);
            }

            return Ok(chat_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Convenience method that calls the LLM and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        system: &str,
        messages: &[Message],
    ) -> Result<T, LlmError> {
        let response = self.call(system, messages).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        parse_json_reply(text)
    }

    /// Opens a streamed completion and forwards text deltas through a channel.
    ///
    /// No retries: once text has been forwarded a retry would duplicate it.
    pub async fn stream_chat(&self, system: &str, messages: &[Message]) -> Result<TextStream, LlmError> {
        let request_body = Self::build_request(system, messages, true);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), response.text().await.unwrap_or_default()));
        }

        let (tx, rx) = mpsc::channel(32);
        let mut bytes = response.bytes_stream();

        tokio::spawn(async move {
            let mut decoder = SseDecoder::default();
            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(Err(LlmError::Http(e))).await;
                        return;
                    }
                };
                for event in decoder.push(&chunk) {
                    let item = match event {
                        SseEvent::Delta(text) => Ok(text),
                        SseEvent::Finished(reason) if reason == "length" => Err(LlmError::Truncated),
                        SseEvent::Finished(_) | SseEvent::Done => return,
                        SseEvent::Malformed(line) => {
                            warn!("Skipping malformed SSE line: {line}");
                            continue;
                        }
                    };
                    let stop = item.is_err();
                    if tx.send(item).await.is_err() || stop {
                        return;
                    }
                }
            }
            debug!("LLM stream ended without a finish event");
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(&self, system: &str, messages: &[Message]) -> Result<String, LlmError> {
        let response = self.call(system, messages).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    async fn stream(&self, system: &str, messages: &[Message]) -> Result<TextStream, LlmError> {
        self.stream_chat(system, messages).await
    }
}

fn api_error(status: u16, body: String) -> LlmError {
    // Try to parse error message
    let message = serde_json::from_str::<OpenAiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    LlmError::Api { status, message }
}

/// Parses a model reply that should be JSON, tolerating markdown fences.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    serde_json::from_str(strip_json_fences(text)).map_err(LlmError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
