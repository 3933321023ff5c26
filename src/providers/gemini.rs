//! Google Gemini provider implementation for HealthAI
//!
//! Talks to the Generative Language REST API: `generateContent` for whole
//! responses and `streamGenerateContent?alt=sse` for incremental text.

use crate::config::{GeminiConfig, DEFAULT_GEMINI_API_BASE};
use crate::error::{HealthaiError, Result};
use crate::providers::{Message, Provider, Role, TextStream};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Gemini API provider
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use healthai::config::GeminiConfig;
/// use healthai::providers::{GeminiProvider, Message, Provider};
///
/// # async fn example() -> healthai::error::Result<()> {
/// let config = GeminiConfig {
///     api_key: Some("your-key".to_string()),
///     ..Default::default()
/// };
/// let provider = GeminiProvider::new(config, Duration::from_secs(60))?;
/// let text = provider.complete(&[Message::user("Explain: anemia")]).await?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiProvider {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

/// Request body for generateContent / streamGenerateContent
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

/// Response body (also the payload of each SSE event when streaming)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

impl GenerateContentResponse {
    /// Text of the first candidate, with all parts joined
    fn text(&self) -> String {
        self.candidates
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

    fn into_text(self) -> Result<String> {
        if self.candidates.is_empty() {
            if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
                return Err(HealthaiError::Provider(format!("Prompt blocked: {}", reason)).into());
            }
            return Err(
                HealthaiError::Provider("Response contained no candidates".to_string()).into(),
            );
        }

        if let Some(usage) = &self.usage_metadata {
            tracing::debug!(
                prompt_tokens = usage.prompt_token_count,
                completion_tokens = usage.candidates_token_count,
                "Gemini token usage"
            );
        }
        if let Some(reason) = self.candidates[0].finish_reason.as_deref() {
            if reason != "STOP" {
                tracing::warn!(finish_reason = reason, "Gemini response finished early");
            }
        }

        Ok(self.text())
    }
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` when no API key is configured, or an
    /// error if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig, timeout: Duration) -> Result<Self> {
        let api_key = config
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| HealthaiError::MissingCredentials("gemini".to_string()))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("healthai/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HealthaiError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        tracing::info!(
            "Initialized Gemini provider: base={}, model={}",
            api_base,
            config.model
        );

        Ok(Self {
            client,
            api_base,
            api_key,
            model: config.model,
        })
    }

    /// Build the endpoint URL for a model method
    fn endpoint(&self, method: &str, sse: bool) -> Result<url::Url> {
        let mut url = url::Url::parse(&format!(
            "{}/v1beta/models/{}:{}",
            self.api_base, self.model, method
        ))
        .map_err(|e| HealthaiError::Config(format!("Invalid Gemini API base: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            if sse {
                query.append_pair("alt", "sse");
            }
            query.append_pair("key", &self.api_key);
        }

        Ok(url)
    }

    fn build_request(messages: &[Message]) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: messages
                .iter()
                .map(|m| GeminiContent {
                    role: Some(
                        match m.role {
                            Role::User => "user",
                            Role::Assistant => "model",
                        }
                        .to_string(),
                    ),
                    parts: vec![GeminiPart {
                        text: Some(m.content.clone()),
                    }],
                })
                .collect(),
        }
    }

    async fn post(&self, method: &str, sse: bool, messages: &[Message]) -> Result<reqwest::Response> {
        let url = self.endpoint(method, sse)?;
        tracing::debug!(model = %self.model, method, messages = messages.len(), "Sending Gemini request");

        let response = self
            .client
            .post(url)
            .json(&Self::build_request(messages))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Gemini request failed: {}", e);
                HealthaiError::Provider(format!("Failed to reach Gemini API: {}", e))
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!("Gemini returned error {}: {}", status, body);
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                HealthaiError::Authentication(format!("Gemini rejected the API key ({})", status))
            }
            _ => HealthaiError::Provider(format!("Gemini returned error {}: {}", status, body)),
        }
        .into())
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let response = self.post("generateContent", false, messages).await?;

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            HealthaiError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        body.into_text()
    }

    async fn stream(&self, messages: &[Message]) -> Result<TextStream> {
        let response = self.post("streamGenerateContent", true, messages).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let byte_stream = response.bytes_stream();
        tokio::spawn(async move {
            parse_sse_stream(byte_stream, tx).await;
        });

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    fn model(&self) -> String {
        self.model.clone()
    }
}

// ---------------------------------------------------------------------------
// SSE parser
// ---------------------------------------------------------------------------

/// Parse a Gemini SSE byte stream and forward each event's text to `tx`
///
/// Runs until the body ends, an error is forwarded, or the receiver is
/// dropped (which is how a cancelled request stops the task). Bytes are
/// buffered rather than decoded per chunk so a multi-byte character split
/// across network chunks survives intact.
pub async fn parse_sse_stream(
    byte_stream: impl Stream<Item = reqwest::Result<Bytes>>,
    tx: mpsc::UnboundedSender<Result<String>>,
) {
    let mut buffer: Vec<u8> = Vec::new();

    tokio::pin!(byte_stream);

    while let Some(chunk_result) = byte_stream.next().await {
        let chunk = match chunk_result {
            Ok(c) => c,
            Err(e) => {
                let _ = tx.send(Err(HealthaiError::Http(e).into()));
                return;
            }
        };

        // CR never occurs inside a UTF-8 multi-byte sequence
        buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        while let Some(pos) = find_event_boundary(&buffer) {
            let block: Vec<u8> = buffer.drain(..pos + 2).collect();
            let block = String::from_utf8_lossy(&block[..pos]).into_owned();
            if !forward_event(&block, &tx) {
                return;
            }
        }
    }

    if !buffer.is_empty() {
        let block = String::from_utf8_lossy(&buffer).into_owned();
        forward_event(&block, &tx);
    }
}

fn find_event_boundary(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

/// Send one event downstream; returns false when streaming should stop.
fn forward_event(block: &str, tx: &mpsc::UnboundedSender<Result<String>>) -> bool {
    match parse_stream_event(block) {
        Some(Ok(text)) => tx.send(Ok(text)).is_ok(),
        Some(Err(e)) => {
            let _ = tx.send(Err(e));
            false
        }
        None => true,
    }
}

/// Decode one SSE event block into its text chunk
///
/// Returns `None` for events that carry no text (comments, keep-alives,
/// the final finish-reason-only event).
pub(crate) fn parse_stream_event(block: &str) -> Option<Result<String>> {
    let data = block
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");

    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    let event: GenerateContentResponse = match serde_json::from_str(&data) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!("Malformed Gemini stream event: {}", e);
            return Some(Err(HealthaiError::Provider(format!(
                "Malformed stream event: {}",
                e
            ))
            .into()));
        }
    };

    if event.candidates.is_empty() {
        if let Some(reason) = event.prompt_feedback.and_then(|f| f.block_reason) {
            return Some(Err(
                HealthaiError::Provider(format!("Prompt blocked: {}", reason)).into()
            ));
        }
        return None;
    }

    let text = event.text();
    if text.is_empty() {
        None
    } else {
        Some(Ok(text))
    }
}
