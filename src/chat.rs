//! Streaming chat session
//!
//! A [`ChatSession`] keeps the in-memory transcript of one conversation.
//! Each question is sent together with a short window of the preceding
//! messages, and the answer is accumulated chunk by chunk into an
//! assistant message that stays marked as streaming until the provider
//! finishes.

use crate::error::{HealthaiError, Result};
use crate::language::localize_prompt;
use crate::prompts::{self, Panel};
use crate::providers::{Message, Provider, Role};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Assistant message recorded when an answer fails
pub const CHAT_ERROR_MESSAGE: &str = "⚠️ Sorry, I encountered an error. Please try again.";

/// Default number of prior messages replayed into each prompt
pub const DEFAULT_CONTEXT_TURNS: usize = 5;

/// One message in the chat transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// True while the answer is still arriving
    pub streaming: bool,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>, streaming: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            streaming,
        }
    }
}

/// In-memory chat conversation
#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    context_turns: usize,
    cancel: CancellationToken,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_TURNS)
    }
}

impl ChatSession {
    pub fn new(context_turns: usize) -> Self {
        Self {
            messages: Vec::new(),
            context_turns,
            cancel: CancellationToken::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn context_turns(&self) -> usize {
        self.context_turns
    }

    /// Whether an answer is currently being streamed
    pub fn is_busy(&self) -> bool {
        self.messages.iter().any(|m| m.streaming)
    }

    /// Token that aborts the next (or current) streamed answer when cancelled
    ///
    /// Take a fresh handle before every [`send`](Self::send); a token that
    /// has already fired is replaced.
    pub fn cancel_handle(&mut self) -> CancellationToken {
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        self.cancel.clone()
    }

    /// Drop the transcript and start over
    pub fn new_session(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.messages.clear();
    }

    /// The last `context_turns` finished messages as `User:`/`Assistant:` lines
    ///
    /// # Examples
    ///
    /// ```
    /// use healthai::chat::ChatSession;
    ///
    /// let session = ChatSession::new(5);
    /// assert_eq!(session.context_window(), "");
    /// ```
    pub fn context_window(&self) -> String {
        let finished: Vec<&ChatMessage> = self.messages.iter().filter(|m| !m.streaming).collect();
        let start = finished.len().saturating_sub(self.context_turns);

        finished[start..]
            .iter()
            .map(|m| {
                let speaker = match m.role {
                    Role::User => "User",
                    Role::Assistant => "Assistant",
                };
                format!("{}: {}", speaker, m.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Prompt for `question`, preceded by the context window when there is history
    pub fn build_prompt(&self, question: &str) -> String {
        let prompt = localize_prompt(&prompts::chat_prompt(question), question);
        let window = self.context_window();
        if window.is_empty() {
            prompt
        } else {
            format!("Previous conversation:\n{}\n\n{}", window, prompt)
        }
    }

    /// Ask `text` and stream the answer into the transcript
    ///
    /// `on_chunk` is called with each new chunk and the text accumulated so
    /// far. Returns the complete answer.
    ///
    /// # Errors
    ///
    /// - `Validation` for empty input
    /// - `Busy` while another answer is streaming
    /// - `Cancelled` when the cancel handle fires; the partial answer is removed
    /// - `PanelFailed` when the provider fails; the transcript then ends with
    ///   [`CHAT_ERROR_MESSAGE`]
    pub async fn send<F>(&mut self, provider: &dyn Provider, text: &str, mut on_chunk: F) -> Result<String>
    where
        F: FnMut(&str, &str),
    {
        let question = prompts::require_text(Panel::Chat, text)?;
        if self.is_busy() {
            return Err(HealthaiError::Busy.into());
        }

        let prompt = self.build_prompt(question);
        self.messages.push(ChatMessage::new(Role::User, question, false));
        self.messages.push(ChatMessage::new(Role::Assistant, "", true));
        let cancel = self.cancel.clone();
        let request = [Message::user(prompt)];

        tracing::debug!(model = %provider.model(), "Streaming chat answer");

        let mut stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(self.abort_streaming()),
            result = provider.stream(&request) => match result {
                Ok(stream) => stream,
                Err(e) => return Err(self.fail(e)),
            },
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.abort_streaming()),
                next = stream.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    if let Some(answer) = self.messages.last_mut() {
                        answer.content.push_str(&chunk);
                        on_chunk(&chunk, &answer.content);
                    }
                }
                Some(Err(e)) => return Err(self.fail(e)),
                None => break,
            }
        }

        match self.messages.last_mut() {
            Some(answer) => {
                answer.streaming = false;
                Ok(answer.content.clone())
            }
            None => Err(HealthaiError::Cancelled.into()),
        }
    }

    fn abort_streaming(&mut self) -> anyhow::Error {
        tracing::info!("Chat answer cancelled");
        self.messages.retain(|m| !m.streaming);
        self.cancel = CancellationToken::new();
        HealthaiError::Cancelled.into()
    }

    fn fail(&mut self, error: anyhow::Error) -> anyhow::Error {
        tracing::error!("Chat request failed: {:#}", error);
        self.messages.retain(|m| !m.streaming);
        self.messages
            .push(ChatMessage::new(Role::Assistant, CHAT_ERROR_MESSAGE, false));
        HealthaiError::PanelFailed(CHAT_ERROR_MESSAGE.to_string()).into()
    }
}
