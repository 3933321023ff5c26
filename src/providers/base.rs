//! Base provider trait and common types for HealthAI
//!
//! This module defines the Provider trait that completion services must
//! implement, along with the message type sent to them and the boxed text
//! stream returned by streaming completions.

use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stream of incremental text chunks from a streaming completion
///
/// Concatenating every `Ok` item in order yields the full response text.
pub type TextStream = BoxStream<'static, Result<String>>;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Message structure sent to a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Text content of the message
    pub content: String,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use healthai::providers::{Message, Role};
    ///
    /// let msg = Message::user("What is hypertension?");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Provider trait for completion services
///
/// # Examples
///
/// ```
/// use healthai::providers::{Message, Provider};
/// use healthai::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl Provider for EchoProvider {
///     async fn complete(&self, messages: &[Message]) -> Result<String> {
///         Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
///     }
///
///     fn model(&self) -> String {
///         "echo".to_string()
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let reply = EchoProvider.complete(&[Message::user("ping")]).await.unwrap();
/// assert_eq!(reply, "ping");
/// # });
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Completes a conversation and returns the full response text
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or the response holds no text
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Completes a conversation, yielding text as it is generated
    ///
    /// The default implementation performs a blocking completion and yields
    /// it as a single chunk, so every provider can back the chat loop.
    async fn stream(&self, messages: &[Message]) -> Result<TextStream> {
        let text = self.complete(messages).await?;
        Ok(Box::pin(futures::stream::once(async move { Ok(text) })))
    }

    /// Name of the model requests are sent to
    fn model(&self) -> String;
}
