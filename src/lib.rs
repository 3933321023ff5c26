//! HealthAI - health information assistant library
//!
//! Sends templated health questions to a hosted language model and renders
//! the answers, from the command line or over HTTP.
//!
//! # Architecture
//!
//! - `language`: script-based language detection for the prompt preamble
//! - `prompts`: per-panel prompt templates and input validation
//! - `providers`: completion provider abstraction and the Gemini client
//! - `assistant`: the single-shot panels (symptoms, drugs, explain, summarize)
//! - `chat`: streaming chat session with a short context window
//! - `storage`: capped history of symptom analyses
//! - `server`: axum HTTP API
//! - `config`, `error`, `cli`, `commands`: the application shell
//!
//! # Example
//!
//! ```no_run
//! use healthai::{Config, HealthAssistant};
//! use healthai::providers::create_provider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let provider = create_provider(&config.provider)?;
//!     let assistant = HealthAssistant::new(Arc::from(provider), config.limits.max_input_chars);
//!     println!("{}", assistant.explain_term("tachycardia").await?);
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod language;
pub mod medications;
pub mod prompts;
pub mod providers;
pub mod render;
pub mod server;
pub mod storage;

// Re-export commonly used types
pub use assistant::{HealthAssistant, SymptomRequest};
pub use chat::{ChatMessage, ChatSession};
pub use config::Config;
pub use error::{HealthaiError, Result};
pub use language::{detect_language, Language};
pub use medications::MedicationList;

#[cfg(test)]
pub mod test_utils;
