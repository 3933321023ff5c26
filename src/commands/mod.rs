/*!
Command handlers for the CLI

- `panels`: Single-shot symptoms, drugs, explain and summarize commands
- `chat`: Interactive streaming chat
- `history`: Saved symptom analyses
- `serve`: HTTP server
*/

use crate::assistant::HealthAssistant;
use crate::config::Config;
use crate::error::Result;
use crate::providers::create_provider;
use std::sync::Arc;

pub mod chat;
pub mod history;
pub mod panels;
pub mod special_commands;

/// Build the panel assistant from configuration
pub fn build_assistant(config: &Config) -> Result<HealthAssistant> {
    let provider = create_provider(&config.provider)?;
    Ok(HealthAssistant::new(
        Arc::from(provider),
        config.limits.max_input_chars,
    ))
}

pub mod serve {
    //! HTTP server command

    use super::*;
    use crate::server::{self, AppState};

    /// Serve the HTTP API on `bind`, or on `server.bind` from config
    pub async fn run_serve(config: Config, bind: Option<String>) -> Result<()> {
        let addr = bind.unwrap_or_else(|| config.server.bind.clone());
        let state = Arc::new(AppState::from_config(&config)?);
        tracing::info!(
            model = %state.assistant.provider().model(),
            history = %state.history.path().display(),
            "Starting HTTP server"
        );
        server::serve(state, &addr).await
    }
}
