//! HealthAI - health information assistant CLI
//!
#![doc = "Main entry point for the HealthAI command-line application."]

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use healthai::assistant::SymptomRequest;
use healthai::cli::{Cli, Commands};
use healthai::commands;
use healthai::config::Config;
use healthai::storage::HistoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose, cli.json_logs);

    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;
    config.validate()?;

    match cli.command {
        Commands::Symptoms {
            text,
            severity,
            duration,
            no_save,
        } => {
            tracing::info!("Running symptom analysis");
            let assistant = commands::build_assistant(&config)?;
            let store = if no_save {
                None
            } else {
                Some(HistoryStore::from_config(&config.history)?)
            };
            let request = SymptomRequest {
                symptoms: text,
                severity,
                duration,
            };
            commands::panels::run_symptoms(&assistant, request, store.as_ref()).await?;
        }
        Commands::Drugs { names } => {
            tracing::info!(count = names.len(), "Checking drug interactions");
            let assistant = commands::build_assistant(&config)?;
            commands::panels::run_drugs(&assistant, &names).await?;
        }
        Commands::Explain { term } => {
            tracing::info!("Explaining medical term");
            let assistant = commands::build_assistant(&config)?;
            commands::panels::run_explain(&assistant, &term).await?;
        }
        Commands::Summarize { text, file } => {
            tracing::info!("Summarizing medical report");
            if let Some(path) = &file {
                tracing::debug!("Reading report from: {}", path.display());
            }
            let assistant = commands::build_assistant(&config)?;
            commands::panels::run_summarize(&assistant, text, file.as_deref()).await?;
        }
        Commands::Chat => {
            commands::chat::run_chat(config).await?;
        }
        Commands::History { command } => {
            let store = HistoryStore::from_config(&config.history)
                .context("Failed to open analysis history")?;
            tracing::debug!("Using history database: {}", store.path().display());
            commands::history::handle_history(&store, command)?;
        }
        Commands::Serve { bind } => {
            commands::serve::run_serve(config, bind).await?;
        }
    }

    Ok(())
}

/// Logs go to stderr so streamed answers on stdout stay readable
fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "healthai=debug" } else { "healthai=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
