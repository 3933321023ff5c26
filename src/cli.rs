//! Command-line interface definition for HealthAI
//!
//! This module defines the CLI structure using clap's derive API: one
//! subcommand per assistant panel, plus interactive chat, analysis history
//! management and the HTTP server.

use crate::storage::Severity;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// HealthAI - health information assistant
///
/// Analyze symptoms, check drug interactions, explain medical terms,
/// summarize reports and chat about health questions. Answers are general
/// information and not a substitute for professional medical advice.
#[derive(Parser, Debug, Clone)]
#[command(name = "healthai")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Override the model from config
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Path to the analysis history database
    #[arg(long, global = true)]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for HealthAI
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Analyze a description of symptoms
    Symptoms {
        /// Symptom description
        text: String,

        /// Severity (mild, moderate, severe)
        #[arg(short, long, value_parser = parse_severity)]
        severity: Option<Severity>,

        /// How long the symptoms have lasted (e.g. "3 days")
        #[arg(short, long)]
        duration: Option<String>,

        /// Do not save the analysis to history
        #[arg(long)]
        no_save: bool,
    },

    /// Check interactions between two or more medications
    Drugs {
        /// Medication names
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
    },

    /// Explain a medical term in plain language
    Explain {
        /// Term to explain
        term: String,
    },

    /// Summarize a medical report
    Summarize {
        /// Report text (alternative to --file)
        #[arg(conflicts_with = "file")]
        text: Option<String>,

        /// Read the report from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Start an interactive health chat
    Chat,

    /// Manage saved symptom analyses
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Serve the assistant over HTTP
    Serve {
        /// Address to bind (overrides server.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List saved analyses, newest first
    List,

    /// Show one analysis in full
    Show {
        /// Analysis ID (or unique prefix)
        id: String,
    },

    /// Delete one analysis
    Delete {
        /// Analysis ID
        id: String,
    },

    /// Delete all saved analyses
    Clear,
}

fn parse_severity(value: &str) -> Result<Severity, String> {
    value.parse::<Severity>().map_err(|e| e.to_string())
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            model: None,
            storage_path: None,
            command: Commands::Chat,
        }
    }
}
