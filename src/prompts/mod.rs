//! Prompt templates for the assistant panels
//!
//! Every panel interpolates the user's text into a fixed instruction. The
//! language preamble is added afterwards by [`crate::language::localize_prompt`].

pub mod policy_prompt;

use crate::error::{HealthaiError, Result};
use crate::storage::Severity;
use std::fmt;

pub use policy_prompt::generate_policy_prompt;

/// One user-facing assistant function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Symptoms,
    Drugs,
    Explain,
    Summarize,
    Chat,
}

impl Panel {
    /// Message shown when the panel's input is empty
    pub fn empty_input_message(&self) -> &'static str {
        match self {
            Self::Symptoms => "Please describe your symptoms.",
            Self::Drugs => "Please enter at least two medications to check for interactions.",
            Self::Explain => "Please enter a medical term to explain.",
            Self::Summarize => "No report content provided to analyze.",
            Self::Chat => "Please enter your health-related question.",
        }
    }

    /// Message shown when the completion request fails
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::Symptoms => "Failed to analyze symptoms. Please try again.",
            Self::Drugs => "Failed to analyze drug interactions. Please try again.",
            Self::Explain => "Failed to explain the medical term. Please try again.",
            Self::Summarize => "Failed to summarize the medical report. Please try again.",
            Self::Chat => "Failed to process your question. Please try again.",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Symptoms => "symptoms",
            Self::Drugs => "drugs",
            Self::Explain => "explain",
            Self::Summarize => "summarize",
            Self::Chat => "chat",
        };
        f.write_str(name)
    }
}

/// Trim `text`, rejecting whitespace-only input with the panel's message
///
/// # Examples
///
/// ```
/// use healthai::prompts::{require_text, Panel};
///
/// assert_eq!(require_text(Panel::Explain, "  angina ").unwrap(), "angina");
/// assert!(require_text(Panel::Explain, "   ").is_err());
/// ```
pub fn require_text(panel: Panel, text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(HealthaiError::Validation(panel.empty_input_message().to_string()).into());
    }
    Ok(trimmed)
}

/// Reject input longer than `max_chars` characters
pub fn check_length(text: &str, max_chars: usize) -> Result<()> {
    let count = text.chars().count();
    if count > max_chars {
        return Err(HealthaiError::Validation(format!(
            "Input is too long ({}/{} characters).",
            count, max_chars
        ))
        .into());
    }
    Ok(())
}

/// `Please analyze these symptoms: ...` with optional severity and duration
pub fn symptoms_prompt(symptoms: &str, severity: Option<Severity>, duration: Option<&str>) -> String {
    let mut prompt = format!("Please analyze these symptoms: {}", symptoms);
    if let Some(severity) = severity {
        prompt.push_str(&format!("\nSeverity: {}", severity));
    }
    if let Some(duration) = duration.map(str::trim).filter(|d| !d.is_empty()) {
        prompt.push_str(&format!("\nDuration: {}", duration));
    }
    prompt
}

/// `Check interactions for: a, b, c`
pub fn drug_interaction_prompt(medications: &[String]) -> String {
    format!("Check interactions for: {}", medications.join(", "))
}

/// `Explain: term`
pub fn explain_prompt(term: &str) -> String {
    format!("Explain: {}", term)
}

/// `Summarize this medical report: ...`
pub fn summarize_prompt(report: &str) -> String {
    format!("Summarize this medical report: {}", report)
}

/// `Respond to this question: ...`
pub fn chat_prompt(message: &str) -> String {
    format!("Respond to this question: {}", message)
}
