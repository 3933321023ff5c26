//! Single-shot panel commands: symptoms, drugs, explain, summarize

use crate::assistant::{HealthAssistant, SymptomRequest};
use crate::error::{HealthaiError, Result};
use crate::render::print_answer;
use crate::storage::HistoryStore;
use anyhow::Context;
use colored::Colorize;
use std::path::Path;

/// Analyze symptoms and, unless `store` is `None`, save the result
pub async fn run_symptoms(
    assistant: &HealthAssistant,
    request: SymptomRequest,
    store: Option<&HistoryStore>,
) -> Result<()> {
    let analysis = assistant.analyze_symptoms(&request).await?;
    print_answer("Symptom Analysis", &analysis);

    if let Some(store) = store {
        let record = store.record(
            request.symptoms.trim(),
            &analysis,
            request.severity.unwrap_or_default(),
            request.duration.as_deref(),
        )?;
        println!("Saved to history as {}", record.short_id().cyan());
    }
    Ok(())
}

pub async fn run_drugs(assistant: &HealthAssistant, names: &[String]) -> Result<()> {
    let result = assistant.check_drug_interactions(names).await?;
    print_answer("Drug Interactions", &result);
    Ok(())
}

pub async fn run_explain(assistant: &HealthAssistant, term: &str) -> Result<()> {
    let result = assistant.explain_term(term).await?;
    print_answer(&format!("About \"{}\"", term.trim()), &result);
    Ok(())
}

/// Summarize report text given inline or read from `file`
pub async fn run_summarize(
    assistant: &HealthAssistant,
    text: Option<String>,
    file: Option<&Path>,
) -> Result<()> {
    let report = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report {}", path.display()))?,
        (None, None) => {
            return Err(HealthaiError::Validation(
                "No report content provided to analyze.".to_string(),
            )
            .into())
        }
    };

    let result = assistant.summarize_report(&report).await?;
    print_answer("Report Summary", &result);
    Ok(())
}
