//! Assistant panels
//!
//! [`HealthAssistant`] implements the single-shot panels (symptoms, drugs,
//! explain, summarize, question, policy). Each one validates its input,
//! builds the panel prompt, prefixes the language preamble and asks the
//! provider for a full completion.

use crate::error::{HealthaiError, Result};
use crate::language::localize_prompt;
use crate::medications::MedicationList;
use crate::prompts::{self, Panel};
use crate::providers::{Message, Provider};
use crate::storage::Severity;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Input to the symptom analyzer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymptomRequest {
    pub symptoms: String,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub duration: Option<String>,
}

impl SymptomRequest {
    pub fn new(symptoms: impl Into<String>) -> Self {
        Self {
            symptoms: symptoms.into(),
            ..Default::default()
        }
    }
}

/// Runs the panel requests against a provider
#[derive(Clone)]
pub struct HealthAssistant {
    provider: Arc<dyn Provider>,
    max_input_chars: usize,
}

impl HealthAssistant {
    pub fn new(provider: Arc<dyn Provider>, max_input_chars: usize) -> Self {
        Self {
            provider,
            max_input_chars,
        }
    }

    /// The provider backing this assistant
    pub fn provider(&self) -> Arc<dyn Provider> {
        Arc::clone(&self.provider)
    }

    /// Analyze a symptom description
    pub async fn analyze_symptoms(&self, request: &SymptomRequest) -> Result<String> {
        let symptoms = prompts::require_text(Panel::Symptoms, &request.symptoms)?;
        prompts::check_length(symptoms, self.max_input_chars)?;

        let prompt =
            prompts::symptoms_prompt(symptoms, request.severity, request.duration.as_deref());
        self.run(Panel::Symptoms, &prompt, symptoms).await
    }

    /// Check interactions between two or more medications
    pub async fn check_drug_interactions(&self, medications: &[String]) -> Result<String> {
        let list = MedicationList::from_names(medications);
        if !list.is_ready() {
            return Err(
                HealthaiError::Validation(Panel::Drugs.empty_input_message().to_string()).into(),
            );
        }

        let joined = list.names().join(", ");
        let prompt = prompts::drug_interaction_prompt(list.names());
        self.run(Panel::Drugs, &prompt, &joined).await
    }

    /// Explain a medical term in plain language
    pub async fn explain_term(&self, term: &str) -> Result<String> {
        let term = prompts::require_text(Panel::Explain, term)?;
        self.run(Panel::Explain, &prompts::explain_prompt(term), term)
            .await
    }

    /// Summarize a medical report
    pub async fn summarize_report(&self, report: &str) -> Result<String> {
        let report = prompts::require_text(Panel::Summarize, report)?;
        prompts::check_length(report, self.max_input_chars)?;
        self.run(Panel::Summarize, &prompts::summarize_prompt(report), report)
            .await
    }

    /// Answer a single freeform health question (no conversation context)
    pub async fn answer_question(&self, message: &str) -> Result<String> {
        let message = prompts::require_text(Panel::Chat, message)?;
        self.run(Panel::Chat, &prompts::chat_prompt(message), message)
            .await
    }

    /// Answer one question about a policy document
    ///
    /// Unlike the panels, provider errors are returned as-is so the caller
    /// can report the underlying cause per question.
    pub async fn answer_policy_question(&self, question: &str, policy_text: &str) -> Result<String> {
        let prompt = localize_prompt(
            &prompts::generate_policy_prompt(question, policy_text),
            question,
        );
        let text = self.provider.complete(&[Message::user(prompt)]).await?;
        Ok(text.trim().to_string())
    }

    async fn run(&self, panel: Panel, prompt: &str, input_text: &str) -> Result<String> {
        let prompt = localize_prompt(prompt, input_text);
        tracing::info!(panel = %panel, model = %self.provider.model(), "Running panel request");

        match self.provider.complete(&[Message::user(prompt)]).await {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::error!(panel = %panel, "Panel request failed: {:#}", e);
                Err(HealthaiError::PanelFailed(panel.failure_message().to_string()).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FailingProvider, RecordingProvider};

    fn assistant_with(provider: Arc<dyn Provider>) -> HealthAssistant {
        HealthAssistant::new(provider, 1000)
    }

    #[tokio::test]
    async fn test_analyze_symptoms_sends_localized_prompt() {
        let provider = Arc::new(RecordingProvider::new(vec!["analysis"]));
        let assistant = assistant_with(provider.clone());

        let result = assistant
            .analyze_symptoms(&SymptomRequest::new("  headache and fever "))
            .await
            .unwrap();

        assert_eq!(result, "analysis");
        assert_eq!(
            provider.prompts(),
            vec!["As a medical AI assistant, Please analyze these symptoms: headache and fever"]
        );
    }

    #[tokio::test]
    async fn test_empty_symptoms_rejected_without_request() {
        let provider = Arc::new(RecordingProvider::new(vec![]));
        let assistant = assistant_with(provider.clone());

        let err = assistant
            .analyze_symptoms(&SymptomRequest::new("   "))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Please describe your symptoms.");
        assert!(provider.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_symptoms_over_limit_rejected() {
        let provider = Arc::new(RecordingProvider::new(vec![]));
        let assistant = HealthAssistant::new(provider.clone(), 10);

        let result = assistant
            .analyze_symptoms(&SymptomRequest::new("a".repeat(11)))
            .await;

        assert!(matches!(
            result.unwrap_err().downcast_ref::<HealthaiError>(),
            Some(HealthaiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_drug_check_needs_two_distinct() {
        let provider = Arc::new(RecordingProvider::new(vec![]));
        let assistant = assistant_with(provider.clone());

        let err = assistant
            .check_drug_interactions(&["aspirin".to_string(), "aspirin".to_string()])
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Please enter at least two medications to check for interactions."
        );
    }

    #[tokio::test]
    async fn test_drug_check_prompt() {
        let provider = Arc::new(RecordingProvider::new(vec!["ok"]));
        let assistant = assistant_with(provider.clone());

        assistant
            .check_drug_interactions(&["阿司匹林".to_string(), "华法林".to_string()])
            .await
            .unwrap();

        assert_eq!(
            provider.prompts(),
            vec!["作为医疗AI助手，Check interactions for: 阿司匹林, 华法林"]
        );
    }

    #[tokio::test]
    async fn test_provider_failure_maps_to_panel_message() {
        let assistant = assistant_with(Arc::new(FailingProvider));

        let err = assistant.explain_term("angina").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to explain the medical term. Please try again."
        );

        let err = assistant.summarize_report("CBC").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HealthaiError>(),
            Some(HealthaiError::PanelFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_answer_question_prompt() {
        let provider = Arc::new(RecordingProvider::new(vec!["drink water"]));
        let assistant = assistant_with(provider.clone());

        let answer = assistant.answer_question("Stress relief").await.unwrap();
        assert_eq!(answer, "drink water");
        assert_eq!(
            provider.prompts(),
            vec!["As a medical AI assistant, Respond to this question: Stress relief"]
        );
    }

    #[tokio::test]
    async fn test_policy_question_passes_errors_through() {
        let assistant = assistant_with(Arc::new(FailingProvider));
        let err = assistant
            .answer_policy_question("covered?", "policy")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HealthaiError>(),
            Some(HealthaiError::Provider(_))
        ));
    }
}
