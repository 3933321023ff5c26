//! HTTP API
//!
//! [`router`] exposes every assistant panel as a JSON endpoint, the saved
//! analysis history, a health check, and the bearer-protected policy
//! document question endpoint.

pub mod documents;
pub mod error;

use crate::assistant::{HealthAssistant, SymptomRequest};
use crate::config::Config;
use crate::error::{HealthaiError, Result};
use crate::providers::create_provider;
use crate::storage::{AnalysisRecord, HistoryStore};
use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub use error::ApiError;

/// State shared by all handlers
pub struct AppState {
    pub assistant: HealthAssistant,
    pub history: HistoryStore,
    /// Accepted bearer tokens for `/hackrx/run`; empty accepts any token
    pub api_tokens: Vec<String>,
    pub http: reqwest::Client,
    /// Largest policy document `/hackrx/run` will download
    pub max_document_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = create_provider(&config.provider)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.server.fetch_timeout_seconds))
            .build()?;

        Ok(Self {
            assistant: HealthAssistant::new(Arc::from(provider), config.limits.max_input_chars),
            history: HistoryStore::from_config(&config.history)?,
            api_tokens: config.server.api_tokens.clone(),
            http,
            max_document_bytes: config.server.max_document_bytes,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SymptomsBody {
    #[serde(flatten)]
    pub request: SymptomRequest,
    #[serde(default = "default_save")]
    pub save: bool,
}

fn default_save() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct DrugsBody {
    pub medications: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExplainBody {
    pub term: String,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeBody {
    pub report: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ResultBody {
    pub result: String,
}

#[derive(Debug, Deserialize)]
pub struct DocumentQuestions {
    pub documents: String,
    pub questions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentAnswers {
    pub answers: Vec<String>,
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/symptoms", post(symptoms))
        .route("/api/drugs", post(drugs))
        .route("/api/explain", post(explain))
        .route("/api/summarize", post(summarize))
        .route("/api/chat", post(chat))
        .route("/api/history", get(list_history).delete(clear_history))
        .route("/hackrx/run", post(hackrx_run))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(state: Arc<AppState>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "HealthAI server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn symptoms(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SymptomsBody>,
) -> std::result::Result<Json<ResultBody>, ApiError> {
    let analysis = state.assistant.analyze_symptoms(&body.request).await?;

    // The analysis is returned even when it cannot be saved
    if body.save {
        let request = body.request;
        let text = analysis.clone();
        let saved = with_history(&state, move |history| {
            history.record(
                request.symptoms.trim(),
                &text,
                request.severity.unwrap_or_default(),
                request.duration.as_deref(),
            )
        })
        .await;
        if let Err(e) = saved {
            tracing::warn!(error = %format!("{:#}", e), "Failed to save symptom analysis");
        }
    }
    Ok(Json(ResultBody { result: analysis }))
}

async fn drugs(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DrugsBody>,
) -> std::result::Result<Json<ResultBody>, ApiError> {
    let result = state
        .assistant
        .check_drug_interactions(&body.medications)
        .await?;
    Ok(Json(ResultBody { result }))
}

async fn explain(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ExplainBody>,
) -> std::result::Result<Json<ResultBody>, ApiError> {
    let result = state.assistant.explain_term(&body.term).await?;
    Ok(Json(ResultBody { result }))
}

async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SummarizeBody>,
) -> std::result::Result<Json<ResultBody>, ApiError> {
    let result = state.assistant.summarize_report(&body.report).await?;
    Ok(Json(ResultBody { result }))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatBody>,
) -> std::result::Result<Json<ResultBody>, ApiError> {
    let result = state.assistant.answer_question(&body.message).await?;
    Ok(Json(ResultBody { result }))
}

async fn list_history(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Json<Vec<AnalysisRecord>>, ApiError> {
    let records = with_history(&state, |history| history.list()).await?;
    Ok(Json(records))
}

async fn clear_history(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Json<Value>, ApiError> {
    let removed = with_history(&state, |history| history.clear()).await?;
    Ok(Json(json!({ "removed": removed })))
}

/// Run a blocking history operation off the async workers
async fn with_history<T, F>(state: &AppState, op: F) -> Result<T>
where
    F: FnOnce(&HistoryStore) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let history = state.history.clone();
    tokio::task::spawn_blocking(move || op(&history)).await?
}

/// Token from an `Authorization: Bearer <token>` header
///
/// The scheme name is case-insensitive.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

/// Answer questions about a policy document
///
/// Download and PDF extraction failures produce a 400 whose `answers` holds
/// a single `Error: ...` entry. A question the model fails on gets an
/// `AI model error: ...` answer in its slot.
async fn hackrx_run(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<DocumentQuestions>,
) -> std::result::Result<Response, ApiError> {
    let token = bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("Missing Bearer token"))?;
    if !state.api_tokens.is_empty() && !state.api_tokens.iter().any(|t| t == token) {
        return Err(ApiError::unauthorized("Invalid Bearer token"));
    }

    let fetched =
        documents::fetch_document_text(&state.http, &body.documents, state.max_document_bytes).await;
    let policy_text = match fetched {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "Policy document unavailable");
            let reason = match e.downcast_ref::<HealthaiError>() {
                Some(HealthaiError::Fetch(message)) => message.clone(),
                _ => e.to_string(),
            };
            let answers = DocumentAnswers {
                answers: vec![format!("Error: {}", reason)],
            };
            return Ok((StatusCode::BAD_REQUEST, Json(answers)).into_response());
        }
    };

    let mut answers = Vec::with_capacity(body.questions.len());
    for question in &body.questions {
        let answer = match state
            .assistant
            .answer_policy_question(question, &policy_text)
            .await
        {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(error = %e, "Policy question failed");
                format!("AI model error: {}", e)
            }
        };
        answers.push(answer);
    }

    Ok(Json(DocumentAnswers { answers }).into_response())
}
