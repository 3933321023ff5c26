use healthai::config::GeminiConfig;
use healthai::providers::GeminiProvider;
use healthai::storage::HistoryStore;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

pub const TEST_MODEL: &str = "gemini-2.0-flash";

#[allow(dead_code)]
pub fn gemini_provider(api_base: &str) -> GeminiProvider {
    let config = GeminiConfig {
        model: TEST_MODEL.to_string(),
        api_key: Some("test-key".to_string()),
        api_base: Some(api_base.to_string()),
    };
    GeminiProvider::new(config, Duration::from_secs(5)).expect("failed to create provider")
}

/// `generateContent` response body carrying `text`
#[allow(dead_code)]
pub fn text_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

/// SSE body that streams `chunks` as separate events
#[allow(dead_code)]
pub fn sse_body(chunks: &[&str]) -> String {
    chunks
        .iter()
        .map(|c| format!("data: {}\r\n\r\n", text_response(c)))
        .collect()
}

#[allow(dead_code)]
pub fn create_temp_store(cap: usize) -> (HistoryStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = HistoryStore::new_with_path(tmp.path().join("history.db"), cap)
        .expect("failed to create history store");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
