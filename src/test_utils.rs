//! Test utilities for HealthAI
//!
//! Temporary directories, scripted providers and assertion helpers shared
//! by the unit tests.

use crate::config::Config;
use crate::error::{HealthaiError, Result};
use crate::providers::{Message, Provider, TextStream};
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content, returning its path
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error's display text contains `expected`
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Configuration with a dummy API key, suitable for building a provider
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.provider.gemini.api_key = Some("test-key".to_string());
    config
}

/// One-page PDF whose text layer is `text` in Helvetica
///
/// `text` must not contain parentheses or backslashes.
pub fn minimal_pdf(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", content.len(), content),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", index + 1, body).as_bytes());
    }

    let xref_offset = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}

/// Provider that replays scripted replies and records every prompt
///
/// `complete` pops the next reply; `stream` pops the next reply and yields
/// it split on whitespace boundaries (`"a b"` becomes `"a "`, `"b"`).
pub struct RecordingProvider {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingProvider {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(String::from).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Content of the last message of every request, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next_reply(&self, messages: &[Message]) -> Result<String> {
        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| HealthaiError::Provider("no scripted reply".to_string()).into())
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.next_reply(messages)
    }

    async fn stream(&self, messages: &[Message]) -> Result<TextStream> {
        let reply = self.next_reply(messages)?;
        let chunks: Vec<Result<String>> = reply
            .split_inclusive(' ')
            .map(|c| Ok(c.to_string()))
            .collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    fn model(&self) -> String {
        "recording".to_string()
    }
}

/// Provider whose every request fails
pub struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    async fn complete(&self, _messages: &[Message]) -> Result<String> {
        Err(HealthaiError::Provider("service unavailable".to_string()).into())
    }

    fn model(&self) -> String {
        "failing".to_string()
    }
}

/// Provider that yields `chunks` and then an error mid-stream
pub struct BrokenStreamProvider {
    pub chunks: Vec<&'static str>,
}

#[async_trait]
impl Provider for BrokenStreamProvider {
    async fn complete(&self, _messages: &[Message]) -> Result<String> {
        Err(HealthaiError::Provider("not supported".to_string()).into())
    }

    async fn stream(&self, _messages: &[Message]) -> Result<TextStream> {
        let mut items: Vec<Result<String>> =
            self.chunks.iter().map(|c| Ok(c.to_string())).collect();
        items.push(Err(
            HealthaiError::Provider("connection reset".to_string()).into()
        ));
        Ok(Box::pin(futures::stream::iter(items)))
    }

    fn model(&self) -> String {
        "broken".to_string()
    }
}

/// Provider that yields one chunk and then never finishes
pub struct StallingProvider;

#[async_trait]
impl Provider for StallingProvider {
    async fn complete(&self, _messages: &[Message]) -> Result<String> {
        futures::future::pending().await
    }

    async fn stream(&self, _messages: &[Message]) -> Result<TextStream> {
        let first = futures::stream::once(async { Ok("Partial ".to_string()) });
        Ok(Box::pin(first.chain(futures::stream::pending())))
    }

    fn model(&self) -> String {
        "stalling".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "report.txt", "content");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(HealthaiError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    fn test_test_config_is_valid() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_minimal_pdf_xref_points_at_objects() {
        let pdf = minimal_pdf("hello");
        let text = String::from_utf8(pdf.clone()).unwrap();
        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.ends_with("%%EOF\n"));

        let catalog = text.find("1 0 obj").unwrap();
        assert!(text.contains(&format!("{:010} 00000 n ", catalog)));
    }

    #[tokio::test]
    async fn test_recording_provider_stream_splits_words() {
        let provider = RecordingProvider::new(vec!["Stay hydrated today"]);
        let chunks: Vec<String> = provider
            .stream(&[Message::user("q")])
            .await
            .unwrap()
            .map(|c| c.unwrap())
            .collect()
            .await;
        assert_eq!(chunks, vec!["Stay ", "hydrated ", "today"]);
        assert_eq!(provider.prompts(), vec!["q"]);
    }
}
