//! Policy document fetching for the document question endpoint

use crate::error::{HealthaiError, Result};
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

/// Fetch `url` and return its text
///
/// A PDF (by content type, extension or `%PDF` magic bytes) goes through
/// text extraction; anything else is decoded as UTF-8. Bodies larger than
/// `max_bytes` are refused before extraction.
///
/// # Errors
///
/// Every failure is a `Fetch` error. PDF failures read
/// `PDF extraction failed: ...`.
pub async fn fetch_document_text(client: &Client, url: &str, max_bytes: usize) -> Result<String> {
    let parsed = url::Url::parse(url)
        .map_err(|e| HealthaiError::Fetch(format!("Invalid document URL: {}", e)))?;
    let pdf_path = parsed.path().to_ascii_lowercase().ends_with(".pdf");

    tracing::info!(host = parsed.host_str().unwrap_or("-"), "Fetching policy document");

    let response = client
        .get(parsed)
        .send()
        .await
        .map_err(|e| HealthaiError::Fetch(format!("Failed to download document: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(HealthaiError::Fetch(format!("Document download failed with status {}", status)).into());
    }

    if let Some(length) = response.content_length() {
        if length > max_bytes as u64 {
            return Err(too_large(max_bytes));
        }
    }

    let pdf_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains("application/pdf"))
        .unwrap_or(false);

    // Content-Length can be absent or wrong, so the cap also holds while reading
    let mut body = Vec::new();
    let mut chunks = response.bytes_stream();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(|e| HealthaiError::Fetch(format!("Failed to read document: {}", e)))?;
        if body.len() + chunk.len() > max_bytes {
            return Err(too_large(max_bytes));
        }
        body.extend_from_slice(&chunk);
    }

    let text = if pdf_path || pdf_type || body.starts_with(b"%PDF") {
        tracing::debug!(bytes = body.len(), "Extracting PDF text");
        extract_pdf_text(body).await?
    } else {
        String::from_utf8_lossy(&body).into_owned()
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(HealthaiError::Fetch("No text extracted from document.".to_string()).into());
    }
    Ok(text.to_string())
}

/// Extract the text layer of a PDF off the async runtime
async fn extract_pdf_text(bytes: Vec<u8>) -> Result<String> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(pdf_failed)?
        .map_err(pdf_failed)?;

    if text.trim().is_empty() {
        return Err(pdf_failed("No text extracted from PDF."));
    }
    Ok(text)
}

fn pdf_failed(reason: impl std::fmt::Display) -> anyhow::Error {
    HealthaiError::Fetch(format!("PDF extraction failed: {}", reason)).into()
}

fn too_large(max_bytes: usize) -> anyhow::Error {
    HealthaiError::Fetch(format!("Document exceeds the {} byte limit", max_bytes)).into()
}
