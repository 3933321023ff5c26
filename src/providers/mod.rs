//! Provider module for HealthAI
//!
//! This module contains the completion provider abstraction and the Gemini
//! implementation.

pub mod base;
pub mod gemini;

pub use base::{Message, Provider, Role, TextStream};
pub use gemini::GeminiProvider;

use crate::config::ProviderConfig;
use crate::error::{HealthaiError, Result};
use std::time::Duration;

/// Create a provider instance based on configuration
///
/// # Errors
///
/// Returns error if the provider type is unknown or initialization fails
/// (for Gemini, a missing API key).
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    let timeout = Duration::from_secs(config.timeout_seconds);
    match config.provider_type.as_str() {
        "gemini" => Ok(Box::new(GeminiProvider::new(config.gemini.clone(), timeout)?)),
        other => Err(HealthaiError::Provider(format!("Unknown provider type: {}", other)).into()),
    }
}
