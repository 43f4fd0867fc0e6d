//! LLM provider factory.
//!
//! This module provides a factory for creating LLM clients based on
//! application configuration. It handles provider resolution and secret
//! checks.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// This function performs the following:
/// 1. Matches the provider string to a known provider type
/// 2. Checks required secrets are present
/// 3. Creates the appropriate client implementation
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "openai", "claude")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (for providers that require it)
/// * `timeout` - Per-request timeout applied to provider calls
///
/// # Errors
/// Returns error if:
/// - Provider is unknown
/// - Required secrets are missing
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn LlmClient>, String> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            let client = OllamaClient::with_base_url_and_timeout(base_url, timeout);
            Ok(Arc::new(client))
        }
        "openai" => {
            if api_key.is_none() {
                return Err("OpenAI provider requires API key".to_string());
            }
            Err("OpenAI provider not yet implemented".to_string())
        }
        "claude" | "anthropic" => {
            if api_key.is_none() {
                return Err("Claude provider requires API key".to_string());
            }
            Err("Claude provider not yet implemented".to_string())
        }
        _ => Err(format!("Unknown provider: {}", provider)),
    }
}
