//! Embedding provider trait and factory.

use docent_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding providers.
///
/// Implementations must be deterministic within a session: embedding the
/// same text twice yields the same vector.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "ollama", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::retrieval("No embedding returned"))
    }
}

/// Create an embedding provider based on configuration.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "trigram")
/// * `model` - Model identifier (provider-specific)
/// * `dimensions` - Expected embedding dimensions
/// * `endpoint` - Optional custom endpoint URL (HTTP providers)
/// * `timeout` - Per-request timeout (HTTP providers)
pub fn create_provider(
    provider: &str,
    model: &str,
    dimensions: usize,
    endpoint: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match provider {
        "ollama" => {
            let provider = super::providers::ollama::OllamaProvider::new(
                model.to_string(),
                dimensions,
                endpoint,
                timeout,
            )?;
            Ok(Arc::new(provider))
        }

        "trigram" => {
            let provider = super::providers::trigram::TrigramProvider::new(dimensions);
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, trigram",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(30);

    #[test]
    fn test_create_trigram_provider() {
        let provider = create_provider("trigram", "trigram-v1", 384, None, TIMEOUT).unwrap();
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_create_ollama_provider() {
        let provider =
            create_provider("ollama", "nomic-embed-text", 768, None, TIMEOUT).unwrap();
        assert_eq!(provider.provider_name(), "ollama");
        assert_eq!(provider.model_name(), "nomic-embed-text");
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider("unknown", "test", 384, None, TIMEOUT);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider("trigram", "trigram-v1", 384, None, TIMEOUT).unwrap();

        let embedding = provider.embed("test text").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
