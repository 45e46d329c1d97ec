//! Embedding provider trait and factory.

use crate::embeddings::providers::{MockProvider, OpenAiEmbeddings};
use mutuo_core::{AppError, AppResult};
use mutuo_llm::ClientOptions;
use std::sync::Arc;

/// Dimensions produced by the offline mock provider.
pub const MOCK_DIMENSIONS: usize = 384;

/// Capability that turns text into a numeric vector.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "openai")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Retrieval("No embedding returned".to_string()))
    }
}

/// Create an embedding provider by name.
///
/// Construction never touches the network; the first request happens when a
/// question is embedded.
pub fn create_provider(
    provider: &str,
    model: &str,
    options: ClientOptions,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match provider {
        "mock" => Ok(Arc::new(MockProvider::new(MOCK_DIMENSIONS))),

        "openai" => {
            let provider = OpenAiEmbeddings::new(model, options)?;
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: openai, mock",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock_provider() {
        let provider =
            create_provider("mock", "ignored", ClientOptions::new("sk-test", 10)).unwrap();
        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.model_name(), "trigram-v1");
    }

    #[test]
    fn test_create_openai_provider() {
        let provider = create_provider(
            "openai",
            "text-embedding-ada-002",
            ClientOptions::new("sk-test", 10),
        )
        .unwrap();
        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.model_name(), "text-embedding-ada-002");
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider("unknown", "x", ClientOptions::new("sk-test", 10));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider("mock", "x", ClientOptions::new("sk-test", 10)).unwrap();
        let embedding = provider.embed("tasso fisso").await.unwrap();
        assert_eq!(embedding.len(), MOCK_DIMENSIONS);
    }
}
