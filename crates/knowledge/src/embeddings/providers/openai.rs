//! OpenAI embeddings provider.
//!
//! API: `POST {base_url}/embeddings` with bearer authentication. Used at
//! question time only; passage vectors come from the persisted index.

use crate::embeddings::provider::EmbeddingProvider;
use async_trait::async_trait;
use mutuo_core::{AppError, AppResult};
use mutuo_llm::ClientOptions;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const EMBEDDING_ENDPOINT: &str = "/embeddings";

/// OpenAI embedding provider.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddings {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbeddings {
    /// Create a provider for `model` with the given connection options.
    ///
    /// # Errors
    /// * `AppError::Config` - if the HTTP client cannot be built
    pub fn new(model: impl Into<String>, options: ClientOptions) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| {
                AppError::Config(format!("Failed to create HTTP client for embeddings: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            api_key: options.api_key,
            model: model.into(),
        })
    }

    /// Order vectors by their `index` and check the count matches the input.
    fn collect_vectors(expected: usize, response: EmbeddingResponse) -> AppResult<Vec<Vec<f32>>> {
        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        if data.len() != expected {
            return Err(AppError::Retrieval(format!(
                "Expected {} embeddings, received {}",
                expected,
                data.len()
            )));
        }

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, texts), fields(count = texts.len(), model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to reach embeddings API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Retrieval(format!(
                "Embeddings API error ({}): {}",
                status,
                body.trim()
            )));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::Retrieval(format!("Failed to parse embeddings response: {}", e))
        })?;

        let vectors = Self::collect_vectors(texts.len(), parsed)?;
        debug!("Embedded {} texts", vectors.len());
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_vectors_sorts_by_index() {
        let response: EmbeddingResponse = serde_json::from_value(serde_json::json!({
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] }
            ]
        }))
        .unwrap();

        let vectors = OpenAiEmbeddings::collect_vectors(2, response).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_collect_vectors_count_mismatch() {
        let response: EmbeddingResponse =
            serde_json::from_value(serde_json::json!({ "data": [] })).unwrap();

        let result = OpenAiEmbeddings::collect_vectors(1, response);
        assert!(matches!(result, Err(AppError::Retrieval(_))));
    }

    #[tokio::test]
    async fn test_empty_batch_skips_network() {
        let provider = OpenAiEmbeddings::new(
            "text-embedding-ada-002",
            ClientOptions::new("sk-test", 1).with_base_url("http://127.0.0.1:9"),
        )
        .unwrap();

        let vectors = provider.embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_retrieval_error() {
        let provider = OpenAiEmbeddings::new(
            "text-embedding-ada-002",
            ClientOptions::new("sk-test", 2).with_base_url("http://127.0.0.1:9"),
        )
        .unwrap();

        let result = provider.embed("mutuo").await;
        assert!(matches!(result, Err(AppError::Retrieval(_))));
    }
}
