//! Offline embedding provider based on hashed word trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use mutuo_core::AppResult;
use std::collections::{HashMap, HashSet};

/// Italian and English function words ignored when hashing.
const STOP_WORDS: &[&str] = &[
    "il", "lo", "la", "i", "gli", "le", "un", "uno", "una", "di", "del", "della", "dei", "delle",
    "da", "in", "con", "su", "per", "tra", "fra", "che", "non", "sono", "come", "the", "and",
    "for", "with", "from", "this", "that",
];

/// Deterministic provider for development without network access.
///
/// Vectors are content-dependent (shared trigrams raise cosine similarity)
/// but carry no semantics. An index scored with this provider must have been
/// built with it too.
#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    /// Create a new mock provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn hash_into(&self, token: &str, multiplier: u64) -> usize {
        let hash = token
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(b as u64));
        (hash % self.dimensions as u64) as usize
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return embedding;
        }

        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();
        let lower = text.to_lowercase();

        let mut frequencies: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !stop_words.contains(w))
        {
            *frequencies.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &frequencies {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                let idx = self.hash_into(&trigram, 37);
                embedding[idx] += (*freq as f32).sqrt();
            }

            let idx = self.hash_into(word, 31);
            embedding[idx] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|v| *v /= norm);
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.vectorize(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[tokio::test]
    async fn test_embed_is_unit_length() {
        let provider = MockProvider::new(384);
        let embedding = provider.embed("mutuo a tasso variabile").await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_embed_batch_preserves_order_and_determinism() {
        let provider = MockProvider::new(128);
        let texts = vec!["surroga".to_string(), "ipoteca".to_string()];

        let first = provider.embed_batch(&texts).await.unwrap();
        let second = provider.embed_batch(&texts).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_ne!(first[0], first[1]);
    }

    #[tokio::test]
    async fn test_stop_words_only_gives_zero_vector() {
        let provider = MockProvider::new(64);
        let embedding = provider.embed("il la di per che").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_accented_text_is_safe() {
        let provider = MockProvider::new(64);
        let embedding = provider.embed("Qual è la durata più conveniente?").await.unwrap();
        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }
}
