//! Question embedding providers.
//!
//! The index stores vectors computed at ingestion time; at question time the
//! same kind of provider turns the question into a vector for scoring.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider, MOCK_DIMENSIONS};
