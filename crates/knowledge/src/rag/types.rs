//! Answer service types.

use crate::types::Passage;
use serde::{Deserialize, Serialize};

/// Outcome of one question/answer cycle.
///
/// `sources` is `Some` only when citations were requested, and then holds
/// exactly the passages that were stuffed into the prompt, in retrieval
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Text produced by the generator
    pub text: String,

    /// Passages used to build the prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Passage>>,
}

impl GenerationResult {
    /// Answer without attached passages.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: None,
        }
    }

    /// Answer carrying the passages used to produce it.
    pub fn with_sources(text: impl Into<String>, sources: Vec<Passage>) -> Self {
        Self {
            text: text.into(),
            sources: Some(sources),
        }
    }
}

/// Generation settings applied to every question.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOptions {
    /// Chat model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Optional cap on generated tokens
    pub max_tokens: Option<u32>,
}

impl Default for AnswerOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
            max_tokens: None,
        }
    }
}
