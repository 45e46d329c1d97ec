//! Retrieval seam between the answer service and the index.

use crate::types::Passage;
use mutuo_core::AppResult;

/// Anything that can return the passages most relevant to a question.
///
/// Implementations return at most their configured K passages, ordered by
/// descending similarity.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieve the top passages for `question`.
    async fn retrieve(&self, question: &str) -> AppResult<Vec<Passage>>;
}
