//! Knowledge layer for the mortgage assistant.
//!
//! Opens the persisted passage index read-only, retrieves the passages most
//! similar to a question, and answers it with a single "stuff" prompt.
//! Citation grouping and rendering live in [`rag::citations`].
//!
//! The index itself is produced by a separate ingestion step; nothing in this
//! crate writes to it.

pub mod embeddings;
pub mod index;
pub mod rag;
pub mod retriever;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingProvider};
pub use index::{open_index, Index, INDEX_FILE_NAME};
pub use rag::{
    aggregate, answer, render_citations, AnswerOptions, AnswerService, CitationBlock,
    CitationGroup, CitationLabels, GenerationResult, RenderedCitation,
};
pub use retriever::Retriever;
pub use types::Passage;
