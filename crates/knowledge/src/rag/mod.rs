//! Retrieval-augmented answering.
//!
//! Stuffs the retrieved passages and the question into one prompt, calls the
//! generator once, and groups the passages used into citations.

pub mod answer;
pub mod citations;
pub mod prompt;
pub mod types;

pub use answer::{answer, AnswerService};
pub use citations::{
    aggregate, normalize_source_path, render_citations, CitationBlock, CitationGroup,
    CitationLabels, Occurrence, RenderedCitation,
};
pub use types::{AnswerOptions, GenerationResult};
