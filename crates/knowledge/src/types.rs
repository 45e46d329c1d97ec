//! Passage type definitions.

use mutuo_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// A retrieved unit of source-document text with its provenance.
///
/// Passages are immutable once loaded from the index and live for a single
/// question/answer cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Text content, opaque to this system
    pub text: String,

    /// Source file path as recorded at ingestion
    #[serde(default)]
    pub source: Option<String>,

    /// Page number within the source, when the loader recorded one
    #[serde(default)]
    pub page: Option<u32>,

    /// Character offset of the passage start within the extracted source
    /// text. Not a line number.
    #[serde(default)]
    pub offset: Option<u64>,
}

impl Passage {
    /// Create a passage with no provenance.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
            page: None,
            offset: None,
        }
    }

    /// Set the source path.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the character offset.
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Build a passage from its stored text and JSON metadata column.
    pub fn from_stored(text: String, metadata: Option<&str>) -> AppResult<Self> {
        let metadata = match metadata {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str::<StoredMetadata>(raw)
                .map_err(|e| AppError::Knowledge(format!("Invalid passage metadata: {}", e)))?,
            _ => StoredMetadata::default(),
        };

        Ok(Self {
            text,
            source: metadata.source,
            page: metadata.page,
            offset: metadata.start_index,
        })
    }
}

/// Metadata column layout written by the ingestion step.
///
/// `start_index` is the splitter's character offset; `offset` is accepted as
/// an alias.
#[derive(Debug, Clone, Default, Deserialize)]
struct StoredMetadata {
    #[serde(default)]
    source: Option<String>,

    #[serde(default)]
    page: Option<u32>,

    #[serde(default, alias = "offset")]
    start_index: Option<u64>,
}
