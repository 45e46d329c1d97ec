//! Read-only accessor for the persisted similarity index.
//!
//! Layout of `<index_dir>/index.sqlite`, produced by the ingestion step:
//!
//! ```text
//! passages(id INTEGER PRIMARY KEY, text TEXT NOT NULL, embedding BLOB NOT NULL, metadata TEXT)
//! index_info(key TEXT PRIMARY KEY, value TEXT NOT NULL)   -- embedding_model, dimensions
//! ```
//!
//! Embeddings are little-endian `f32` arrays. This module never writes to
//! the file.

use crate::embeddings::EmbeddingProvider;
use crate::retriever::Retriever;
use crate::types::Passage;
use mutuo_core::{AppError, AppResult};
use rusqlite::{Connection, OpenFlags};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File name of the SQLite database inside the index directory.
pub const INDEX_FILE_NAME: &str = "index.sqlite";

struct IndexEntry {
    passage: Passage,
    embedding: Vec<f32>,
}

/// An opened, immutable similarity index.
///
/// All rows are loaded into memory when the index is opened; afterwards the
/// handle is shared read-only and needs no locking.
pub struct Index {
    path: PathBuf,
    entries: Vec<IndexEntry>,
    dimensions: Option<usize>,
    embedding_model: Option<String>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("path", &self.path)
            .field("passages", &self.entries.len())
            .field("dimensions", &self.dimensions)
            .field("embedding_model", &self.embedding_model)
            .field("top_k", &self.top_k)
            .finish()
    }
}

/// Open a previously persisted index directory.
///
/// The index content is trusted: it is assumed to be produced by this
/// system's own ingestion step, so vectors and metadata are decoded without
/// any authenticity check. Only structural problems (truncated vectors,
/// inconsistent dimensions, malformed metadata JSON) are rejected. Do not
/// point this at files received from third parties.
///
/// No network access happens here; `embedder` is only used by
/// [`Retriever::retrieve`].
///
/// # Errors
/// * `AppError::IndexNotFound` - the directory or its database file is missing
/// * `AppError::Knowledge` - the database cannot be read or decoded
pub fn open_index(
    path: &Path,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
) -> AppResult<Index> {
    if !path.is_dir() {
        return Err(AppError::IndexNotFound(path.to_path_buf()));
    }

    let db_path = path.join(INDEX_FILE_NAME);
    if !db_path.is_file() {
        return Err(AppError::IndexNotFound(path.to_path_buf()));
    }

    let conn = Connection::open_with_flags(
        &db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to open index {:?}: {}", db_path, e)))?;

    let info = read_index_info(&conn)?;
    let declared_dimensions = match info.get("dimensions") {
        Some(raw) => Some(raw.parse::<usize>().map_err(|e| {
            AppError::Knowledge(format!("Invalid dimensions in index_info: {} ({})", raw, e))
        })?),
        None => None,
    };
    let embedding_model = info.get("embedding_model").cloned();

    let entries = load_entries(&conn)?;
    let dimensions = check_dimensions(&entries, declared_dimensions)?;

    if let Some(ref model) = embedding_model {
        if model != embedder.model_name() {
            tracing::warn!(
                "Index was built with embedding model '{}' but questions use '{}'",
                model,
                embedder.model_name()
            );
        }
    }

    tracing::info!(
        "Opened index at {:?}: {} passages, dimensions {:?}",
        path,
        entries.len(),
        dimensions
    );

    Ok(Index {
        path: path.to_path_buf(),
        entries,
        dimensions,
        embedding_model,
        embedder,
        top_k: top_k.max(1),
    })
}

fn read_index_info(conn: &Connection) -> AppResult<HashMap<String, String>> {
    let mut stmt = conn
        .prepare("SELECT key, value FROM index_info")
        .map_err(|e| AppError::Knowledge(format!("Failed to read index_info: {}", e)))?;

    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(|e| AppError::Knowledge(format!("Failed to read index_info: {}", e)))?;

    rows.collect::<Result<HashMap<_, _>, _>>()
        .map_err(|e| AppError::Knowledge(format!("Failed to read index_info row: {}", e)))
}

fn load_entries(conn: &Connection) -> AppResult<Vec<IndexEntry>> {
    let mut stmt = conn
        .prepare("SELECT id, text, embedding, metadata FROM passages ORDER BY id")
        .map_err(|e| AppError::Knowledge(format!("Failed to prepare passage query: {}", e)))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Vec<u8>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to query passages: {}", e)))?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, text, blob, metadata) =
            row.map_err(|e| AppError::Knowledge(format!("Failed to read passage: {}", e)))?;

        let embedding = bytes_to_embedding(&blob)
            .map_err(|e| AppError::Knowledge(format!("Passage {}: {}", id, e)))?;
        let passage = Passage::from_stored(text, metadata.as_deref())
            .map_err(|e| AppError::Knowledge(format!("Passage {}: {}", id, e)))?;

        entries.push(IndexEntry { passage, embedding });
    }

    Ok(entries)
}

/// Every vector must share one length, matching `index_info` when declared.
fn check_dimensions(entries: &[IndexEntry], declared: Option<usize>) -> AppResult<Option<usize>> {
    let expected = declared.or_else(|| entries.first().map(|e| e.embedding.len()));

    if let Some(dim) = expected {
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dim) {
            return Err(AppError::Knowledge(format!(
                "Inconsistent embedding dimensions: expected {}, found {}",
                dim,
                bad.embedding.len()
            )));
        }
    }

    Ok(expected)
}

impl Index {
    /// Directory the index was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored passages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no passages.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Score every passage against `query` and keep the best `k`.
    ///
    /// Ordered by descending cosine similarity; ties keep storage order. A
    /// stored vector that scores NaN ranks last.
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(Passage, f32)>> {
        if let Some(dim) = self.dimensions {
            if query.len() != dim {
                return Err(AppError::Retrieval(format!(
                    "Question embedding has {} dimensions, index expects {}",
                    query.len(),
                    dim
                )));
            }
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let score = cosine_similarity(query, &entry.embedding);
                (i, if score.is_nan() { f32::NEG_INFINITY } else { score })
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        tracing::debug!(
            "Scored {} passages, kept {} (requested top-{})",
            self.entries.len(),
            scored.len(),
            k
        );

        Ok(scored
            .into_iter()
            .map(|(i, score)| (self.entries[i].passage.clone(), score))
            .collect())
    }
}

#[async_trait::async_trait]
impl Retriever for Index {
    async fn retrieve(&self, question: &str) -> AppResult<Vec<Passage>> {
        let query = self.embedder.embed(question).await.map_err(|e| match e {
            AppError::Retrieval(_) => e,
            other => AppError::Retrieval(other.to_string()),
        })?;

        let results = self.search(&query, self.top_k)?;

        if let Some((_, best)) = results.first() {
            tracing::info!("Retrieved {} passages (top score: {:.3})", results.len(), best);
        } else {
            tracing::info!("Retrieved no passages");
        }

        Ok(results.into_iter().map(|(passage, _)| passage).collect())
    }
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(format!(
            "Invalid embedding bytes length {}",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
