//! Builders for on-disk index fixtures.
//!
//! Stands in for the external ingestion step so tests can open real SQLite
//! files through `open_index`.

use rusqlite::{params, Connection};
use std::path::Path;

use crate::index::INDEX_FILE_NAME;

/// One row of the `passages` table.
pub(crate) struct FixtureRow {
    text: String,
    embedding: Vec<f32>,
    metadata: Option<String>,
    raw_blob: Option<Vec<u8>>,
}

impl FixtureRow {
    pub(crate) fn new(text: &str, embedding: Vec<f32>) -> Self {
        Self {
            text: text.to_string(),
            embedding,
            metadata: None,
            raw_blob: None,
        }
    }

    pub(crate) fn metadata(mut self, json: &str) -> Self {
        self.metadata = Some(json.to_string());
        self
    }

    /// Store these bytes instead of the encoded embedding.
    pub(crate) fn raw_blob(mut self, bytes: Vec<u8>) -> Self {
        self.raw_blob = Some(bytes);
        self
    }
}

/// Create `<dir>/index.sqlite` holding `rows`.
///
/// When `model` is given, `index_info` records it together with the first
/// row's vector length.
pub(crate) fn write_index(dir: &Path, model: Option<&str>, rows: &[FixtureRow]) {
    std::fs::create_dir_all(dir).unwrap();
    let conn = Connection::open(dir.join(INDEX_FILE_NAME)).unwrap();

    conn.execute_batch(
        r#"
        CREATE TABLE passages (
            id INTEGER PRIMARY KEY,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            metadata TEXT
        );

        CREATE TABLE index_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )
    .unwrap();

    if let Some(model) = model {
        conn.execute(
            "INSERT INTO index_info (key, value) VALUES ('embedding_model', ?1)",
            params![model],
        )
        .unwrap();

        if let Some(first) = rows.first() {
            conn.execute(
                "INSERT INTO index_info (key, value) VALUES ('dimensions', ?1)",
                params![first.embedding.len().to_string()],
            )
            .unwrap();
        }
    }

    for row in rows {
        let blob = row.raw_blob.clone().unwrap_or_else(|| {
            row.embedding
                .iter()
                .flat_map(|v| v.to_le_bytes())
                .collect::<Vec<u8>>()
        });

        conn.execute(
            "INSERT INTO passages (text, embedding, metadata) VALUES (?1, ?2, ?3)",
            params![row.text, blob, row.metadata],
        )
        .unwrap();
    }
}
