//! Error types for the Mutuo service.
//!
//! A single error enum covers startup failures (missing credential, missing
//! index), per-request failures (retrieval, generation) and the ambient
//! categories (configuration, I/O, serialization).

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for the Mutuo service.
///
/// Every variant is rendered verbatim to the end user; none of them is
/// log-only.
#[derive(Error, Debug)]
pub enum AppError {
    /// The provider credential is absent or empty.
    #[error("La variabile {0} non è stata caricata correttamente.")]
    MissingCredential(String),

    /// The persisted similarity index does not exist.
    #[error(
        "Il vector DB non è stato trovato in {}. Esegui prima l'ingestione dei documenti.",
        .0.display()
    )]
    IndexNotFound(PathBuf),

    /// The remote text-generation call failed.
    #[error("Errore nella generazione della risposta: {0}")]
    Generation(String),

    /// Retrieval (question embedding or scoring) failed.
    #[error("Errore nel recupero dei documenti: {0}")]
    Retrieval(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Index content and knowledge errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
