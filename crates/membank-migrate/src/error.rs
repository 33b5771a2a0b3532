// ── Error Types ──

use membank_core::{DocumentType, MembankError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid document path: {0}")]
    Path(#[source] MembankError),

    #[error("{document_type} conversion failed for {path}: {reason}")]
    Conversion {
        path: String,
        document_type: DocumentType,
        reason: String,
    },

    #[error("schema validation failed for {path}: {}", errors.join("; "))]
    Validation { path: String, errors: Vec<String> },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: MembankError,
    },

    #[error("converter panicked while migrating {path}: {message}")]
    Panicked { path: String, message: String },

    #[error("no converter registered for {requested} and no generic fallback")]
    MissingConverter { requested: DocumentType },

    #[error("schema error: {0}")]
    Schema(String),
}

pub type Result<T> = std::result::Result<T, MigrationError>;
