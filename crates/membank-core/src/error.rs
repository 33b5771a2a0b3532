// ── Error Types ──

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MembankError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid document path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid frontmatter in {path}: {reason}")]
    InvalidFrontmatter { path: String, reason: String },

    #[error("backup failed for {path}: {source}")]
    Backup {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, MembankError>;
