pub mod error;
pub mod frontmatter;
pub mod migration;
pub mod types;

pub use error::{MembankError, Result};
pub use migration::{MigrationFailure, MigrationOptions, MigrationResult, MigrationStats};
pub use types::{
    DocumentMetadata, DocumentPath, DocumentType, StructuredDocument, Tag, JSON_EXTENSION,
    MARKDOWN_EXTENSION, SCHEMA_VERSION,
};
