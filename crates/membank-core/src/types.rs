// ── Types ──

use std::fmt;
use std::path::{Component, Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MembankError, Result};

/// Format version tag carried in the `schema` field of every structured document.
pub const SCHEMA_VERSION: &str = "memory_document_v2";

pub const MARKDOWN_EXTENSION: &str = "md";
pub const JSON_EXTENSION: &str = "json";

/// Classification tag controlling which converter and schema apply to a document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    BranchContext,
    ActiveContext,
    Progress,
    SystemPatterns,
    Generic,
}

impl DocumentType {
    pub const ALL: [DocumentType; 5] = [
        DocumentType::BranchContext,
        DocumentType::ActiveContext,
        DocumentType::Progress,
        DocumentType::SystemPatterns,
        DocumentType::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::BranchContext => "branch_context",
            DocumentType::ActiveContext => "active_context",
            DocumentType::Progress => "progress",
            DocumentType::SystemPatterns => "system_patterns",
            DocumentType::Generic => "generic",
        }
    }

    /// Resolve a type tag. Anything unrecognized is `Generic`.
    pub fn from_tag(tag: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == tag.trim())
            .unwrap_or(DocumentType::Generic)
    }

    /// Tag attached to documents of this type, if any.
    pub fn type_tag(&self) -> Option<&'static str> {
        match self {
            DocumentType::BranchContext => Some("branch-context"),
            DocumentType::ActiveContext => Some("active-context"),
            DocumentType::Progress => Some("progress"),
            DocumentType::SystemPatterns => Some("system-patterns"),
            DocumentType::Generic => None,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A document location relative to the root of a memory bank, always `/`-separated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentPath {
    value: String,
}

impl DocumentPath {
    /// Build a document path from a relative filesystem path.
    ///
    /// Absolute paths and `..` components are rejected so a document path can
    /// never escape the directory it was derived from.
    pub fn from_relative(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let mut parts = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => match part.to_str() {
                    Some(s) => parts.push(s.to_string()),
                    None => {
                        return Err(MembankError::InvalidPath {
                            path: display,
                            reason: "not valid UTF-8".to_string(),
                        })
                    }
                },
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(MembankError::InvalidPath {
                        path: display,
                        reason: "parent directory components are not allowed".to_string(),
                    })
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(MembankError::InvalidPath {
                        path: display,
                        reason: "must be relative".to_string(),
                    })
                }
            }
        }

        if parts.is_empty() {
            return Err(MembankError::InvalidPath {
                path: display,
                reason: "empty path".to_string(),
            });
        }

        Ok(Self {
            value: parts.join("/"),
        })
    }

    pub fn new(value: &str) -> Result<Self> {
        Self::from_relative(Path::new(value))
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Final path segment, e.g. `branchContext.md`.
    pub fn file_name(&self) -> &str {
        self.value.rsplit('/').next().unwrap_or(&self.value)
    }

    /// File name without its extension.
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(pos) => &name[..pos],
        }
    }

    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(pos) => Some(&name[pos + 1..]),
        }
    }

    /// Name of the directory containing the document, if it is not at the root.
    pub fn parent_name(&self) -> Option<&str> {
        let mut segments = self.value.rsplit('/');
        segments.next();
        segments.next()
    }

    pub fn is_markdown(&self) -> bool {
        self.extension() == Some(MARKDOWN_EXTENSION)
    }

    pub fn is_json(&self) -> bool {
        self.extension() == Some(JSON_EXTENSION)
    }

    /// Same path with the extension swapped (or appended when there is none).
    pub fn with_extension(&self, ext: &str) -> Self {
        let stem_len = self.value.len() - self.file_name().len() + self.file_stem().len();
        Self {
            value: format!("{}.{}", &self.value[..stem_len], ext),
        }
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A lower-case kebab tag, e.g. `branch-context`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Tag(pub String);

impl Tag {
    /// Normalize free text into a tag. Returns `None` when nothing usable remains.
    pub fn normalize(raw: &str) -> Option<Self> {
        let mut tag = String::new();
        for c in raw.trim().trim_start_matches('#').chars() {
            if c.is_ascii_alphanumeric() {
                tag.push(c.to_ascii_lowercase());
            } else if !tag.is_empty() && !tag.ends_with('-') {
                tag.push('-');
            }
        }
        let tag = tag.trim_end_matches('-').to_string();
        if tag.is_empty() {
            None
        } else {
            Some(Self(tag))
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity facet of a structured document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub id: String,
    pub title: String,
    pub document_type: DocumentType,
    pub path: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub last_modified: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub version: u32,
}

impl DocumentMetadata {
    /// Fresh metadata for a newly converted document.
    pub fn new(title: String, document_type: DocumentType, path: &DocumentPath, tags: Vec<Tag>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            document_type,
            path: path.value().to_string(),
            tags,
            last_modified: now,
            created_at: now,
            version: 1,
        }
    }
}

/// A structured memory bank document: `schema` + `metadata` + `content`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructuredDocument {
    pub schema: String,
    pub metadata: DocumentMetadata,
    pub content: serde_json::Value,
}

impl StructuredDocument {
    pub fn new(metadata: DocumentMetadata, content: serde_json::Value) -> Self {
        Self {
            schema: SCHEMA_VERSION.to_string(),
            metadata,
            content,
        }
    }

    pub fn document_type(&self) -> DocumentType {
        self.metadata.document_type
    }

    /// Pretty-printed JSON, newline terminated.
    pub fn to_pretty_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

// ── Tests ──
