// ── Structural Converters ──
//
// One converter per document type. They share the preparation step: split off
// legacy frontmatter, outline the Markdown body, and derive the metadata
// (title, tags, JSON path). Each converter then maps named sections onto its
// typed content.

mod active_context;
mod branch_context;
mod generic;
mod progress;
mod system_patterns;

pub use active_context::ActiveContextConverter;
pub use branch_context::BranchContextConverter;
pub use generic::GenericConverter;
pub use progress::ProgressConverter;
pub use system_patterns::SystemPatternsConverter;

use anyhow::{Context, Result};
use membank_core::{
    frontmatter, DocumentMetadata, DocumentPath, DocumentType, StructuredDocument, Tag,
    JSON_EXTENSION,
};
use serde::Serialize;

use crate::markdown::{self, Outline};

/// Parse the document and assemble the structured result around `content`.
fn convert_with<C, F>(
    text: &str,
    path: &DocumentPath,
    document_type: DocumentType,
    build: F,
) -> Result<StructuredDocument>
where
    C: Serialize,
    F: FnOnce(&Outline, &DocumentPath) -> C,
{
    let legacy = frontmatter::parse(text, path.value())?;
    let outline = markdown::parse_outline(legacy.body);
    let fm = legacy.frontmatter.unwrap_or_default();

    let title = fm
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| outline.title.clone().filter(|t| !t.is_empty()))
        .unwrap_or_else(|| path.file_stem().to_string());

    let raw_tags = fm
        .tags
        .into_iter()
        .chain(markdown::tag_line(&outline.preamble))
        .chain(document_type.type_tag().map(String::from));
    let tags = collect_tags(raw_tags);

    let content = serde_json::to_value(build(&outline, path))
        .with_context(|| format!("serializing {} content", document_type))?;

    let metadata = DocumentMetadata::new(
        title,
        document_type,
        &path.with_extension(JSON_EXTENSION),
        tags,
    );
    Ok(StructuredDocument::new(metadata, content))
}

/// Normalize and de-duplicate tags, keeping first occurrence order.
fn collect_tags(raw: impl IntoIterator<Item = String>) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    for tag in raw.into_iter().filter_map(|t| Tag::normalize(&t)) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}
