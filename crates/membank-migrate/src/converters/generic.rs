use anyhow::Result;
use membank_core::{DocumentPath, DocumentType, StructuredDocument};
use serde::Serialize;

use crate::markdown::Outline;
use crate::registry::Converter;

#[derive(Debug, Serialize)]
struct GenericContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<String>,
    sections: Vec<GenericSection>,
}

#[derive(Debug, Serialize)]
struct GenericSection {
    title: String,
    content: String,
}

/// Fallback for anything that is not a recognized memory bank document.
/// Keeps the text, split by `## ` headings.
pub struct GenericConverter;

impl Converter for GenericConverter {
    fn convert(&self, markdown: &str, path: &DocumentPath) -> Result<StructuredDocument> {
        super::convert_with(markdown, path, DocumentType::Generic, build)
    }
}

fn build(outline: &Outline, _path: &DocumentPath) -> GenericContent {
    GenericContent {
        body: Some(outline.preamble.clone()).filter(|b| !b.is_empty()),
        sections: outline
            .sections
            .iter()
            .map(|s| GenericSection {
                title: s.heading.clone(),
                content: s.body.clone(),
            })
            .collect(),
    }
}
