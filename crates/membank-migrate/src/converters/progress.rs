use anyhow::Result;
use membank_core::{DocumentPath, DocumentType, StructuredDocument};
use serde::Serialize;

use crate::markdown::Outline;
use crate::registry::Converter;

const STATUS: &[&str] = &["Status", "Current Status", "現在の状態"];
const WORKING_FEATURES: &[&str] = &["Working Features", "What Works", "動作している機能"];
const PENDING: &[&str] = &["Pending Implementation", "What's Left", "未実装の機能"];
const KNOWN_ISSUES: &[&str] = &["Known Issues", "既知の問題"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    working_features: Vec<String>,
    pending_implementation: Vec<String>,
    known_issues: Vec<String>,
}

pub struct ProgressConverter;

impl Converter for ProgressConverter {
    fn convert(&self, markdown: &str, path: &DocumentPath) -> Result<StructuredDocument> {
        super::convert_with(markdown, path, DocumentType::Progress, build)
    }
}

fn build(outline: &Outline, _path: &DocumentPath) -> ProgressContent {
    ProgressContent {
        status: outline.section_text(STATUS),
        working_features: outline.section_items(WORKING_FEATURES),
        pending_implementation: outline.section_items(PENDING),
        known_issues: outline.section_items(KNOWN_ISSUES),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_progress() {
        let path = DocumentPath::new("progress.md").unwrap();
        let markdown = "\
# Progress

## Status

Beta.

## What Works

- Markdown import
- [x] Backups

## Pending Implementation

- Parallel conversion

## Known Issues
";
        let doc = ProgressConverter.convert(markdown, &path).unwrap();
        assert_eq!(doc.metadata.document_type, DocumentType::Progress);
        assert_eq!(doc.content["status"], "Beta.");
        assert_eq!(
            doc.content["workingFeatures"],
            serde_json::json!(["Markdown import", "Backups"])
        );
        assert_eq!(doc.content["pendingImplementation"], serde_json::json!(["Parallel conversion"]));
        assert_eq!(doc.content["knownIssues"], serde_json::json!([]));
    }
}
