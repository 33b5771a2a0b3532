use anyhow::Result;
use membank_core::{DocumentPath, DocumentType, StructuredDocument};
use serde::Serialize;

use crate::markdown::Outline;
use crate::registry::Converter;

const CURRENT_WORK: &[&str] = &["Current Work", "Current Focus", "現在の作業"];
const RECENT_CHANGES: &[&str] = &["Recent Changes", "最近の変更", "最近の変更点"];
const ACTIVE_DECISIONS: &[&str] = &["Active Decisions", "アクティブな決定事項"];
const CONSIDERATIONS: &[&str] = &["Considerations", "Active Considerations", "検討事項"];
const NEXT_STEPS: &[&str] = &["Next Steps", "次のステップ"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveContextContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    current_work: Option<String>,
    recent_changes: Vec<String>,
    active_decisions: Vec<String>,
    considerations: Vec<String>,
    next_steps: Vec<String>,
}

/// `activeContext.md`: what is being worked on right now.
pub struct ActiveContextConverter;

impl Converter for ActiveContextConverter {
    fn convert(&self, markdown: &str, path: &DocumentPath) -> Result<StructuredDocument> {
        super::convert_with(
            markdown,
            path,
            DocumentType::ActiveContext,
            |outline: &Outline, _: &DocumentPath| ActiveContextContent {
                current_work: outline.section_text(CURRENT_WORK),
                recent_changes: outline.section_items(RECENT_CHANGES),
                active_decisions: outline.section_items(ACTIVE_DECISIONS),
                considerations: outline.section_items(CONSIDERATIONS),
                next_steps: outline.section_items(NEXT_STEPS),
            },
        )
    }
}
