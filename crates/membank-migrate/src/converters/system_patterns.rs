use anyhow::Result;
use membank_core::{DocumentPath, DocumentType, StructuredDocument};
use serde::Serialize;

use crate::markdown::{self, Outline, Section};
use crate::registry::Converter;

const TECHNICAL_DECISIONS: &[&str] = &["Technical Decisions", "技術的決定事項"];
const CONTEXT: &[&str] = &["Context", "背景", "コンテキスト"];
const DECISION: &[&str] = &["Decision", "決定", "決定事項"];
const CONSEQUENCES: &[&str] = &["Consequences", "影響"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SystemPatternsContent {
    technical_decisions: Vec<TechnicalDecision>,
}

#[derive(Debug, Serialize)]
struct TechnicalDecision {
    title: String,
    context: String,
    decision: String,
    consequences: Vec<String>,
}

/// `systemPatterns.md`: architecture decisions, one `### ` block each.
///
/// A decision block may split itself with `#### Context`, `#### Decision` and
/// `#### Consequences`; a block without those headings is taken as the
/// decision text verbatim.
pub struct SystemPatternsConverter;

impl Converter for SystemPatternsConverter {
    fn convert(&self, markdown: &str, path: &DocumentPath) -> Result<StructuredDocument> {
        super::convert_with(markdown, path, DocumentType::SystemPatterns, build)
    }
}

fn build(outline: &Outline, _path: &DocumentPath) -> SystemPatternsContent {
    let technical_decisions = outline
        .section(TECHNICAL_DECISIONS)
        .map(|s| markdown::subsections(&s.body, 3))
        .unwrap_or_default()
        .into_iter()
        .map(decision_from_section)
        .collect();

    SystemPatternsContent { technical_decisions }
}

fn decision_from_section(section: Section) -> TechnicalDecision {
    let parts = markdown::subsections(&section.body, 4);
    if parts.is_empty() {
        return TechnicalDecision {
            title: section.heading,
            context: String::new(),
            decision: section.body,
            consequences: Vec::new(),
        };
    }

    let part = |aliases: &[&str]| markdown::find_section(&parts, aliases).map(|p| p.body.clone());

    TechnicalDecision {
        title: section.heading,
        context: part(CONTEXT).unwrap_or_default(),
        decision: part(DECISION).unwrap_or_default(),
        consequences: markdown::find_section(&parts, CONSEQUENCES)
            .map(|p| markdown::list_items(&p.body).into_iter().map(|i| i.text).collect())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_system_patterns() {
        let path = DocumentPath::new("systemPatterns.md").unwrap();
        let markdown = "\
# System Patterns

## Technical Decisions

### Store documents as JSON

#### Context

Markdown was hard to query.

#### Decision

Migrate every note to a versioned JSON envelope.

#### Consequences

- Schema validation is possible
- Old tooling breaks

### Use walkdir

Recursive enumeration without hand-rolled recursion.
";
        let doc = SystemPatternsConverter.convert(markdown, &path).unwrap();
        let decisions = doc.content["technicalDecisions"].as_array().unwrap();
        assert_eq!(decisions.len(), 2);

        assert_eq!(decisions[0]["title"], "Store documents as JSON");
        assert_eq!(decisions[0]["context"], "Markdown was hard to query.");
        assert_eq!(
            decisions[0]["decision"],
            "Migrate every note to a versioned JSON envelope."
        );
        assert_eq!(
            decisions[0]["consequences"],
            serde_json::json!(["Schema validation is possible", "Old tooling breaks"])
        );

        assert_eq!(decisions[1]["title"], "Use walkdir");
        assert_eq!(
            decisions[1]["decision"],
            "Recursive enumeration without hand-rolled recursion."
        );
        assert_eq!(decisions[1]["context"], "");
    }

    #[test]
    fn test_no_decisions_section() {
        let path = DocumentPath::new("systemPatterns.md").unwrap();
        let doc = SystemPatternsConverter
            .convert("# System Patterns\n\nNothing yet.\n", &path)
            .unwrap();
        assert_eq!(doc.content["technicalDecisions"], serde_json::json!([]));
    }
}
