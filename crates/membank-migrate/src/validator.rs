// ── Schema Validation ──
//
// Two-phase gate over a candidate document:
//   1. the envelope schema (`schema` / `metadata` / `content`), short-circuiting on failure
//   2. the schema for the document's type; types without one get the envelope again
// Schemas are Draft 7, embedded at compile time and compiled once.

use std::collections::HashMap;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema};
use membank_core::{DocumentType, StructuredDocument};
use serde::Serialize;
use serde_json::Value;

use crate::error::{MigrationError, Result};

const BASE_SCHEMA: &str = include_str!("../schemas/v2/base.schema.json");
const TYPED_SCHEMAS: &[(DocumentType, &str)] = &[
    (
        DocumentType::BranchContext,
        include_str!("../schemas/v2/branch_context.schema.json"),
    ),
    (
        DocumentType::ActiveContext,
        include_str!("../schemas/v2/active_context.schema.json"),
    ),
    (
        DocumentType::Progress,
        include_str!("../schemas/v2/progress.schema.json"),
    ),
    (
        DocumentType::SystemPatterns,
        include_str!("../schemas/v2/system_patterns.schema.json"),
    ),
];

// ── Types ──

/// Outcome of validating one document. Each error reads `<dotted.path>: <message>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn valid() -> Self {
        Self {
            success: true,
            errors: Vec::new(),
        }
    }

    fn invalid(errors: Vec<String>) -> Self {
        Self {
            success: false,
            errors,
        }
    }
}

pub struct SchemaValidator {
    base: JSONSchema,
    typed: HashMap<DocumentType, JSONSchema>,
}

// ── Public API ──

impl SchemaValidator {
    /// Compile the embedded schemas.
    pub fn new() -> Result<Self> {
        let base = compile("base", BASE_SCHEMA)?;
        let mut typed = HashMap::new();
        for (document_type, source) in TYPED_SCHEMAS {
            typed.insert(*document_type, compile(document_type.as_str(), source)?);
        }
        Ok(Self { base, typed })
    }

    /// Validate a candidate JSON value as a document of `document_type`.
    pub fn validate_json(&self, candidate: &Value, document_type: DocumentType) -> ValidationResult {
        let base_errors = collect_errors(&self.base, candidate);
        if !base_errors.is_empty() {
            return ValidationResult::invalid(base_errors);
        }

        let schema = self.typed.get(&document_type).unwrap_or(&self.base);
        let errors = collect_errors(schema, candidate);
        if errors.is_empty() {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid(errors)
        }
    }

    /// Validate a structured document as a document of `document_type`.
    pub fn validate_document(
        &self,
        doc: &StructuredDocument,
        document_type: DocumentType,
    ) -> ValidationResult {
        match serde_json::to_value(doc) {
            Ok(value) => self.validate_json(&value, document_type),
            Err(e) => ValidationResult::invalid(vec![format!("unexpected validation error: {e}")]),
        }
    }

    pub fn has_typed_schema(&self, document_type: DocumentType) -> bool {
        self.typed.contains_key(&document_type)
    }
}

// ── Helpers ──

fn compile(name: &str, source: &str) -> Result<JSONSchema> {
    let value: Value = serde_json::from_str(source)
        .map_err(|e| MigrationError::Schema(format!("{name} schema is not valid JSON: {e}")))?;
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&value)
        .map_err(|e| MigrationError::Schema(format!("failed to compile {name} schema: {e}")))
}

fn collect_errors(schema: &JSONSchema, candidate: &Value) -> Vec<String> {
    match schema.validate(candidate) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|e| {
                let mut segments: Vec<String> = e
                    .instance_path
                    .to_string()
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
                // Report a missing property at its own path, not at its parent.
                if let ValidationErrorKind::Required { property } = &e.kind {
                    match property.as_str() {
                        Some(name) => segments.push(name.to_string()),
                        None => segments.push(property.to_string()),
                    }
                }
                let path = if segments.is_empty() {
                    "(root)".to_string()
                } else {
                    segments.join(".")
                };
                format!("{path}: {e}")
            })
            .collect(),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ConverterRegistry;
    use membank_core::DocumentPath;
    use serde_json::json;

    fn converted(doc_type: DocumentType, name: &str, markdown: &str) -> Value {
        let path = DocumentPath::new(name).unwrap();
        let doc = ConverterRegistry::default()
            .get_converter(doc_type)
            .unwrap()
            .convert(markdown, &path)
            .unwrap();
        serde_json::to_value(doc).unwrap()
    }

    #[test]
    fn test_every_typed_schema_compiles() {
        let validator = SchemaValidator::new().unwrap();
        for doc_type in DocumentType::ALL {
            assert_eq!(
                validator.has_typed_schema(doc_type),
                doc_type != DocumentType::Generic
            );
        }
    }

    #[test]
    fn test_converted_documents_are_valid() {
        let validator = SchemaValidator::new().unwrap();
        let cases = [
            (DocumentType::BranchContext, "branchContext.md", "# Branch Context\n\n## Purpose\n\nX\n"),
            (DocumentType::ActiveContext, "activeContext.md", "# Active Context\n"),
            (DocumentType::Progress, "progress.md", "# Progress\n\n## Known Issues\n\n- slow\n"),
            (DocumentType::SystemPatterns, "systemPatterns.md", "# System Patterns\n"),
            (DocumentType::Generic, "notes.md", "just text"),
        ];
        for (doc_type, name, markdown) in cases {
            let value = converted(doc_type, name, markdown);
            let result = validator.validate_json(&value, doc_type);
            assert!(result.success, "{name}: {:?}", result.errors);
            assert!(result.errors.is_empty());
        }
    }

    #[test]
    fn test_envelope_failure_short_circuits() {
        let validator = SchemaValidator::new().unwrap();
        let result = validator.validate_json(&json!({ "schema": "memory_document_v2" }), DocumentType::Progress);
        assert!(!result.success);
        assert!(result.errors.iter().any(|e| e.starts_with("metadata: ")));
        assert!(result.errors.iter().any(|e| e.starts_with("content: ")));
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_typed_violations_use_dotted_paths() {
        let validator = SchemaValidator::new().unwrap();
        let mut value = converted(
            DocumentType::BranchContext,
            "branchContext.md",
            "# Branch Context\n\n## User Stories\n\n- [ ] one\n",
        );
        value["content"]["userStories"][0]["completed"] = json!("yes");
        value["content"].as_object_mut().unwrap().remove("purpose");

        let result = validator.validate_json(&value, DocumentType::BranchContext);
        assert!(!result.success);
        assert!(result
            .errors
            .iter()
            .any(|e| e.starts_with("content.userStories.0.completed: ")));
        assert!(result.errors.iter().any(|e| e.starts_with("content.purpose: ")));
    }

    #[test]
    fn test_document_type_must_match_schema() {
        let validator = SchemaValidator::new().unwrap();
        let value = converted(DocumentType::Generic, "notes.md", "# Notes\n");
        let result = validator.validate_json(&value, DocumentType::Progress);
        assert!(!result.success);
        assert!(result
            .errors
            .iter()
            .any(|e| e.starts_with("metadata.documentType: ")));
    }

    #[test]
    fn test_bad_tag_fails_envelope() {
        let validator = SchemaValidator::new().unwrap();
        let mut value = converted(DocumentType::Generic, "notes.md", "# Notes\n");
        value["metadata"]["tags"] = json!(["Not A Tag"]);
        let result = validator.validate_json(&value, DocumentType::Generic);
        assert!(!result.success);
        assert!(result.errors[0].starts_with("metadata.tags.0: "));
    }
}
