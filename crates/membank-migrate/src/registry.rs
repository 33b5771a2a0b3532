// ── Converter Registry ──

use std::collections::HashMap;
use std::sync::Arc;

use membank_core::{DocumentPath, DocumentType, StructuredDocument};

use crate::converters::{
    ActiveContextConverter, BranchContextConverter, GenericConverter, ProgressConverter,
    SystemPatternsConverter,
};
use crate::error::{MigrationError, Result};

// ── Types ──

/// Turns the text of one legacy Markdown document into a structured document.
///
/// Implementations must not touch the filesystem; an `Err` is recorded as a
/// per-file failure by the migrator.
pub trait Converter: Send + Sync {
    fn convert(&self, markdown: &str, path: &DocumentPath) -> anyhow::Result<StructuredDocument>;
}

/// Maps each document type to its converter, with `Generic` as the fallback.
#[derive(Clone)]
pub struct ConverterRegistry {
    converters: HashMap<DocumentType, Arc<dyn Converter>>,
}

// ── Public API ──

impl ConverterRegistry {
    /// A registry with no converters at all, not even the generic fallback.
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Register or replace the converter for `document_type`.
    pub fn register_converter(&mut self, document_type: DocumentType, converter: Arc<dyn Converter>) {
        if self.converters.insert(document_type, converter).is_some() {
            log::debug!("replaced converter for {}", document_type);
        }
    }

    pub fn remove_converter(&mut self, document_type: DocumentType) -> Option<Arc<dyn Converter>> {
        self.converters.remove(&document_type)
    }

    pub fn has_converter(&self, document_type: DocumentType) -> bool {
        self.converters.contains_key(&document_type)
    }

    /// Resolve the converter for `document_type`, falling back to the generic one.
    pub fn get_converter(&self, document_type: DocumentType) -> Result<Arc<dyn Converter>> {
        if let Some(converter) = self.converters.get(&document_type) {
            return Ok(Arc::clone(converter));
        }

        log::debug!("no converter for {}, using generic", document_type);
        self.converters
            .get(&DocumentType::Generic)
            .cloned()
            .ok_or(MigrationError::MissingConverter {
                requested: document_type,
            })
    }
}

impl Default for ConverterRegistry {
    /// One converter per known document type, plus the generic fallback.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register_converter(DocumentType::BranchContext, Arc::new(BranchContextConverter));
        registry.register_converter(DocumentType::ActiveContext, Arc::new(ActiveContextConverter));
        registry.register_converter(DocumentType::Progress, Arc::new(ProgressConverter));
        registry.register_converter(DocumentType::SystemPatterns, Arc::new(SystemPatternsConverter));
        registry.register_converter(DocumentType::Generic, Arc::new(GenericConverter));
        registry
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use membank_core::DocumentMetadata;

    struct FixedTitle(&'static str);

    impl Converter for FixedTitle {
        fn convert(&self, _markdown: &str, path: &DocumentPath) -> anyhow::Result<StructuredDocument> {
            let meta = DocumentMetadata::new(
                self.0.to_string(),
                DocumentType::Generic,
                &path.with_extension("json"),
                Vec::new(),
            );
            Ok(StructuredDocument::new(meta, serde_json::json!({})))
        }
    }

    fn convert_title(registry: &ConverterRegistry, doc_type: DocumentType) -> String {
        let path = DocumentPath::new("notes.md").unwrap();
        registry
            .get_converter(doc_type)
            .unwrap()
            .convert("# Heading\n", &path)
            .unwrap()
            .metadata
            .title
    }

    #[test]
    fn test_defaults_cover_every_type() {
        let registry = ConverterRegistry::default();
        for doc_type in DocumentType::ALL {
            assert!(registry.has_converter(doc_type), "missing {doc_type}");
        }
    }

    #[test]
    fn test_unregistered_type_falls_back_to_generic() {
        let mut registry = ConverterRegistry::empty();
        registry.register_converter(DocumentType::Generic, Arc::new(FixedTitle("generic")));
        assert_eq!(convert_title(&registry, DocumentType::Progress), "generic");
    }

    #[test]
    fn test_register_overrides_existing() {
        let mut registry = ConverterRegistry::default();
        registry.register_converter(DocumentType::Progress, Arc::new(FixedTitle("custom")));
        assert_eq!(convert_title(&registry, DocumentType::Progress), "custom");
        assert_eq!(convert_title(&registry, DocumentType::Generic), "Heading");
    }

    #[test]
    fn test_missing_generic_is_an_error() {
        let mut registry = ConverterRegistry::default();
        registry.remove_converter(DocumentType::Generic);
        registry.remove_converter(DocumentType::Progress);

        let err = registry.get_converter(DocumentType::Progress).err().unwrap();
        assert!(matches!(
            err,
            MigrationError::MissingConverter { requested: DocumentType::Progress }
        ));
        assert!(registry.get_converter(DocumentType::ActiveContext).is_ok());
    }
}
