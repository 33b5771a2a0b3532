pub mod backup;
pub mod bank;
pub mod config;
pub mod file;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use membank_core::StructuredDocument;
use serde::Serialize;

pub use backup::BackupManager;
pub use config::{load_config, MembankConfig};

// ── Types ──

/// Summary of a structured document for listing (without content).
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    pub document_type: String,
    pub tags: Vec<String>,
    pub relative_path: String,
}

/// Handle to a memory bank directory on disk.
#[derive(Debug, Clone)]
pub struct MemoryBank {
    pub root: PathBuf,
}

// ── Public API ──

impl MemoryBank {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Initialize the memory bank directory structure.
    pub fn init(&self) -> Result<()> {
        bank::init(&self.root)
            .with_context(|| format!("initializing memory bank: {}", self.root.display()))
    }

    /// Check if the memory bank has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.root.join(bank::CONFIG_FILE).exists()
    }

    pub fn config(&self) -> Result<MembankConfig> {
        load_config(&self.root)
    }

    /// Directory holding the documents of a (namespaced) branch.
    pub fn branch_path(&self, branch: &str) -> PathBuf {
        self.root
            .join(bank::BRANCH_DIR)
            .join(bank::branch_dir_name(branch))
    }

    pub fn global_path(&self) -> PathBuf {
        self.root.join(bank::GLOBAL_DIR)
    }

    /// Read a structured document from a JSON file.
    pub fn read_document(&self, path: &Path) -> Result<StructuredDocument> {
        file::read_document(path).with_context(|| format!("reading document: {}", path.display()))
    }

    /// List document summaries for every parseable JSON document under `dir`.
    pub fn list_documents(&self, dir: &Path) -> Result<Vec<DocumentSummary>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let files = bank::walk_json_files(dir)
            .with_context(|| format!("listing documents: {}", dir.display()))?;

        let mut summaries = Vec::new();
        for path in files {
            let doc = match file::read_document(&path) {
                Ok(d) => d,
                Err(e) => {
                    log::warn!("skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            let relative_path = path
                .strip_prefix(&self.root)
                .unwrap_or(&path)
                .to_string_lossy()
                .to_string();

            summaries.push(DocumentSummary {
                id: doc.metadata.id,
                title: doc.metadata.title,
                document_type: doc.metadata.document_type.to_string(),
                tags: doc.metadata.tags.iter().map(|t| t.0.clone()).collect(),
                relative_path,
            });
        }

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use membank_core::{DocumentMetadata, DocumentPath, DocumentType, Tag};

    fn write_sample(bank: &MemoryBank, dir: &Path, name: &str, doc_type: DocumentType) {
        let path = DocumentPath::new(name).unwrap();
        let meta = DocumentMetadata::new(
            name.to_string(),
            doc_type,
            &path,
            vec![Tag("sample".to_string())],
        );
        let doc = StructuredDocument::new(meta, serde_json::json!({}));
        file::write_document(&dir.join(name), &doc).unwrap();
        assert!(bank.is_initialized());
    }

    #[test]
    fn test_init_and_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let bank = MemoryBank::new(tmp.path().join("docs"));
        bank.init().unwrap();

        assert!(bank.is_initialized());
        assert!(bank.global_path().is_dir());
        assert_eq!(
            bank.branch_path("feature/login"),
            bank.root.join("branch-memory-bank/feature-login")
        );
        assert!(bank.config().unwrap().migration.validate_json);
    }

    #[test]
    fn test_list_documents() {
        let tmp = tempfile::tempdir().unwrap();
        let bank = MemoryBank::new(tmp.path().join("docs"));
        bank.init().unwrap();

        let branch = bank.branch_path("feature/login");
        write_sample(&bank, &branch, "branchContext.json", DocumentType::BranchContext);
        write_sample(&bank, &branch, "progress.json", DocumentType::Progress);
        std::fs::write(branch.join("broken.json"), "nope").unwrap();

        let summaries = bank.list_documents(&branch).unwrap();
        assert_eq!(summaries.len(), 2);

        let progress = summaries
            .iter()
            .find(|s| s.document_type == "progress")
            .unwrap();
        assert_eq!(progress.tags, vec!["sample"]);
        assert_eq!(
            progress.relative_path,
            Path::new("branch-memory-bank/feature-login/progress.json")
                .to_string_lossy()
        );

        assert!(bank.list_documents(&bank.branch_path("other")).unwrap().is_empty());
    }
}
