// ── File I/O ──
//
// Read and write structured documents to disk.

use membank_core::{Result, StructuredDocument};
use std::fs;
use std::path::Path;

// ── Public API ──

/// Read a `.json` file and parse it into a `StructuredDocument`.
pub fn read_document(path: &Path) -> Result<StructuredDocument> {
    let content = fs::read_to_string(path)?;
    let doc = serde_json::from_str(&content)?;
    Ok(doc)
}

/// Serialize a `StructuredDocument` as pretty JSON and write it to disk.
/// Creates parent directories if they don't exist.
pub fn write_document(path: &Path, doc: &StructuredDocument) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, doc.to_pretty_json()?)?;
    Ok(())
}

/// Walk a directory and parse every JSON document in it.
/// Invalid files are skipped with a warning.
pub fn read_all_documents(dir: &Path) -> Result<Vec<StructuredDocument>> {
    let files = crate::bank::walk_json_files(dir)?;

    let mut docs = Vec::new();
    for file_path in files {
        match read_document(&file_path) {
            Ok(doc) => docs.push(doc),
            Err(e) => {
                log::warn!("skipping {}: {}", file_path.display(), e);
            }
        }
    }

    Ok(docs)
}

// ── Tests ──
