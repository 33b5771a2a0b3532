// ── Memory Bank Directory Operations ──
//
// Manages the memory bank directory structure:
//   <root>/
//     membank.yaml          migration defaults
//     branch-memory-bank/   one subdirectory per (namespaced) branch
//     global-memory-bank/   documents shared across branches

use membank_core::{Result, JSON_EXTENSION, MARKDOWN_EXTENSION};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// ── Constants ──

pub const CONFIG_FILE: &str = "membank.yaml";
pub const BRANCH_DIR: &str = "branch-memory-bank";
pub const GLOBAL_DIR: &str = "global-memory-bank";

const CONFIG_CONTENT: &str = "\
migration:
  create_backup: true
  overwrite_existing: false
  validate_json: true
  delete_originals: false
";

// ── Public API ──

/// Initialize a memory bank at the given path.
/// Idempotent: does not overwrite membank.yaml if it already exists.
pub fn init(path: &Path) -> Result<()> {
    fs::create_dir_all(path.join(BRANCH_DIR))?;
    fs::create_dir_all(path.join(GLOBAL_DIR))?;

    let config_path = path.join(CONFIG_FILE);
    if !config_path.exists() {
        fs::write(&config_path, CONFIG_CONTENT)?;
    }

    Ok(())
}

/// On-disk directory name for a namespaced branch (`feature/login` -> `feature-login`).
pub fn branch_dir_name(branch: &str) -> String {
    branch.trim().trim_matches('/').replace('/', "-")
}

/// Recursively find every `.md` file under `dir`, at any depth.
pub fn walk_markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    walk_files_with_extension(dir, MARKDOWN_EXTENSION)
}

/// Recursively find every `.json` file under `dir`, at any depth.
pub fn walk_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    walk_files_with_extension(dir, JSON_EXTENSION)
}

// ── Helpers ──

fn walk_files_with_extension(dir: &Path, wanted: &str) -> Result<Vec<PathBuf>> {
    // Surface an unreadable root instead of returning an empty listing.
    fs::read_dir(dir)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).into_iter() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("skipping unreadable entry under {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) == Some(wanted) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

// ── Tests ──
