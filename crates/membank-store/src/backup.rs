// ── Backup / Restore ──
//
// A backup is a full copy of a directory tree placed next to it:
//   docs/                              the source
//   docs-backup-2026-10-17T09-30-12-345Z/  the snapshot
//
// Creating a backup fails loudly. Restoring reports failure as `false` so the
// caller can fall back to another recovery path. Neither operation is
// transactional: an I/O error midway leaves a partial tree behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use membank_core::{MembankError, Result};
use walkdir::WalkDir;

const BACKUP_MARKER: &str = "-backup-";

// ── Types ──

#[derive(Debug, Clone, Default)]
pub struct BackupManager;

// ── Public API ──

impl BackupManager {
    pub fn new() -> Self {
        Self
    }

    /// Snapshot `directory` into a timestamped sibling directory and return its path.
    pub fn create_backup(&self, directory: &Path) -> Result<PathBuf> {
        let source = fs::canonicalize(directory).map_err(|e| backup_error(directory, e))?;
        if !source.is_dir() {
            return Err(backup_error(
                directory,
                io::Error::new(io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        let (parent, base) = match (source.parent(), source.file_name()) {
            (Some(parent), Some(base)) => (parent, base.to_string_lossy().to_string()),
            _ => {
                return Err(backup_error(
                    directory,
                    io::Error::new(io::ErrorKind::InvalidInput, "cannot back up a filesystem root"),
                ))
            }
        };

        let backup_path = unique_backup_path(parent, &base);
        log::info!(
            "creating backup of {} at {}",
            source.display(),
            backup_path.display()
        );
        copy_dir(&source, &backup_path).map_err(|e| backup_error(directory, e))?;

        Ok(backup_path)
    }

    /// Replace the contents of `target_dir` with the contents of `backup_path`.
    ///
    /// The target directory itself is kept; everything inside it is removed first.
    pub fn restore_from_backup(&self, backup_path: &Path, target_dir: &Path) -> bool {
        match restore(backup_path, target_dir) {
            Ok(()) => {
                log::info!(
                    "restored {} from backup {}",
                    target_dir.display(),
                    backup_path.display()
                );
                true
            }
            Err(e) => {
                log::error!(
                    "failed to restore {} from {}: {}",
                    target_dir.display(),
                    backup_path.display(),
                    e
                );
                false
            }
        }
    }

    /// Existing backups of `directory`, oldest first.
    pub fn list_backups(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        let source = fs::canonicalize(directory)?;
        let (Some(parent), Some(base)) = (source.parent(), source.file_name()) else {
            return Ok(Vec::new());
        };
        let prefix = format!("{}{}", base.to_string_lossy(), BACKUP_MARKER);

        let mut backups = Vec::new();
        for entry in fs::read_dir(parent)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(&prefix) && entry.file_type()?.is_dir() {
                backups.push(entry.path());
            }
        }

        // Timestamps sort lexically.
        backups.sort();
        Ok(backups)
    }
}

// ── Helpers ──

fn backup_error(path: &Path, source: io::Error) -> MembankError {
    MembankError::Backup {
        path: path.display().to_string(),
        source,
    }
}

/// ISO-8601 UTC timestamp with `:` and `.` replaced so it is safe in file names.
fn filesystem_timestamp() -> String {
    Utc::now()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

fn unique_backup_path(parent: &Path, base: &str) -> PathBuf {
    let stamped = format!("{}{}{}", base, BACKUP_MARKER, filesystem_timestamp());
    let mut candidate = parent.join(&stamped);
    let mut n = 1;
    while candidate.exists() {
        candidate = parent.join(format!("{}-{}", stamped, n));
        n += 1;
    }
    candidate
}

/// Deep-copy every file and subdirectory of `src` into `dst`.
fn copy_dir(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let to = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&to)?;
        } else {
            fs::copy(entry.path(), &to)?;
        }
    }
    Ok(())
}

/// Remove everything inside `dir` but keep `dir` itself.
fn clear_dir_contents(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

fn restore(backup_path: &Path, target_dir: &Path) -> io::Result<()> {
    if !backup_path.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("backup directory not found: {}", backup_path.display()),
        ));
    }

    let backup = fs::canonicalize(backup_path)?;
    let target = resolve_target(target_dir)?;
    if backup.starts_with(&target) || target.starts_with(&backup) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "backup {} and target {} overlap",
                backup.display(),
                target.display()
            ),
        ));
    }

    if target_dir.exists() {
        clear_dir_contents(target_dir)?;
    }
    copy_dir(&backup, target_dir)
}

/// Canonical form of a restore target that may not exist yet.
fn resolve_target(target_dir: &Path) -> io::Result<PathBuf> {
    if target_dir.exists() {
        return fs::canonicalize(target_dir);
    }
    let absolute = std::path::absolute(target_dir)?;
    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) if parent.exists() => {
            Ok(fs::canonicalize(parent)?.join(name))
        }
        _ => Ok(absolute),
    }
}

// ── Tests ──
