// ── Migration Orchestrator ──
//
// Drives a directory migration:
//   backup (fatal on failure) -> walk `*.md` -> per file:
//   read -> classify -> convert -> validate -> write `<stem>.json` -> maybe delete source
//
// A failing or panicking file is recorded in the stats and never stops the run.

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use membank_core::{DocumentPath, MigrationOptions, MigrationResult, MigrationStats, JSON_EXTENSION};
use membank_store::bank;
use membank_store::file;
use membank_store::BackupManager;

use crate::classify;
use crate::error::{MigrationError, Result};
use crate::registry::ConverterRegistry;
use crate::validator::SchemaValidator;

// ── Types ──

pub struct Migrator {
    registry: ConverterRegistry,
    validator: SchemaValidator,
    backups: BackupManager,
}

// ── Public API ──

impl Migrator {
    /// A migrator with the built-in converters.
    pub fn new() -> Result<Self> {
        Self::with_registry(ConverterRegistry::default())
    }

    pub fn with_registry(registry: ConverterRegistry) -> Result<Self> {
        Ok(Self {
            registry,
            validator: SchemaValidator::new()?,
            backups: BackupManager::new(),
        })
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.registry
    }

    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    /// Convert every Markdown file under `directory` to a JSON twin next to it.
    ///
    /// Only a failed backup (or an unreadable directory) aborts the run; every
    /// other problem is counted against the file that caused it.
    pub fn migrate_directory(&self, directory: &Path, options: &MigrationOptions) -> MigrationResult {
        let mut stats = MigrationStats::default();
        log::info!("migrating {}", directory.display());

        if options.create_backup {
            match self.backups.create_backup(directory) {
                Ok(path) => stats.backup_path = Some(path.display().to_string()),
                Err(e) => {
                    log::error!("aborting migration of {}: {}", directory.display(), e);
                    return MigrationResult::aborted(stats, e.to_string());
                }
            }
        }

        let files = match bank::walk_markdown_files(directory) {
            Ok(files) => files,
            Err(e) => {
                log::error!("cannot enumerate {}: {}", directory.display(), e);
                return MigrationResult::aborted(
                    stats,
                    format!("failed to read directory {}: {e:#}", directory.display()),
                );
            }
        };

        for file_path in files {
            let relative = file_path.strip_prefix(directory).unwrap_or(&file_path);
            let display = relative.display().to_string();

            let doc_path = match DocumentPath::from_relative(relative) {
                Ok(doc_path) => doc_path,
                Err(e) => {
                    let error = MigrationError::Path(e);
                    log::error!("{}: {}", display, error);
                    stats.record_failure(display, error.to_string());
                    continue;
                }
            };

            let json_path = file_path.with_extension(JSON_EXTENSION);
            if json_path.exists() && !options.overwrite_existing {
                log::debug!("skipping {}: {} exists", display, json_path.display());
                stats.record_skip();
                continue;
            }

            match self.migrate_isolated(&file_path, &json_path, &doc_path, options) {
                Ok(()) => {
                    stats.record_success();
                    if options.delete_originals {
                        if let Err(e) = fs::remove_file(&file_path) {
                            log::warn!("migrated {} but could not delete it: {}", display, e);
                        }
                    }
                }
                Err(e) => {
                    log::error!("{}", e);
                    stats.record_failure(display, e.to_string());
                }
            }
        }

        log::info!(
            "migration of {} finished: {} migrated, {} failed, {} skipped",
            directory.display(),
            stats.success_count,
            stats.failure_count,
            stats.skipped_count
        );
        MigrationResult::completed(stats)
    }

    /// Convert a single Markdown file. The output goes to `json_path`, or to the
    /// `.json` twin of `file_path` when none is given.
    ///
    /// The document path is the bare file name, so nothing is derived from the
    /// parent directory (a branch context gets no `branchName`). Use
    /// [`Migrator::migrate_file_in`] to keep the directory-run metadata.
    ///
    /// Existing output is always replaced; `overwrite_existing` and the backup
    /// options only apply to directory runs.
    pub fn migrate_file(
        &self,
        file_path: &Path,
        json_path: Option<&Path>,
        options: &MigrationOptions,
    ) -> bool {
        let base_dir = file_path.parent().unwrap_or(Path::new(""));
        self.migrate_file_in(base_dir, file_path, json_path, options)
    }

    /// Like [`Migrator::migrate_file`], with the document path taken relative to
    /// `base_dir`, as a directory run over `base_dir` would.
    pub fn migrate_file_in(
        &self,
        base_dir: &Path,
        file_path: &Path,
        json_path: Option<&Path>,
        options: &MigrationOptions,
    ) -> bool {
        let Ok(relative) = file_path.strip_prefix(base_dir) else {
            log::error!(
                "{} is not under {}",
                file_path.display(),
                base_dir.display()
            );
            return false;
        };
        let doc_path = match DocumentPath::from_relative(relative) {
            Ok(doc_path) => doc_path,
            Err(e) => {
                log::error!("{}", MigrationError::Path(e));
                return false;
            }
        };

        let json_path = json_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| file_path.with_extension(JSON_EXTENSION));

        match self.migrate_isolated(file_path, &json_path, &doc_path, options) {
            Ok(()) => true,
            Err(e) => {
                log::error!("{}", e);
                false
            }
        }
    }

    /// Restore `target_dir` from a snapshot made by a previous run.
    pub fn restore_from_backup(&self, backup_path: &Path, target_dir: &Path) -> bool {
        self.backups.restore_from_backup(backup_path, target_dir)
    }
}

// ── Helpers ──

impl Migrator {
    /// Run one file through the pipeline, turning a converter panic into an error.
    fn migrate_isolated(
        &self,
        file_path: &Path,
        json_path: &Path,
        doc_path: &DocumentPath,
        options: &MigrationOptions,
    ) -> Result<()> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.try_migrate_file(file_path, json_path, doc_path, options)
        }));
        match outcome {
            Ok(result) => result.map(|written| {
                log::debug!("{} -> {}", file_path.display(), written.display());
            }),
            Err(payload) => Err(MigrationError::Panicked {
                path: doc_path.to_string(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    fn try_migrate_file(
        &self,
        file_path: &Path,
        json_path: &Path,
        doc_path: &DocumentPath,
        options: &MigrationOptions,
    ) -> Result<PathBuf> {
        let path = doc_path.to_string();
        let text = fs::read_to_string(file_path).map_err(|source| MigrationError::Read {
            path: path.clone(),
            source,
        })?;

        let document_type = classify::classify(doc_path.file_name(), &text);
        let converter = self.registry.get_converter(document_type)?;
        let doc = converter
            .convert(&text, doc_path)
            .map_err(|e| MigrationError::Conversion {
                path: path.clone(),
                document_type,
                reason: format!("{e:#}"),
            })?;

        if options.validate_json {
            let validation = self.validator.validate_document(&doc, document_type);
            if !validation.success {
                return Err(MigrationError::Validation {
                    path,
                    errors: validation.errors,
                });
            }
        }

        file::write_document(json_path, &doc).map_err(|source| MigrationError::Write {
            path: json_path.display().to_string(),
            source,
        })?;
        Ok(json_path.to_path_buf())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ── Tests ──
