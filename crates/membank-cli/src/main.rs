use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use membank_core::{MigrationOptions, MigrationResult};
use membank_migrate::Migrator;
use membank_store::{bank, load_config, BackupManager, MemoryBank};
use std::path::{Path, PathBuf};
use std::process;

// ── CLI Definition ──

#[derive(Parser)]
#[command(name = "membank", about = "Migrate Markdown memory banks to structured JSON")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new memory bank directory
    Init {
        /// Path to create the memory bank (default: ./docs)
        #[arg(long, default_value = "docs")]
        path: PathBuf,
    },
    /// Convert every Markdown document under a directory to JSON
    Migrate {
        /// Directory to migrate
        dir: PathBuf,
        /// Memory bank root holding membank.yaml (default: nearest ancestor that has one)
        #[arg(long)]
        root: Option<PathBuf>,
        /// Do not snapshot the directory first
        #[arg(long)]
        no_backup: bool,
        /// Replace JSON files that already exist
        #[arg(long)]
        overwrite: bool,
        /// Write documents even when they fail schema validation
        #[arg(long)]
        skip_validation: bool,
        /// Delete each Markdown file after it migrates
        #[arg(long)]
        delete_originals: bool,
    },
    /// Restore a directory from a migration backup
    Restore {
        /// Directory to restore
        target: PathBuf,
        /// Backup to restore from (default: the most recent backup of the target)
        #[arg(long)]
        backup: Option<PathBuf>,
    },
    /// Run the MCP server on stdio
    Serve {
        /// Memory bank root (default: ./docs)
        #[arg(long, default_value = "docs")]
        path: PathBuf,
    },
}

struct MigrateFlags {
    no_backup: bool,
    overwrite: bool,
    skip_validation: bool,
    delete_originals: bool,
}

// ── Commands ──

/// Nearest directory at or above `dir` that contains a `membank.yaml`.
fn find_bank_root(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .find(|a| a.join(bank::CONFIG_FILE).is_file())
        .map(Path::to_path_buf)
}

/// Config defaults overridden by whichever flags were given.
fn resolve_options(config_root: Option<&Path>, flags: &MigrateFlags) -> Result<MigrationOptions> {
    let mut options = match config_root {
        Some(root) => load_config(root)?.migration,
        None => MigrationOptions::default(),
    };
    if flags.no_backup {
        options.create_backup = false;
    }
    if flags.overwrite {
        options.overwrite_existing = true;
    }
    if flags.skip_validation {
        options.validate_json = false;
    }
    if flags.delete_originals {
        options.delete_originals = true;
    }
    Ok(options)
}

fn migrate(dir: &Path, root: Option<&Path>, flags: &MigrateFlags) -> Result<MigrationResult> {
    let config_root = root.map(Path::to_path_buf).or_else(|| find_bank_root(dir));
    let options = resolve_options(config_root.as_deref(), flags)?;
    log::debug!("migration options: {:?}", options);

    let migrator = Migrator::new().context("loading schemas")?;
    Ok(migrator.migrate_directory(dir, &options))
}

fn restore(target: &Path, backup: Option<&Path>) -> Result<PathBuf> {
    let backup = match backup {
        Some(b) => b.to_path_buf(),
        None => BackupManager::new()
            .list_backups(target)
            .with_context(|| format!("listing backups of {}", target.display()))?
            .pop()
            .with_context(|| format!("no backups found for {}", target.display()))?,
    };

    if !BackupManager::new().restore_from_backup(&backup, target) {
        bail!(
            "failed to restore {} from {}",
            target.display(),
            backup.display()
        );
    }
    Ok(backup)
}

fn print_summary(result: &MigrationResult) {
    let stats = &result.stats;
    if let Some(backup) = &stats.backup_path {
        println!("backup: {}", backup);
    }
    println!(
        "migrated {}, failed {}, skipped {}",
        stats.success_count, stats.failure_count, stats.skipped_count
    );
    for failure in &stats.failures {
        println!("  {}: {}", failure.path, failure.error);
    }
    if let Some(error) = &result.error {
        eprintln!("error: {}", error);
    }
}

fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Init { path } => {
            MemoryBank::new(&path).init()?;
            println!("initialized memory bank at {}", path.display());
        }
        Commands::Migrate {
            dir,
            root,
            no_backup,
            overwrite,
            skip_validation,
            delete_originals,
        } => {
            let flags = MigrateFlags {
                no_backup,
                overwrite,
                skip_validation,
                delete_originals,
            };
            let result = migrate(&dir, root.as_deref(), &flags)?;
            print_summary(&result);
            return Ok(result.success);
        }
        Commands::Restore { target, backup } => {
            let used = restore(&target, backup.as_deref())?;
            println!("restored {} from {}", target.display(), used.display());
        }
        Commands::Serve { path } => {
            let bank = MemoryBank::new(path);
            if !bank.is_initialized() {
                bail!(
                    "no memory bank at {} (run `membank init` first)",
                    bank.root.display()
                );
            }
            let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
            runtime.block_on(membank_mcp::run_mcp_server(bank))?;
        }
    }
    Ok(true)
}

// ── Main ──

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn no_flags() -> MigrateFlags {
        MigrateFlags {
            no_backup: false,
            overwrite: false,
            skip_validation: false,
            delete_originals: false,
        }
    }

    #[test]
    fn test_init_creates_structure() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("docs");

        MemoryBank::new(&root).init().unwrap();

        assert!(root.join("membank.yaml").exists());
        assert!(root.join("branch-memory-bank").is_dir());
        assert!(root.join("global-memory-bank").is_dir());
    }

    #[test]
    fn test_flags_override_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("membank.yaml"),
            "migration:\n  overwrite_existing: true\n  create_backup: true\n",
        )
        .unwrap();

        let options = resolve_options(Some(tmp.path()), &no_flags()).unwrap();
        assert!(options.overwrite_existing);
        assert!(options.create_backup);

        let flags = MigrateFlags {
            no_backup: true,
            skip_validation: true,
            ..no_flags()
        };
        let options = resolve_options(Some(tmp.path()), &flags).unwrap();
        assert!(!options.create_backup);
        assert!(!options.validate_json);
        assert!(options.overwrite_existing);
    }

    #[test]
    fn test_migrate_uses_nearest_config() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("docs");
        MemoryBank::new(&root).init().unwrap();
        fs::write(
            root.join("membank.yaml"),
            "migration:\n  create_backup: false\n",
        )
        .unwrap();

        let branch = MemoryBank::new(&root).branch_path("feature/login");
        fs::create_dir_all(&branch).unwrap();
        fs::write(branch.join("progress.md"), "# Progress\n").unwrap();

        assert_eq!(find_bank_root(&branch), Some(root.clone()));
        let result = migrate(&branch, None, &no_flags()).unwrap();
        assert!(result.success);
        assert!(result.stats.backup_path.is_none());
        assert!(branch.join("progress.json").exists());
    }

    #[test]
    fn test_restore_latest_backup() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("notes");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("notes.md"), "# Notes\n").unwrap();

        let result = migrate(&dir, None, &no_flags()).unwrap();
        assert!(dir.join("notes.json").exists());

        let used = restore(&dir, None).unwrap();
        assert_eq!(used, PathBuf::from(result.stats.backup_path.unwrap()));
        assert!(!dir.join("notes.json").exists());
        assert!(dir.join("notes.md").exists());
    }

    #[test]
    fn test_restore_without_backups_fails() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("notes");
        fs::create_dir_all(&dir).unwrap();
        assert!(restore(&dir, None).is_err());
        assert!(restore(&dir, Some(&tmp.path().join("missing"))).is_err());
    }
}
