use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use membank_core::MigrationOptions;
use membank_migrate::Migrator;
use membank_store::{BackupManager, MemoryBank};
use rmcp::model::*;
use rmcp::schemars::JsonSchema;
use rmcp::serde::Deserialize;
use rmcp::{tool, ServerHandler, ServiceExt};

// ── Types ──

/// Input for the migrate_directory tool.
#[derive(Debug, Deserialize, JsonSchema)]
struct MigrateDirectoryInput {
    /// Directory to migrate, relative to the memory bank root (default: the whole bank)
    path: Option<String>,
    /// Snapshot the directory first (default from membank.yaml)
    create_backup: Option<bool>,
    /// Replace JSON files that already exist (default from membank.yaml)
    overwrite_existing: Option<bool>,
    /// Validate each document against its schema before writing (default from membank.yaml)
    validate_json: Option<bool>,
    /// Delete each Markdown file after it migrates (default from membank.yaml)
    delete_originals: Option<bool>,
}

/// Input for the restore_backup tool.
#[derive(Debug, Deserialize, JsonSchema)]
struct RestoreBackupInput {
    /// Directory to restore, relative to the memory bank root (default: the whole bank)
    path: Option<String>,
    /// Backup directory name or path; must be a backup of the target (default: the latest)
    backup: Option<String>,
}

/// Input for the list_documents tool.
#[derive(Debug, Deserialize, JsonSchema)]
struct ListDocumentsInput {
    /// Branch name (e.g. "feature/login"); omit to list the global memory bank
    branch: Option<String>,
}

/// Input for the read_document tool.
#[derive(Debug, Deserialize, JsonSchema)]
struct ReadDocumentInput {
    /// Path of a JSON document relative to the memory bank root
    /// (e.g. "branch-memory-bank/feature-login/branchContext.json")
    path: String,
}

/// The membank MCP server.
#[derive(Clone)]
pub struct MembankServer {
    bank: MemoryBank,
    migrator: Arc<Migrator>,
}

// ── Helpers ──

fn internal(message: String) -> rmcp::Error {
    rmcp::Error::internal_error(message, None)
}

fn json_result(value: serde_json::Value) -> Result<CallToolResult, rmcp::Error> {
    Ok(CallToolResult::success(vec![Content::text(value.to_string())]))
}

impl MembankServer {
    /// Resolve a root-relative path, refusing anything that escapes the bank.
    fn resolve_inside_root(&self, relative: Option<&str>) -> Result<PathBuf, rmcp::Error> {
        let requested = match relative {
            Some(p) => self.bank.root.join(p),
            None => self.bank.root.clone(),
        };
        let canonical = std::fs::canonicalize(&requested).map_err(|e| {
            internal(format!("invalid path '{}': {e}", requested.display()))
        })?;
        let root_canonical = std::fs::canonicalize(&self.bank.root)
            .map_err(|e| internal(format!("cannot resolve memory bank root: {e}")))?;
        if !canonical.starts_with(&root_canonical) {
            return Err(internal(
                "path traversal denied: path is outside the memory bank".to_string(),
            ));
        }
        Ok(canonical)
    }

    fn options(&self, input: &MigrateDirectoryInput) -> Result<MigrationOptions, rmcp::Error> {
        let defaults = self
            .bank
            .config()
            .map_err(|e| internal(format!("loading config failed: {e:#}")))?
            .migration;
        Ok(MigrationOptions {
            create_backup: input.create_backup.unwrap_or(defaults.create_backup),
            overwrite_existing: input
                .overwrite_existing
                .unwrap_or(defaults.overwrite_existing),
            validate_json: input.validate_json.unwrap_or(defaults.validate_json),
            delete_originals: input.delete_originals.unwrap_or(defaults.delete_originals),
        })
    }
}

/// Pick a backup of `target`: the named one if it is really a backup of it,
/// else the most recent.
fn select_backup(target: &Path, requested: Option<&str>) -> Result<PathBuf, rmcp::Error> {
    let backups = BackupManager::new()
        .list_backups(target)
        .map_err(|e| internal(format!("listing backups failed: {e}")))?;

    match requested {
        Some(name) => {
            let wanted = Path::new(name);
            backups
                .into_iter()
                .find(|b| b.as_path() == wanted || b.file_name() == wanted.file_name())
                .ok_or_else(|| internal(format!("'{name}' is not a backup of {}", target.display())))
        }
        None => backups
            .into_iter()
            .last()
            .ok_or_else(|| internal(format!("no backups found for {}", target.display()))),
    }
}

// ── Public API ──

#[tool(tool_box)]
impl MembankServer {
    pub fn new(bank: MemoryBank, migrator: Migrator) -> Self {
        Self {
            bank,
            migrator: Arc::new(migrator),
        }
    }

    #[tool(
        name = "migrate_directory",
        description = "Convert every legacy Markdown document under a memory bank directory into a validated JSON document next to it"
    )]
    fn migrate_directory(
        &self,
        #[tool(aggr)] input: MigrateDirectoryInput,
    ) -> Result<CallToolResult, rmcp::Error> {
        let dir = self.resolve_inside_root(input.path.as_deref())?;
        let options = self.options(&input)?;
        let result = self.migrator.migrate_directory(&dir, &options);

        let value = serde_json::to_value(&result)
            .map_err(|e| internal(format!("serializing result failed: {e}")))?;
        json_result(value)
    }

    #[tool(
        name = "restore_backup",
        description = "Restore a memory bank directory from one of its migration backups"
    )]
    fn restore_backup(
        &self,
        #[tool(aggr)] input: RestoreBackupInput,
    ) -> Result<CallToolResult, rmcp::Error> {
        let target = self.resolve_inside_root(input.path.as_deref())?;
        let backup = select_backup(&target, input.backup.as_deref())?;
        let restored = self.migrator.restore_from_backup(&backup, &target);

        json_result(serde_json::json!({
            "success": restored,
            "backup": backup.display().to_string(),
            "target": target.display().to_string(),
        }))
    }

    #[tool(
        name = "list_documents",
        description = "List the JSON documents of a branch memory bank, or of the global memory bank when no branch is given"
    )]
    fn list_documents(
        &self,
        #[tool(aggr)] input: ListDocumentsInput,
    ) -> Result<CallToolResult, rmcp::Error> {
        let dir = match input.branch.as_deref() {
            Some(branch) => self.bank.branch_path(branch),
            None => self.bank.global_path(),
        };
        let summaries = self
            .bank
            .list_documents(&dir)
            .map_err(|e| internal(format!("list documents failed: {e:#}")))?;

        json_result(serde_json::json!({
            "branch": input.branch,
            "count": summaries.len(),
            "documents": summaries,
        }))
    }

    #[tool(
        name = "read_document",
        description = "Read a structured JSON document by its path relative to the memory bank root"
    )]
    fn read_document(
        &self,
        #[tool(aggr)] input: ReadDocumentInput,
    ) -> Result<CallToolResult, rmcp::Error> {
        let canonical = self.resolve_inside_root(Some(&input.path))?;
        let doc = self
            .bank
            .read_document(&canonical)
            .map_err(|e| internal(format!("read failed: {e:#}")))?;

        let value = serde_json::to_value(&doc)
            .map_err(|e| internal(format!("serializing document failed: {e}")))?;
        json_result(value)
    }
}

#[tool(tool_box)]
impl ServerHandler for MembankServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Membank memory bank server. Use migrate_directory to convert legacy Markdown \
                 notes into schema-validated JSON documents and restore_backup to roll a \
                 directory back to its pre-migration snapshot. Use list_documents and \
                 read_document to browse the migrated documents."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

/// Start the membank MCP server on stdio transport.
pub async fn run_mcp_server(bank: MemoryBank) -> Result<()> {
    log::info!("serving memory bank at {}", bank.root.display());
    let migrator = Migrator::new()?;
    let server = MembankServer::new(bank, migrator);
    let service = server
        .serve(rmcp::transport::io::stdio())
        .await
        .map_err(|e| anyhow::anyhow!("failed to start MCP server: {e}"))?;

    service.waiting().await?;

    Ok(())
}
