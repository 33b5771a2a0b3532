// ── Migration Run Types ──

use serde::{Deserialize, Serialize};

/// Options controlling a Markdown-to-JSON migration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationOptions {
    /// Snapshot the directory before any write.
    #[serde(default = "default_true")]
    pub create_backup: bool,
    /// Replace JSON twins that already exist instead of skipping the file.
    #[serde(default)]
    pub overwrite_existing: bool,
    /// Enforce the schema gate before writing.
    #[serde(default = "default_true")]
    pub validate_json: bool,
    /// Remove the source Markdown file after its conversion succeeds.
    #[serde(default)]
    pub delete_originals: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            create_backup: true,
            overwrite_existing: false,
            validate_json: true,
            delete_originals: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationFailure {
    pub path: String,
    pub error: String,
}

/// Counters for a single run. Every visited Markdown file lands in exactly one
/// of `success_count`, `failure_count` or `skipped_count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStats {
    pub success_count: usize,
    pub failure_count: usize,
    pub skipped_count: usize,
    pub failures: Vec<MigrationFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
}

impl MigrationStats {
    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub fn record_skip(&mut self) {
        self.skipped_count += 1;
    }

    pub fn record_failure(&mut self, path: impl Into<String>, error: impl Into<String>) {
        self.failure_count += 1;
        self.failures.push(MigrationFailure {
            path: path.into(),
            error: error.into(),
        });
    }

    pub fn visited(&self) -> usize {
        self.success_count + self.failure_count + self.skipped_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationResult {
    pub success: bool,
    pub stats: MigrationStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MigrationResult {
    /// Result of a run that processed files; succeeds iff nothing failed.
    pub fn completed(stats: MigrationStats) -> Self {
        Self {
            success: stats.failure_count == 0,
            stats,
            error: None,
        }
    }

    /// Result of a run aborted before any file was touched.
    pub fn aborted(stats: MigrationStats, error: impl Into<String>) -> Self {
        Self {
            success: false,
            stats,
            error: Some(error.into()),
        }
    }
}

// ── Tests ──
