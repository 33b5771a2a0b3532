// ── Configuration ──

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use membank_core::MigrationOptions;
use serde::{Deserialize, Serialize};

use crate::bank::CONFIG_FILE;

/// Top-level `membank.yaml` structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MembankConfig {
    #[serde(default)]
    pub migration: MigrationOptions,
}

/// Load `membank.yaml` from a memory bank root, falling back to defaults when
/// the file does not exist.
pub fn load_config(root: &Path) -> Result<MembankConfig> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(MembankConfig::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("reading config: {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(MembankConfig::default());
    }

    let config: MembankConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("parsing config: {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, MembankConfig::default());
        assert!(config.migration.create_backup);
    }

    #[test]
    fn test_partial_config() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "migration:\n  delete_originals: true\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert!(config.migration.delete_originals);
        assert!(config.migration.create_backup);
        assert!(config.migration.validate_json);
    }

    #[test]
    fn test_init_config_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        crate::bank::init(tmp.path()).unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), MembankConfig::default());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "migration: [1, 2\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }
}
