use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_recent_days() -> u32 {
    7
}

fn default_lookback_days() -> u32 {
    14
}

fn default_true() -> bool {
    true
}

/// Journal configuration, read from `config.json` under the journal
/// root. Passed by value into the store and assembler constructors; no
/// process-wide singleton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Override for the journal root directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Window for `get_recent` and the default `log` view.
    #[serde(default = "default_recent_days")]
    pub recent_days: u32,
    /// Lookback window for recent-commit context in snapshots.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Fetch pull requests in full snapshots.
    #[serde(default = "default_true")]
    pub fetch_prs: bool,
    /// Extract ticket references in full snapshots.
    #[serde(default = "default_true")]
    pub fetch_tickets: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            root: None,
            recent_days: default_recent_days(),
            lookback_days: default_lookback_days(),
            fetch_prs: true,
            fetch_tickets: true,
        }
    }
}

/// Default journal root: `$DEVLOG_DIR`, else the platform data dir,
/// else `~/.devlog`.
pub fn default_root() -> PathBuf {
    if let Ok(dir) = std::env::var("DEVLOG_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("devlog")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".devlog")
    } else {
        PathBuf::from(".devlog")
    }
}

impl JournalConfig {
    /// The journal root this config points at.
    pub fn resolved_root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(default_root)
    }

    /// Load from `config.json` under `root`. Missing file means
    /// defaults; unknown keys are tolerated.
    pub fn load_from(root: &Path) -> anyhow::Result<Self> {
        let path = root.join("config.json");
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let mut cfg: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("cannot parse {}: {e}", path.display()))?;
        // A config file under a root always names that root.
        cfg.root = Some(root.to_path_buf());
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_file_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = JournalConfig::load_from(tmp.path()).unwrap();
        assert_eq!(cfg.recent_days, 7);
        assert_eq!(cfg.lookback_days, 14);
        assert!(cfg.fetch_prs);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("config.json"), r#"{"recent_days": 3}"#).unwrap();
        let cfg = JournalConfig::load_from(tmp.path()).unwrap();
        assert_eq!(cfg.recent_days, 3);
        assert_eq!(cfg.lookback_days, 14);
        assert_eq!(cfg.root.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("config.json"), "not json").unwrap();
        assert!(JournalConfig::load_from(tmp.path()).is_err());
    }
}
