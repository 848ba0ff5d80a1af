use std::path::{Path, PathBuf};

/// All well-known paths under the journal root.
#[derive(Debug, Clone)]
pub struct JournalPaths {
    pub root: PathBuf,
    pub journal_dir: PathBuf,
    pub config_json: PathBuf,
}

impl JournalPaths {
    /// Derive all paths from a root. Pure computation, no I/O.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            journal_dir: root.join("journal"),
            config_json: root.join("config.json"),
            root,
        }
    }

    /// Create required directories. Idempotent.
    pub fn ensure_layout(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.journal_dir)?;
        Ok(())
    }

    /// Directory holding all records for one project.
    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        self.journal_dir.join(project_id)
    }

    /// The record file for one `(project, date)` key.
    pub fn snapshot_file(&self, project_id: &str, date: &str) -> PathBuf {
        self.project_dir(project_id).join(format!("{date}.json"))
    }

    /// The per-project lock file serializing merge-writes.
    pub fn lock_file(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join("LOCK")
    }

    /// The date key of a record file, if `path` names one.
    pub fn date_of(path: &Path) -> Option<&str> {
        let name = path.file_name()?.to_str()?;
        name.strip_suffix(".json")
    }
}
