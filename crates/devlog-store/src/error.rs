use std::path::PathBuf;

/// Store failure taxonomy. Callers branch on these: invalid input is
/// rejected before I/O, lock contention is retried then fatal for that
/// save, corrupt records are skipped in range reads.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no snapshot for {project_id} on {date}")]
    NotFound { date: String, project_id: String },

    #[error("journal locked by another process ({}, gave up after {attempts} attempts)", path.display())]
    LockBusy { path: PathBuf, attempts: u32 },

    #[error("corrupt journal record {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
