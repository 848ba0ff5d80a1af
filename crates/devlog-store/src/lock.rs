use crate::error::StoreError;
use fs2::FileExt;
use rand::Rng;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::time::Duration;

/// Bounded attempts before a save fails with `LockBusy`.
const MAX_ATTEMPTS: u32 = 5;

/// Base backoff between attempts; jitter is added on top so two racing
/// invocations (foreground command + git-hook snapshot) don't retry in
/// lockstep.
const BASE_BACKOFF_MS: u64 = 40;

/// Exclusive per-project lock. Released on drop.
pub struct ProjectLock {
    _file: File,
}

impl ProjectLock {
    /// Acquire the lock, retrying with jittered backoff up to a bounded
    /// number of attempts.
    pub fn acquire(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)?;

        let mut rng = rand::thread_rng();
        for attempt in 1..=MAX_ATTEMPTS {
            if file.try_lock_exclusive().is_ok() {
                return Ok(Self { _file: file });
            }
            if attempt < MAX_ATTEMPTS {
                let jitter: u64 = rng.gen_range(0..BASE_BACKOFF_MS);
                let wait = BASE_BACKOFF_MS * u64::from(attempt) + jitter;
                tracing::debug!(path = %path.display(), attempt, wait_ms = wait, "journal lock busy, retrying");
                std::thread::sleep(Duration::from_millis(wait));
            }
        }

        Err(StoreError::LockBusy {
            path: path.to_path_buf(),
            attempts: MAX_ATTEMPTS,
        })
    }
}
