use devlog_git::GitCli;
use devlog_snapshot::{AssembleOptions, Assembler};
use std::path::Path;

/// Fire-and-forget capture for git hooks. Must never block or fail the
/// invoking command: every error is caught here and discarded, with a
/// quiet diagnostic under `RUST_LOG=devlog=debug`.
pub fn execute(cwd: &Path) -> anyhow::Result<()> {
    if let Err(e) = capture(cwd) {
        tracing::debug!(error = %e, "background snapshot failed");
    }
    Ok(())
}

fn capture(cwd: &Path) -> anyhow::Result<()> {
    let store = crate::open_journal()?;
    let assembler = Assembler::new(&store, Box::new(GitCli::new(cwd)), None);
    let result = assembler.assemble(&AssembleOptions {
        light: true,
        ..AssembleOptions::default()
    })?;
    let outcome = store.save(result.snapshot)?;
    tracing::debug!(
        project = %outcome.snapshot.project_id,
        date = %outcome.snapshot.date,
        merged = outcome.merged,
        duration_ms = result.duration_ms,
        "background snapshot saved"
    );
    Ok(())
}
