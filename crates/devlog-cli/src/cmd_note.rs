use devlog_core::{date, WorkSnapshot};
use std::path::Path;

/// Attach a note and/or tags to a day's record through the normal
/// merge-on-save path, creating the record if the day has none yet.
pub fn execute(
    cwd: &Path,
    text: &str,
    tags: &[String],
    date_arg: Option<&str>,
    project: Option<&str>,
) -> anyhow::Result<()> {
    if text.trim().is_empty() && tags.is_empty() {
        anyhow::bail!("nothing to record: give note text or at least one --tag");
    }

    let store = crate::open_journal()?;
    let snap_date = match date_arg {
        Some(d) => d.to_string(),
        None => date::today(),
    };
    let project_id = crate::resolve_project(cwd, project)?;

    let mut snap = WorkSnapshot::new(&snap_date, &project_id, &date::now_rfc3339());
    if !text.trim().is_empty() {
        snap.notes = Some(text.trim().to_string());
    }
    snap.tags = tags.to_vec();

    let outcome = store.save(snap)?;
    if outcome.merged {
        println!("Noted on {snap_date} for {project_id}.");
    } else {
        println!("Started a record for {project_id} on {snap_date} with your note.");
    }
    Ok(())
}
