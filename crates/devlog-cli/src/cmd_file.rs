use crate::render;
use devlog_recall::find_file_history;

pub fn execute(path: &str, project: Option<&str>, days: u32, json: bool) -> anyhow::Result<()> {
    let store = crate::open_journal()?;
    let entries = find_file_history(&store, path, project, days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No work touching {path:?} in the last {days} days.");
        return Ok(());
    }

    for entry in &entries {
        println!("[{}] {}", entry.date, entry.project_id);
        for c in &entry.commits {
            println!("  {} {}", c.short_hash, render::truncate(&c.message, 70));
        }
    }
    println!("\n({} days touched {path:?})", entries.len());
    Ok(())
}
