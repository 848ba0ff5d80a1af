use std::io::Write;

pub fn execute(keep_days: u32, dry_run: bool, force: bool) -> anyhow::Result<()> {
    let store = crate::open_journal()?;

    let preview = store.prune_candidates(keep_days)?;
    if preview.removed == 0 {
        println!("Nothing older than {keep_days} days; journal untouched.");
        return Ok(());
    }

    println!(
        "{} snapshot(s) across {} date(s) older than {keep_days} days:",
        preview.removed,
        preview.dates.len()
    );
    println!("  {}", preview.dates.join(", "));

    if dry_run {
        println!("(dry run, nothing deleted)");
        return Ok(());
    }

    if !force && !confirm("Delete permanently? [y/N] ")? {
        println!("Aborted.");
        return Ok(());
    }

    let report = store.prune(keep_days)?;
    println!("Deleted {} snapshot(s).", report.removed);
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
