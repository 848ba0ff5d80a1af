use crate::render;

pub fn execute(json: bool) -> anyhow::Result<()> {
    let store = crate::open_journal()?;
    let stats = store.stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Journal at {}", store.paths().root.display());
    println!("  snapshots:      {}", stats.snapshots);
    println!("  distinct dates: {}", stats.distinct_dates);
    println!("  projects:       {}", stats.projects);
    match (&stats.oldest_date, &stats.newest_date) {
        (Some(oldest), Some(newest)) => println!("  range:          {oldest} to {newest}"),
        _ => println!("  range:          (empty)"),
    }
    println!("  on disk:        {}", render::format_size(stats.total_bytes));
    Ok(())
}
