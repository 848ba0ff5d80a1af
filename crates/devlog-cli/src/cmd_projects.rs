pub fn execute(json: bool) -> anyhow::Result<()> {
    let store = crate::open_journal()?;
    let projects = store.list_projects()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects yet. Run `devlog snap` inside a repository.");
        return Ok(());
    }

    for p in &projects {
        let path = p.repo_path.as_deref().unwrap_or("");
        println!(
            "{:<24} {:>4} snapshots  last {}  {path}",
            p.project_id, p.snapshot_count, p.last_snapshot_date
        );
    }
    Ok(())
}
