use crate::render;
use devlog_git::remote::{GhCli, RemoteProvider};
use devlog_git::GitCli;
use devlog_snapshot::{AssembleOptions, Assembler};
use std::path::Path;

pub struct SnapParams<'a> {
    pub cwd: &'a Path,
    pub date: Option<&'a str>,
    pub project: Option<&'a str>,
    pub light: bool,
    pub no_prs: bool,
    pub no_tickets: bool,
    pub note: Option<&'a str>,
    pub tags: Vec<String>,
    pub json: bool,
}

pub fn execute(params: &SnapParams<'_>) -> anyhow::Result<()> {
    let store = crate::open_journal()?;
    let repo = GitCli::new(params.cwd);
    let remote: Option<Box<dyn RemoteProvider>> = Some(Box::new(GhCli::new(params.cwd)));
    let assembler = Assembler::new(&store, Box::new(repo), remote);

    let opts = AssembleOptions {
        date: params.date.map(str::to_string),
        project: params.project.map(str::to_string),
        skip_prs: params.no_prs,
        skip_tickets: params.no_tickets,
        light: params.light,
        notes: params.note.map(str::to_string),
        tags: params.tags.clone(),
    };
    let result = assembler.assemble(&opts)?;
    let mut warnings = result.warnings;
    let outcome = store.save(result.snapshot)?;
    warnings.extend(outcome.warnings);

    if params.json {
        println!("{}", serde_json::to_string_pretty(&outcome.snapshot)?);
        render::print_warnings(&warnings);
        return Ok(());
    }

    let snap = &outcome.snapshot;
    let action = if outcome.merged {
        "Merged into existing record for"
    } else {
        "Saved new record for"
    };
    println!(
        "{action} {} on {} [{}ms]",
        snap.project_id, snap.date, result.duration_ms
    );
    println!(
        "  commits today: {}   branches: {}   PRs: {}   tickets: {}",
        snap.today_commits.len(),
        snap.active_branches.len(),
        snap.pull_requests.len(),
        snap.tickets.len()
    );
    if !snap.tags.is_empty() {
        let tags: Vec<String> = snap.tags.iter().map(|t| format!("#{t}")).collect();
        println!("  tags: {}", tags.join(" "));
    }
    render::print_warnings(&warnings);
    Ok(())
}
