use crate::render;
use devlog_core::{date, WorkSnapshot};
use devlog_store::StoreError;
use std::path::Path;

pub fn execute(
    cwd: &Path,
    date_arg: Option<&str>,
    project: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let store = crate::open_journal()?;
    let snap_date = match date_arg {
        Some(d) => d.to_string(),
        None => date::today(),
    };
    let project_id = crate::resolve_project(cwd, project)?;

    let snap = match store.get(&snap_date, &project_id) {
        Ok(snap) => snap,
        Err(StoreError::NotFound { .. }) => {
            println!("No snapshot for {project_id} on {snap_date}.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
        return Ok(());
    }
    print_snapshot(&snap);
    Ok(())
}

fn print_snapshot(snap: &WorkSnapshot) {
    println!("{} — {} (taken {})", snap.date, snap.project_id, snap.taken_at);
    if !snap.current_branch.is_empty() {
        println!("On branch {}", snap.current_branch);
    }

    if !snap.today_commits.is_empty() {
        println!("\nCommits ({}):", snap.today_commits.len());
        for c in &snap.today_commits {
            println!("  {} {}", c.short_hash, render::truncate(&c.message, 70));
        }
    }

    if !snap.active_branches.is_empty() {
        println!("\nBranches ({}):", snap.active_branches.len());
        for b in &snap.active_branches {
            let wip = if b.has_uncommitted { "  [wip]" } else { "" };
            println!(
                "  {:<30} {}{wip}",
                b.name,
                render::truncate(&b.last_commit_message, 50)
            );
        }
    }

    if !snap.pull_requests.is_empty() {
        println!("\nPull requests ({}):", snap.pull_requests.len());
        for pr in &snap.pull_requests {
            let state = match pr.state {
                devlog_core::PrState::Open => "open",
                devlog_core::PrState::Closed => "closed",
                devlog_core::PrState::Merged => "merged",
            };
            println!(
                "  #{} [{state}] {}",
                pr.number,
                render::truncate(&pr.title, 60)
            );
        }
    }

    if !snap.tickets.is_empty() {
        let ids: Vec<&str> = snap.tickets.iter().map(|t| t.id.as_str()).collect();
        println!("\nTickets: {}", ids.join(", "));
    }

    if !snap.categories.is_empty() {
        let parts: Vec<String> = snap
            .categories
            .iter()
            .map(|c| format!("{} {}%", c.name, c.percentage))
            .collect();
        println!("\nWork areas: {}", parts.join(", "));
    }

    if !snap.top_changed_files.is_empty() {
        println!("\nTop changed files:");
        for f in snap.top_changed_files.iter().take(5) {
            println!("  {:>3}x {}", f.frequency, f.path);
        }
    }

    if let Some(d) = &snap.diff_stats {
        println!(
            "\nDiff: {} files, +{} -{}",
            d.files_changed, d.insertions, d.deletions
        );
    }

    if let Some(notes) = &snap.notes {
        println!("\nNotes:\n{notes}");
    }

    if !snap.tags.is_empty() {
        let tags: Vec<String> = snap.tags.iter().map(|t| format!("#{t}")).collect();
        println!("\nTags: {}", tags.join(" "));
    }
}
