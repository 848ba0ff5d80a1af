use crate::render;
use devlog_recall::{search, SearchCriteria};

pub struct RecallParams<'a> {
    pub query: Option<&'a str>,
    pub project: Option<&'a str>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub tags: Vec<String>,
    pub file: Option<String>,
    pub limit: usize,
    pub json: bool,
}

pub fn execute(params: &RecallParams<'_>) -> anyhow::Result<()> {
    let store = crate::open_journal()?;

    let criteria = SearchCriteria {
        text: params.query.map(str::to_string),
        project: params.project.map(str::to_string),
        from: params.from.clone(),
        to: params.to.clone(),
        tags: params.tags.clone(),
        file: params.file.clone(),
        limit: params.limit,
    };

    // Nothing to match on: show how to ask, plus what's in the journal,
    // instead of a useless empty list.
    if criteria.is_empty() {
        print_usage(&store)?;
        return Ok(());
    }

    let results = search(&store, &criteria)?;

    if params.json {
        println!("{}", serde_json::to_string_pretty(&results.results)?);
        render::print_warnings(&results.warnings);
        return Ok(());
    }

    if results.results.is_empty() {
        println!("No matching snapshots.");
        render::print_warnings(&results.warnings);
        return Ok(());
    }

    for ranked in &results.results {
        println!("{}  (score {:.1})", render::snapshot_line(&ranked.snapshot), ranked.score);
        for reason in &ranked.match_reasons {
            println!("    - {reason}");
        }
    }
    println!("\n({} results)", results.results.len());
    render::print_warnings(&results.warnings);
    Ok(())
}

fn print_usage(store: &devlog_store::JournalStore) -> anyhow::Result<()> {
    println!("Nothing to search for. Give recall a query, tags, or a file:");
    println!("  devlog recall \"auth refactor\"");
    println!("  devlog recall --tag deploy --project acme-api");
    println!("  devlog recall --file src/auth.ts --from 2026-01-01");

    let stats = store.stats()?;
    match (&stats.oldest_date, &stats.newest_date) {
        (Some(oldest), Some(newest)) => println!(
            "\nJournal: {} snapshots across {} projects, {oldest} to {newest}.",
            stats.snapshots, stats.projects
        ),
        _ => println!("\nJournal is empty. Run `devlog snap` to capture today."),
    }
    Ok(())
}
