mod cmd_config;
mod cmd_file;
mod cmd_hook;
mod cmd_log;
mod cmd_note;
mod cmd_projects;
mod cmd_prune;
mod cmd_recall;
mod cmd_show;
mod cmd_snap;
mod cmd_stats;
mod render;

use clap::{Parser, Subcommand};
use devlog_git::RepoFacts;
use devlog_store::{config::default_root, JournalConfig, JournalStore};

#[derive(Parser)]
#[command(name = "devlog", version, about = "A durable work journal for developers")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Capture a snapshot of the current repository into the journal
    Snap {
        /// Snapshot date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Project id override (defaults to remote URL or directory name)
        #[arg(long)]
        project: Option<String>,
        /// Light mode: commits and current branch only
        #[arg(long)]
        light: bool,
        /// Skip pull request fetch
        #[arg(long)]
        no_prs: bool,
        /// Skip ticket extraction
        #[arg(long)]
        no_tickets: bool,
        /// Attach a free-text note
        #[arg(long)]
        note: Option<String>,
        /// Attach a tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Output the saved snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Background snapshot for git hooks: never blocks, never fails
    Hook,
    /// Show one stored snapshot
    Show {
        /// Snapshot date (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Project id (defaults to the repository in the current directory)
        #[arg(long)]
        project: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List snapshots in a date range
    Log {
        /// Project id filter (all projects if omitted)
        #[arg(long)]
        project: Option<String>,
        /// Range start (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Range end (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Last N days instead of an explicit range
        #[arg(long)]
        days: Option<u32>,
        /// Output as JSON lines (one snapshot per line)
        #[arg(long)]
        json: bool,
    },
    /// Search the journal: "when did I last work on X"
    Recall {
        /// Free-text query
        query: Option<String>,
        /// Project id filter
        #[arg(long)]
        project: Option<String>,
        /// Range start (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Range end (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Tag filter (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Changed-file path filter
        #[arg(long)]
        file: Option<String>,
        /// Maximum results
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which days touched a file
    File {
        /// File path or basename fragment (case-insensitive)
        path: String,
        /// Project id filter
        #[arg(long)]
        project: Option<String>,
        /// Lookback window in days
        #[arg(long, default_value_t = 90)]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Attach a note and/or tags to today's record
    Note {
        /// Note text
        text: String,
        /// Tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Snapshot date (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Project id (defaults to the repository in the current directory)
        #[arg(long)]
        project: Option<String>,
    },
    /// List known projects
    Projects {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Journal statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete snapshots older than a cutoff. Irreversible.
    Prune {
        /// Keep snapshots from the last N days
        #[arg(long)]
        keep_days: u32,
        /// Preview without deleting
        #[arg(long)]
        dry_run: bool,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Read or write journal config
    Config {
        #[command(subcommand)]
        cmd: cmd_config::ConfigCmd,
    },
}

/// Open the journal at the configured root, creating it on first use.
fn open_journal() -> anyhow::Result<JournalStore> {
    let root = default_root();
    let config = JournalConfig::load_from(&root)?;
    Ok(JournalStore::open(config)?)
}

/// Resolve a project id for commands that default to "the repository
/// here": explicit flag first, then the cwd repository.
fn resolve_project(cwd: &std::path::Path, explicit: Option<&str>) -> anyhow::Result<String> {
    if let Some(p) = explicit {
        let slug = devlog_core::slug::project_slug(p);
        if slug.is_empty() {
            anyhow::bail!("project id {p:?} has no usable characters");
        }
        return Ok(slug);
    }
    let git = devlog_git::GitCli::new(cwd);
    if !git.is_repository() {
        anyhow::bail!("not inside a git repository; pass --project");
    }
    let remote = git.remote_url().unwrap_or(None);
    let root = git.repo_root().ok();
    devlog_snapshot::resolve_project_id(None, remote.as_deref(), root.as_deref())
        .ok_or_else(|| anyhow::anyhow!("cannot resolve a project identity here; pass --project"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    match cli.cmd {
        Command::Snap {
            date,
            project,
            light,
            no_prs,
            no_tickets,
            note,
            tags,
            json,
        } => cmd_snap::execute(&cmd_snap::SnapParams {
            cwd: &cwd,
            date: date.as_deref(),
            project: project.as_deref(),
            light,
            no_prs,
            no_tickets,
            note: note.as_deref(),
            tags,
            json,
        }),
        Command::Hook => cmd_hook::execute(&cwd),
        Command::Show { date, project, json } => {
            cmd_show::execute(&cwd, date.as_deref(), project.as_deref(), json)
        }
        Command::Log {
            project,
            from,
            to,
            days,
            json,
        } => cmd_log::execute(&cmd_log::LogParams {
            project: project.as_deref(),
            from: from.as_deref(),
            to: to.as_deref(),
            days,
            json,
        }),
        Command::Recall {
            query,
            project,
            from,
            to,
            tags,
            file,
            limit,
            json,
        } => cmd_recall::execute(&cmd_recall::RecallParams {
            query: query.as_deref(),
            project: project.as_deref(),
            from,
            to,
            tags,
            file,
            limit,
            json,
        }),
        Command::File {
            path,
            project,
            days,
            json,
        } => cmd_file::execute(&path, project.as_deref(), days, json),
        Command::Note {
            text,
            tags,
            date,
            project,
        } => cmd_note::execute(&cwd, &text, &tags, date.as_deref(), project.as_deref()),
        Command::Projects { json } => cmd_projects::execute(json),
        Command::Stats { json } => cmd_stats::execute(json),
        Command::Prune {
            keep_days,
            dry_run,
            force,
        } => cmd_prune::execute(keep_days, dry_run, force),
        Command::Config { cmd } => cmd_config::run(cmd),
    }
}
