pub mod remote;
pub mod tickets;

use devlog_core::DiffStats;
use std::path::PathBuf;
use std::process::Command;

/// Unit separator used in `git log`/`for-each-ref` format strings so
/// field parsing never trips over commit message content.
const US: char = '\u{1f}';
/// Record separator between log entries.
const RS: char = '\u{1e}';

/// One commit as reported by the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub date: String,
    pub changed_files: Vec<String>,
}

/// One local branch head.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchInfo {
    pub name: String,
    pub last_commit_hash: String,
    pub last_commit_message: String,
    pub last_commit_date: String,
}

/// Facts the assembler consumes from a repository. Every call may fail;
/// the assembler treats each failure as a per-source warning, never as a
/// fatal error.
pub trait RepoFacts {
    fn is_repository(&self) -> bool;
    fn repo_root(&self) -> anyhow::Result<PathBuf>;
    fn current_branch(&self) -> anyhow::Result<String>;
    /// The `origin` remote URL, if any remote is configured.
    fn remote_url(&self) -> anyhow::Result<Option<String>>;
    /// Commits authored in `[since, until]`, newest first, with changed
    /// file lists. Bounds are passed through to `git log --since/--until`.
    fn commits_in_range(&self, since: &str, until: &str) -> anyhow::Result<Vec<CommitInfo>>;
    /// Paths changed between two revisions.
    fn changed_files(&self, base: &str, head: &str) -> anyhow::Result<Vec<String>>;
    /// Aggregate diff counters between two revisions.
    fn diff_stats(&self, base: &str, head: &str) -> anyhow::Result<DiffStats>;
    /// All local branch heads, most recently committed first.
    fn branch_list(&self) -> anyhow::Result<Vec<BranchInfo>>;
    /// Paths with uncommitted changes in the working tree.
    fn uncommitted_files(&self) -> anyhow::Result<Vec<String>>;
    /// Whether HEAD is ahead of its upstream.
    fn ahead_of_upstream(&self) -> anyhow::Result<bool>;
}

/// `RepoFacts` backed by the `git` CLI.
pub struct GitCli {
    cwd: PathBuf,
}

impl GitCli {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    fn git(&self, args: &[&str]) -> anyhow::Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.cwd)
            .output()
            .map_err(|e| anyhow::anyhow!("git not available: {e}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "git {} failed: {}",
                args.first().unwrap_or(&""),
                stderr.trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl RepoFacts for GitCli {
    fn is_repository(&self) -> bool {
        self.git(&["rev-parse", "--is-inside-work-tree"])
            .map(|out| out.trim() == "true")
            .unwrap_or(false)
    }

    fn repo_root(&self) -> anyhow::Result<PathBuf> {
        let out = self.git(&["rev-parse", "--show-toplevel"])?;
        Ok(PathBuf::from(out.trim()))
    }

    fn current_branch(&self) -> anyhow::Result<String> {
        let out = self.git(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(out.trim().to_string())
    }

    fn remote_url(&self) -> anyhow::Result<Option<String>> {
        // No remote configured is a normal state, not an error.
        match self.git(&["remote", "get-url", "origin"]) {
            Ok(out) => {
                let url = out.trim().to_string();
                Ok(if url.is_empty() { None } else { Some(url) })
            }
            Err(_) => Ok(None),
        }
    }

    fn commits_in_range(&self, since: &str, until: &str) -> anyhow::Result<Vec<CommitInfo>> {
        // Leading RS so each record carries its own file list.
        let format = format!("{RS}%H{US}%s{US}%an{US}%cI");
        let since_arg = format!("--since={since}");
        let until_arg = format!("--until={until}");
        let pretty = format!("--pretty=format:{format}");
        let out = self.git(&["log", &since_arg, &until_arg, &pretty, "--name-only"])?;
        Ok(parse_log(&out))
    }

    fn changed_files(&self, base: &str, head: &str) -> anyhow::Result<Vec<String>> {
        let range = format!("{base}..{head}");
        let out = self.git(&["diff", "--name-only", &range])?;
        Ok(out.lines().map(str::to_string).filter(|l| !l.is_empty()).collect())
    }

    fn diff_stats(&self, base: &str, head: &str) -> anyhow::Result<DiffStats> {
        let range = format!("{base}..{head}");
        let out = self.git(&["diff", "--shortstat", &range])?;
        Ok(parse_shortstat(&out))
    }

    fn branch_list(&self) -> anyhow::Result<Vec<BranchInfo>> {
        let format = format!(
            "%(refname:short){US}%(objectname){US}%(subject){US}%(committerdate:iso-strict)"
        );
        let format_arg = format!("--format={format}");
        let out = self.git(&[
            "for-each-ref",
            "refs/heads",
            "--sort=-committerdate",
            &format_arg,
        ])?;
        Ok(parse_branch_refs(&out))
    }

    fn uncommitted_files(&self) -> anyhow::Result<Vec<String>> {
        let out = self.git(&["status", "--porcelain"])?;
        Ok(parse_porcelain_status(&out))
    }

    fn ahead_of_upstream(&self) -> anyhow::Result<bool> {
        let out = self.git(&["rev-list", "--count", "@{upstream}..HEAD"])?;
        let count: u32 = out.trim().parse().unwrap_or(0);
        Ok(count > 0)
    }
}

// ── Output parsing (pure) ──

/// Parse `git log --pretty=format:<RS>%H<US>%s<US>%an<US>%cI --name-only`.
pub fn parse_log(out: &str) -> Vec<CommitInfo> {
    let mut commits = Vec::new();
    for record in out.split(RS) {
        let record = record.trim_matches('\n');
        if record.trim().is_empty() {
            continue;
        }
        let (header, files) = match record.split_once('\n') {
            Some((h, f)) => (h, f),
            None => (record, ""),
        };
        let mut fields = header.split(US);
        let (Some(hash), Some(message), Some(author), Some(date)) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        commits.push(CommitInfo {
            hash: hash.to_string(),
            message: message.to_string(),
            author: author.to_string(),
            date: date.to_string(),
            changed_files: files
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        });
    }
    commits
}

/// Parse `git diff --shortstat` output, e.g.
/// ` 3 files changed, 45 insertions(+), 12 deletions(-)`.
pub fn parse_shortstat(out: &str) -> DiffStats {
    let mut stats = DiffStats::default();
    for part in out.trim().split(',') {
        let part = part.trim();
        let Some(n) = part.split_whitespace().next().and_then(|w| w.parse::<u32>().ok()) else {
            continue;
        };
        if part.contains("file") {
            stats.files_changed = n;
        } else if part.contains("insertion") {
            stats.insertions = n;
        } else if part.contains("deletion") {
            stats.deletions = n;
        }
    }
    stats
}

/// Parse `git status --porcelain` into changed paths.
pub fn parse_porcelain_status(out: &str) -> Vec<String> {
    out.lines()
        .filter(|line| line.len() > 3)
        .map(|line| {
            let path = line[3..].trim();
            // Renames show as "old -> new"; keep the new path.
            match path.split_once(" -> ") {
                Some((_, new)) => new.to_string(),
                None => path.to_string(),
            }
        })
        .collect()
}

/// Parse `git for-each-ref` output into branch heads.
pub fn parse_branch_refs(out: &str) -> Vec<BranchInfo> {
    out.lines()
        .filter_map(|line| {
            let mut fields = line.split(US);
            Some(BranchInfo {
                name: fields.next()?.to_string(),
                last_commit_hash: fields.next()?.to_string(),
                last_commit_message: fields.next()?.to_string(),
                last_commit_date: fields.next()?.to_string(),
            })
        })
        .collect()
}
