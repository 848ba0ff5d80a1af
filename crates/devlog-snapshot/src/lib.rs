//! Snapshot assembly: gather branch/commit/PR/ticket/category facts from
//! independently-failing sources into one [`WorkSnapshot`]. A snapshot is
//! always produced if the repository itself is reachable; every other
//! source degrades to a warning plus a default value.

use devlog_core::{
    date, slug, BranchStatus, Category, DiffStats, FileChange, JournalCommit, WorkSnapshot,
    MAX_ACTIVE_BRANCHES, MAX_TOP_FILES,
};
use devlog_git::remote::RemoteProvider;
use devlog_git::{tickets, CommitInfo, RepoFacts};
use devlog_store::JournalStore;
use std::collections::HashMap;
use std::time::Instant;

/// Days of merged-PR history fetched in full mode.
const MERGED_PR_LOOKBACK_DAYS: i64 = 7;

/// Inputs to one assembly run.
#[derive(Debug, Clone, Default)]
pub struct AssembleOptions {
    /// Snapshot date; defaults to today (UTC).
    pub date: Option<String>,
    /// Project identity override.
    pub project: Option<String>,
    pub skip_prs: bool,
    pub skip_tickets: bool,
    /// Light mode: commits and current branch only, for low-latency
    /// background capture. Implies `skip_prs` and `skip_tickets`.
    pub light: bool,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

/// One assembled snapshot plus how assembly went.
#[derive(Debug)]
pub struct SnapshotResult {
    pub snapshot: WorkSnapshot,
    /// True if a record already exists for the resolved key. The actual
    /// merge happens in the store on save.
    pub merged: bool,
    pub warnings: Vec<String>,
    pub duration_ms: u64,
}

/// Gathers facts from injected providers. Holds no mutable state; one
/// instance can assemble any number of snapshots.
pub struct Assembler<'s> {
    store: &'s JournalStore,
    repo: Box<dyn RepoFacts>,
    remote: Option<Box<dyn RemoteProvider>>,
}

impl<'s> Assembler<'s> {
    pub fn new(
        store: &'s JournalStore,
        repo: Box<dyn RepoFacts>,
        remote: Option<Box<dyn RemoteProvider>>,
    ) -> Self {
        Self { store, repo, remote }
    }

    /// Produce one snapshot for the requested date/project. Fails only
    /// when the date is malformed or the repository is unreachable.
    pub fn assemble(&self, opts: &AssembleOptions) -> anyhow::Result<SnapshotResult> {
        let started = Instant::now();

        let snap_date = match &opts.date {
            Some(d) => {
                date::parse_date(d)?;
                d.clone()
            }
            None => date::today(),
        };

        if !self.repo.is_repository() {
            anyhow::bail!("not a git repository (and no repository facts to snapshot)");
        }

        let mut warnings = Vec::new();

        let repo_path = match self.repo.repo_root() {
            Ok(p) => Some(p),
            Err(e) => {
                warnings.push(format!("repository root unavailable: {e}"));
                None
            }
        };
        let remote_url = match self.repo.remote_url() {
            Ok(u) => u,
            Err(e) => {
                warnings.push(format!("remote url unavailable: {e}"));
                None
            }
        };

        let project_id = resolve_project_id(
            opts.project.as_deref(),
            remote_url.as_deref(),
            repo_path.as_deref(),
        )
        .ok_or_else(|| anyhow::anyhow!("cannot resolve a project identity for this repository"))?;

        let mut snap = WorkSnapshot::new(&snap_date, &project_id, &date::now_rfc3339());
        snap.repo_path = repo_path.map(|p| p.display().to_string());
        snap.remote_url = remote_url;
        snap.notes = opts.notes.clone();
        snap.tags = opts.tags.clone();

        match self.repo.current_branch() {
            Ok(b) => snap.current_branch = b,
            Err(e) => warnings.push(format!("current branch unavailable: {e}")),
        }

        // Commits scoped to the snapshot date, plus a wider context window.
        let day_start = format!("{snap_date}T00:00:00Z");
        let day_end = format!("{snap_date}T23:59:59Z");
        match self.repo.commits_in_range(&day_start, &day_end) {
            Ok(commits) => snap.today_commits = to_journal_commits(commits),
            Err(e) => warnings.push(format!("today's commits unavailable: {e}")),
        }
        match date::minus_days(&snap_date, i64::from(self.store.config().lookback_days)) {
            Ok(lookback_start) => {
                let start = format!("{lookback_start}T00:00:00Z");
                match self.repo.commits_in_range(&start, &day_end) {
                    Ok(commits) => snap.recent_commits = to_journal_commits(commits),
                    Err(e) => warnings.push(format!("recent commits unavailable: {e}")),
                }
            }
            Err(e) => warnings.push(format!("lookback window: {e}")),
        }

        self.gather_branches(&mut snap, opts.light, &mut warnings);
        self.gather_diff_stats(&mut snap, &mut warnings);

        let fetch_prs = !opts.light && !opts.skip_prs && self.store.config().fetch_prs;
        if fetch_prs {
            self.gather_pull_requests(&mut snap, &snap_date, &mut warnings);
        }

        let fetch_tickets = !opts.light && !opts.skip_tickets && self.store.config().fetch_tickets;
        if fetch_tickets {
            let mut sources: Vec<String> =
                snap.active_branches.iter().map(|b| b.name.clone()).collect();
            sources.push(snap.current_branch.clone());
            sources.extend(snap.today_commits.iter().map(|c| c.message.clone()));
            sources.extend(snap.recent_commits.iter().map(|c| c.message.clone()));
            snap.tickets = tickets::extract_ticket_refs(&sources);
        }

        let all_changed: Vec<String> = snap
            .today_commits
            .iter()
            .chain(snap.recent_commits.iter())
            .flat_map(|c| c.changed_files.iter().cloned())
            .collect();
        let changed_refs: Vec<&str> = all_changed.iter().map(String::as_str).collect();
        snap.categories = derive_categories(&changed_refs);
        snap.top_changed_files = top_files(&changed_refs);

        let merged = self.store.get(&snap_date, &project_id).is_ok();

        Ok(SnapshotResult {
            snapshot: snap,
            merged,
            warnings,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    fn gather_branches(&self, snap: &mut WorkSnapshot, light: bool, warnings: &mut Vec<String>) {
        let uncommitted = match self.repo.uncommitted_files() {
            Ok(files) => files,
            Err(e) => {
                warnings.push(format!("working tree status unavailable: {e}"));
                Vec::new()
            }
        };
        let ahead = self.repo.ahead_of_upstream().unwrap_or(false);

        if light {
            // Current branch only; enough for WIP detection.
            if !snap.current_branch.is_empty() {
                let last = snap
                    .today_commits
                    .first()
                    .or_else(|| snap.recent_commits.first())
                    .cloned();
                let status = BranchStatus {
                    name: snap.current_branch.clone(),
                    last_commit_hash: last.as_ref().map(|c| c.hash.clone()).unwrap_or_default(),
                    last_commit_message: last
                        .as_ref()
                        .map(|c| c.message.clone())
                        .unwrap_or_default(),
                    last_commit_date: last.map(|c| c.date).unwrap_or_default(),
                    ahead_of_base: ahead,
                    has_uncommitted: !uncommitted.is_empty(),
                    uncommitted_files: uncommitted,
                };
                snap.active_branches.push(status);
            }
            return;
        }

        match self.repo.branch_list() {
            Ok(branches) => {
                snap.active_branches = branches
                    .into_iter()
                    .take(MAX_ACTIVE_BRANCHES)
                    .map(|b| {
                        let is_current = b.name == snap.current_branch;
                        BranchStatus {
                            name: b.name,
                            last_commit_hash: b.last_commit_hash,
                            last_commit_message: b.last_commit_message,
                            last_commit_date: b.last_commit_date,
                            ahead_of_base: is_current && ahead,
                            has_uncommitted: is_current && !uncommitted.is_empty(),
                            uncommitted_files: if is_current {
                                uncommitted.clone()
                            } else {
                                Vec::new()
                            },
                        }
                    })
                    .collect();
            }
            Err(e) => warnings.push(format!("branch list unavailable: {e}")),
        }
    }

    fn gather_diff_stats(&self, snap: &mut WorkSnapshot, warnings: &mut Vec<String>) {
        // Diff across the day's commits: oldest's parent to newest.
        let (Some(newest), Some(oldest)) = (snap.today_commits.first(), snap.today_commits.last())
        else {
            return;
        };
        let base = format!("{}~1", oldest.hash);
        match self.repo.diff_stats(&base, &newest.hash) {
            Ok(stats) if stats != DiffStats::default() => snap.diff_stats = Some(stats),
            Ok(_) => {}
            Err(e) => warnings.push(format!("diff stats unavailable: {e}")),
        }
    }

    fn gather_pull_requests(
        &self,
        snap: &mut WorkSnapshot,
        snap_date: &str,
        warnings: &mut Vec<String>,
    ) {
        let Some(remote) = &self.remote else {
            warnings.push("no remote provider configured; skipping pull requests".to_string());
            return;
        };
        match remote.list_open_prs() {
            Ok(prs) => push_prs(&mut snap.pull_requests, prs),
            Err(e) => warnings.push(format!("open PRs unavailable: {e}")),
        }
        match date::minus_days(snap_date, MERGED_PR_LOOKBACK_DAYS) {
            Ok(since) => match remote.list_merged_prs_since(&since) {
                Ok(prs) => push_prs(&mut snap.pull_requests, prs),
                Err(e) => warnings.push(format!("merged PRs unavailable: {e}")),
            },
            Err(e) => warnings.push(format!("merged PR window: {e}")),
        }
    }
}

/// Identity resolution order: explicit override, then owner/repo parsed
/// from the remote URL, then the repository root directory name.
pub fn resolve_project_id(
    override_id: Option<&str>,
    remote_url: Option<&str>,
    repo_root: Option<&std::path::Path>,
) -> Option<String> {
    if let Some(id) = override_id {
        let s = slug::project_slug(id);
        if !s.is_empty() {
            return Some(s);
        }
    }
    if let Some(url) = remote_url {
        if let Some(s) = slug::slug_from_remote_url(url) {
            return Some(s);
        }
    }
    if let Some(root) = repo_root {
        let name = root.file_name()?.to_str()?;
        let s = slug::project_slug(name);
        if !s.is_empty() {
            return Some(s);
        }
    }
    None
}

fn to_journal_commits(commits: Vec<CommitInfo>) -> Vec<JournalCommit> {
    commits
        .into_iter()
        .map(|c| JournalCommit {
            short_hash: c.hash.chars().take(7).collect(),
            hash: c.hash,
            message: c.message,
            author: c.author,
            date: c.date,
            changed_files: c.changed_files,
        })
        .collect()
}

fn push_prs(into: &mut Vec<devlog_core::PrSnapshot>, prs: Vec<devlog_core::PrSnapshot>) {
    for pr in prs {
        if !into.iter().any(|p| p.number == pr.number) {
            into.push(pr);
        }
    }
}

/// Work-area classification for a changed path.
pub fn categorize_path(path: &str) -> &'static str {
    let lower = path.to_lowercase();
    let has_dir = |d: &str| lower.starts_with(&format!("{d}/")) || lower.contains(&format!("/{d}/"));

    if has_dir("tests") || has_dir("test") || lower.contains(".test.") || lower.contains("_test.") {
        "tests"
    } else if lower.ends_with(".md") || has_dir("docs") || has_dir("doc") {
        "docs"
    } else if lower.ends_with(".yml")
        || lower.ends_with(".yaml")
        || lower.ends_with(".tf")
        || lower.contains("dockerfile")
        || has_dir(".github")
        || lower.starts_with(".github/")
        || has_dir("infra")
        || has_dir("deploy")
    {
        "infra"
    } else if lower.ends_with(".tsx")
        || lower.ends_with(".jsx")
        || lower.ends_with(".css")
        || lower.ends_with(".scss")
        || lower.ends_with(".html")
        || lower.ends_with(".vue")
        || lower.ends_with(".svelte")
        || has_dir("frontend")
        || has_dir("components")
    {
        "frontend"
    } else if lower.ends_with(".rs")
        || lower.ends_with(".go")
        || lower.ends_with(".py")
        || lower.ends_with(".rb")
        || lower.ends_with(".java")
        || lower.ends_with(".ts")
        || lower.ends_with(".js")
        || has_dir("backend")
        || has_dir("server")
        || has_dir("api")
    {
        "backend"
    } else {
        "other"
    }
}

/// Proportion of changed files per work area. Percentages are rounded
/// down, so they sum to at most 100.
pub fn derive_categories(paths: &[&str]) -> Vec<Category> {
    if paths.is_empty() {
        return Vec::new();
    }
    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    for path in paths {
        *counts.entry(categorize_path(path)).or_default() += 1;
    }
    let total = paths.len();
    let mut categories: Vec<Category> = counts
        .into_iter()
        .map(|(name, count)| Category {
            name: name.to_string(),
            percentage: (count * 100 / total) as u8,
        })
        .collect();
    categories.sort_by(|a, b| b.percentage.cmp(&a.percentage).then(a.name.cmp(&b.name)));
    categories
}

/// Change frequency per path, sorted descending, capped.
pub fn top_files(paths: &[&str]) -> Vec<FileChange> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for path in paths {
        *counts.entry(path).or_default() += 1;
    }
    let mut files: Vec<FileChange> = counts
        .into_iter()
        .map(|(path, frequency)| FileChange {
            path: path.to_string(),
            frequency,
        })
        .collect();
    files.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.path.cmp(&b.path)));
    files.truncate(MAX_TOP_FILES);
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use devlog_core::PrState;
    use devlog_git::BranchInfo;
    use devlog_store::JournalConfig;
    use std::path::{Path, PathBuf};

    // ── Fakes ──

    #[derive(Default)]
    struct FakeRepo {
        is_repo: bool,
        branch_list_fails: bool,
        commits: Vec<CommitInfo>,
        uncommitted: Vec<String>,
        remote_url: Option<String>,
    }

    impl RepoFacts for FakeRepo {
        fn is_repository(&self) -> bool {
            self.is_repo
        }
        fn repo_root(&self) -> anyhow::Result<PathBuf> {
            Ok(PathBuf::from("/home/dev/acme-api"))
        }
        fn current_branch(&self) -> anyhow::Result<String> {
            Ok("feat/PROJ-42-login".to_string())
        }
        fn remote_url(&self) -> anyhow::Result<Option<String>> {
            Ok(self.remote_url.clone())
        }
        fn commits_in_range(&self, _since: &str, _until: &str) -> anyhow::Result<Vec<CommitInfo>> {
            Ok(self.commits.clone())
        }
        fn changed_files(&self, _base: &str, _head: &str) -> anyhow::Result<Vec<String>> {
            Ok(vec![])
        }
        fn diff_stats(&self, _base: &str, _head: &str) -> anyhow::Result<DiffStats> {
            Ok(DiffStats {
                files_changed: 2,
                insertions: 10,
                deletions: 1,
            })
        }
        fn branch_list(&self) -> anyhow::Result<Vec<BranchInfo>> {
            if self.branch_list_fails {
                anyhow::bail!("ref store exploded");
            }
            Ok(vec![BranchInfo {
                name: "feat/PROJ-42-login".into(),
                last_commit_hash: "abc".into(),
                last_commit_message: "wip".into(),
                last_commit_date: "2026-02-10T09:00:00+00:00".into(),
            }])
        }
        fn uncommitted_files(&self) -> anyhow::Result<Vec<String>> {
            Ok(self.uncommitted.clone())
        }
        fn ahead_of_upstream(&self) -> anyhow::Result<bool> {
            Ok(false)
        }
    }

    struct FakeRemote {
        fails: bool,
    }

    impl RemoteProvider for FakeRemote {
        fn list_open_prs(&self) -> anyhow::Result<Vec<devlog_core::PrSnapshot>> {
            if self.fails {
                anyhow::bail!("network down");
            }
            Ok(vec![devlog_core::PrSnapshot {
                number: 42,
                title: "Add login".into(),
                state: PrState::Open,
                url: String::new(),
                base_branch: "main".into(),
                head_branch: "feat/PROJ-42-login".into(),
                labels: vec![],
            }])
        }
        fn list_merged_prs_since(&self, _date: &str) -> anyhow::Result<Vec<devlog_core::PrSnapshot>> {
            if self.fails {
                anyhow::bail!("network down");
            }
            Ok(vec![])
        }
    }

    fn commit(hash: &str, message: &str, files: &[&str]) -> CommitInfo {
        CommitInfo {
            hash: hash.into(),
            message: message.into(),
            author: "dev".into(),
            date: "2026-02-10T09:00:00+00:00".into(),
            changed_files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn open_store(tmp: &tempfile::TempDir) -> JournalStore {
        JournalStore::open(JournalConfig {
            root: Some(tmp.path().to_path_buf()),
            ..JournalConfig::default()
        })
        .unwrap()
    }

    // ── Assembly ──

    #[test]
    fn assembles_full_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(&tmp);
        let repo = FakeRepo {
            is_repo: true,
            commits: vec![commit("abc1234567", "fix login PROJ-42", &["src/auth.ts"])],
            uncommitted: vec!["src/wip.ts".into()],
            remote_url: Some("git@github.com:acme/api.git".into()),
            ..FakeRepo::default()
        };
        let assembler = Assembler::new(&store, Box::new(repo), Some(Box::new(FakeRemote { fails: false })));

        let result = assembler
            .assemble(&AssembleOptions {
                date: Some("2026-02-10".into()),
                ..AssembleOptions::default()
            })
            .unwrap();

        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert!(!result.merged);
        let s = &result.snapshot;
        assert_eq!(s.project_id, "acme-api");
        assert_eq!(s.today_commits.len(), 1);
        assert_eq!(s.today_commits[0].short_hash, "abc1234");
        assert_eq!(s.pull_requests.len(), 1);
        assert!(s.tickets.iter().any(|t| t.id == "PROJ-42"));
        assert!(s.active_branches[0].has_uncommitted);
        assert_eq!(s.diff_stats.unwrap().insertions, 10);
    }

    #[test]
    fn source_failure_becomes_warning_not_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(&tmp);
        let repo = FakeRepo {
            is_repo: true,
            branch_list_fails: true,
            ..FakeRepo::default()
        };
        let assembler = Assembler::new(&store, Box::new(repo), Some(Box::new(FakeRemote { fails: true })));

        let result = assembler
            .assemble(&AssembleOptions {
                date: Some("2026-02-10".into()),
                ..AssembleOptions::default()
            })
            .unwrap();

        assert!(result.snapshot.active_branches.is_empty());
        assert!(result.snapshot.pull_requests.is_empty());
        assert!(result.warnings.iter().any(|w| w.contains("branch list")));
        assert!(result.warnings.iter().any(|w| w.contains("open PRs")));
    }

    #[test]
    fn not_a_repository_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(&tmp);
        let assembler = Assembler::new(&store, Box::new(FakeRepo::default()), None);
        assert!(assembler.assemble(&AssembleOptions::default()).is_err());
    }

    #[test]
    fn bad_date_rejected_before_io() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(&tmp);
        let assembler = Assembler::new(&store, Box::new(FakeRepo::default()), None);
        let err = assembler
            .assemble(&AssembleOptions {
                date: Some("02/10/2026".into()),
                ..AssembleOptions::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("invalid date"));
    }

    #[test]
    fn light_mode_skips_remote_sources() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(&tmp);
        let repo = FakeRepo {
            is_repo: true,
            commits: vec![commit("abc1234567", "wip", &[])],
            uncommitted: vec!["x.rs".into()],
            ..FakeRepo::default()
        };
        // A failing remote must not even be consulted.
        let assembler = Assembler::new(&store, Box::new(repo), Some(Box::new(FakeRemote { fails: true })));

        let result = assembler
            .assemble(&AssembleOptions {
                date: Some("2026-02-10".into()),
                light: true,
                ..AssembleOptions::default()
            })
            .unwrap();

        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert!(result.snapshot.pull_requests.is_empty());
        assert!(result.snapshot.tickets.is_empty());
        // Only the current branch is enumerated.
        assert_eq!(result.snapshot.active_branches.len(), 1);
        assert!(result.snapshot.active_branches[0].has_uncommitted);
    }

    #[test]
    fn merged_flag_reports_existing_record() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(&tmp);
        store
            .save(WorkSnapshot::new("2026-02-10", "acme-api", "2026-02-10T08:00:00Z"))
            .unwrap();

        let repo = FakeRepo {
            is_repo: true,
            remote_url: Some("git@github.com:acme/api.git".into()),
            ..FakeRepo::default()
        };
        let assembler = Assembler::new(&store, Box::new(repo), None);
        let result = assembler
            .assemble(&AssembleOptions {
                date: Some("2026-02-10".into()),
                skip_prs: true,
                skip_tickets: true,
                ..AssembleOptions::default()
            })
            .unwrap();
        assert!(result.merged);
    }

    // ── Identity ──

    #[test]
    fn identity_resolution_order() {
        let root = Path::new("/home/dev/My Repo");
        assert_eq!(
            resolve_project_id(Some("Custom Name"), Some("git@github.com:a/b.git"), Some(root)),
            Some("custom-name".into())
        );
        assert_eq!(
            resolve_project_id(None, Some("git@github.com:a/b.git"), Some(root)),
            Some("a-b".into())
        );
        assert_eq!(resolve_project_id(None, None, Some(root)), Some("my-repo".into()));
        assert_eq!(resolve_project_id(None, None, None), None);
    }

    // ── Derivations ──

    #[test]
    fn categorize_paths_by_area() {
        assert_eq!(categorize_path("src/components/Button.tsx"), "frontend");
        assert_eq!(categorize_path("server/handlers/auth.rs"), "backend");
        assert_eq!(categorize_path("docs/setup.md"), "docs");
        assert_eq!(categorize_path(".github/workflows/ci.yml"), "infra");
        assert_eq!(categorize_path("tests/login_test.py"), "tests");
        assert_eq!(categorize_path("LICENSE"), "other");
    }

    #[test]
    fn categories_sum_at_most_100() {
        let paths = ["a.rs", "b.rs", "c.tsx", "d.md", "e.yml", "LICENSE", "x.go"];
        let cats = derive_categories(&paths);
        let sum: u32 = cats.iter().map(|c| u32::from(c.percentage)).sum();
        assert!(sum <= 100, "sum was {sum}");
        assert_eq!(cats[0].name, "backend");
    }

    #[test]
    fn top_files_counts_and_caps() {
        let mut paths = vec!["src/hot.rs"; 5];
        for _ in 0..3 {
            paths.push("src/warm.rs");
        }
        let files = top_files(&paths);
        assert_eq!(files[0].path, "src/hot.rs");
        assert_eq!(files[0].frequency, 5);
        assert_eq!(files[1].frequency, 3);

        let many: Vec<String> = (0..40).map(|i| format!("src/f{i}.rs")).collect();
        let refs: Vec<&str> = many.iter().map(String::as_str).collect();
        assert_eq!(top_files(&refs).len(), MAX_TOP_FILES);
    }
}
