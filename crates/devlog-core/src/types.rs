use serde::{Deserialize, Serialize};

/// Current schema version for persisted snapshots.
pub const SCHEMA_VERSION: u32 = 1;

/// Calendar date key, `YYYY-MM-DD`.
pub type DateKey = String;

/// Project identity slug (e.g. "acme-api").
pub type ProjectId = String;

/// Active branches kept per snapshot.
pub const MAX_ACTIVE_BRANCHES: usize = 30;

/// Top changed files kept per snapshot.
pub const MAX_TOP_FILES: usize = 20;

/// One commit as recorded in the journal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalCommit {
    pub hash: String,
    pub short_hash: String,
    pub message: String,
    pub author: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed_files: Vec<String>,
}

/// State of one local branch at capture time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchStatus {
    pub name: String,
    pub last_commit_hash: String,
    pub last_commit_message: String,
    pub last_commit_date: String,
    #[serde(default)]
    pub ahead_of_base: bool,
    #[serde(default)]
    pub has_uncommitted: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uncommitted_files: Vec<String>,
}

/// Pull request state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

/// One pull request as observed from the remote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrSnapshot {
    pub number: u64,
    pub title: String,
    pub state: PrState,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_branch: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub head_branch: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

/// One ticket reference. Identity is the `id` string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketSnapshot {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ticket_type: String,
}

/// Proportion of changed files in one work area.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub name: String,
    pub percentage: u8,
}

/// Change frequency of a single path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileChange {
    pub path: String,
    pub frequency: u32,
}

/// Aggregate diff counters for the snapshot date.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffStats {
    pub files_changed: u32,
    pub insertions: u32,
    pub deletions: u32,
}

/// One persisted journal record: repository activity for a single
/// (calendar date, project) pair. Exactly one exists per key; writes for
/// an existing key go through [`crate::merge::merge_into`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkSnapshot {
    pub date: DateKey,
    pub taken_at: String,
    pub project_id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_branch: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active_branches: Vec<BranchStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub today_commits: Vec<JournalCommit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_commits: Vec<JournalCommit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pull_requests: Vec<PrSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tickets: Vec<TicketSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_changed_files: Vec<FileChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_stats: Option<DiffStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub schema_version: u32,
}

impl WorkSnapshot {
    /// A blank snapshot for a key. Fields are filled in by the assembler.
    pub fn new(date: &str, project_id: &str, taken_at: &str) -> Self {
        Self {
            date: date.to_string(),
            taken_at: taken_at.to_string(),
            project_id: project_id.to_string(),
            repo_path: None,
            remote_url: None,
            current_branch: String::new(),
            active_branches: Vec::new(),
            today_commits: Vec::new(),
            recent_commits: Vec::new(),
            pull_requests: Vec::new(),
            tickets: Vec::new(),
            categories: Vec::new(),
            top_changed_files: Vec::new(),
            diff_stats: None,
            notes: None,
            tags: Vec::new(),
            schema_version: SCHEMA_VERSION,
        }
    }
}

/// Normalize a tag for storage: lowercased and trimmed. Returns `None`
/// for tags that are empty after trimming.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let t = tag.trim().to_lowercase();
    if t.is_empty() {
        None
    } else {
        Some(t)
    }
}

/// Derived per-project roll-up, computed on demand (never stored).
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub project_id: ProjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<String>,
    pub last_snapshot_date: DateKey,
    pub snapshot_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_roundtrips_through_json() {
        let mut snap = WorkSnapshot::new("2026-02-10", "acme", "2026-02-10T09:30:00Z");
        snap.current_branch = "main".into();
        snap.today_commits.push(JournalCommit {
            hash: "a1b2c3d4e5".into(),
            short_hash: "a1b2c3d".into(),
            message: "fix login redirect".into(),
            author: "dev".into(),
            date: "2026-02-10T09:00:00Z".into(),
            changed_files: vec!["src/auth.ts".into()],
        });
        snap.tags = vec!["has-wip".into()];

        let json = serde_json::to_string_pretty(&snap).unwrap();
        let back: WorkSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.date, "2026-02-10");
        assert_eq!(back.project_id, "acme");
        assert_eq!(back.today_commits.len(), 1);
        assert_eq!(back.today_commits[0], snap.today_commits[0]);
        assert_eq!(back.tags, vec!["has-wip"]);
    }

    #[test]
    fn empty_collections_are_omitted_from_json() {
        let snap = WorkSnapshot::new("2026-02-10", "acme", "2026-02-10T09:30:00Z");
        let json = serde_json::to_string(&snap).unwrap();
        assert!(!json.contains("pull_requests"));
        assert!(!json.contains("notes"));
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        // Forward compatibility: a newer writer may add fields.
        let json = r#"{"date":"2026-02-10","taken_at":"2026-02-10T09:30:00Z","project_id":"acme","future_field":42}"#;
        let snap: WorkSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.project_id, "acme");
    }

    #[test]
    fn pr_state_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PrState::Merged).unwrap(), "\"merged\"");
    }

    #[test]
    fn normalize_tag_lowercases_and_drops_empty() {
        assert_eq!(normalize_tag("  WIP "), Some("wip".into()));
        assert_eq!(normalize_tag("   "), None);
    }
}
