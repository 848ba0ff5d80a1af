//! Ranked recall: "when did I last work on X" retrieval over stored
//! snapshots. Scoring is a weighted sum of independent match signals;
//! ranking is score-descending with recency as the tie-break, and the
//! result limit is applied only after the full candidate set is ranked.

use devlog_core::{date, JournalCommit, WorkSnapshot};
use devlog_store::{JournalStore, StoreError};
use serde::Serialize;

/// Match signal weights.
pub mod weight {
    pub const COMMIT_MESSAGE: f32 = 3.0;
    pub const PR_TITLE: f32 = 2.5;
    pub const NOTE: f32 = 2.0;
    pub const TAG_EXACT: f32 = 3.0;
    pub const TAG_PARTIAL: f32 = 1.5;
    pub const FILE_PATH: f32 = 2.0;
}

/// Days searched when no explicit range is given.
const DEFAULT_SEARCH_LOOKBACK_DAYS: i64 = 365;

/// What to search for. All criteria are optional; [`Self::is_empty`]
/// tells the caller when a usage/stats display is the right response
/// instead of an empty result list.
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    pub text: Option<String>,
    pub project: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub tags: Vec<String>,
    pub file: Option<String>,
    pub limit: usize,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            text: None,
            project: None,
            from: None,
            to: None,
            tags: Vec::new(),
            file: None,
            limit: 10,
        }
    }
}

impl SearchCriteria {
    /// True when there is nothing to score on (no text, tags, or file).
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().map_or(true, |t| t.trim().is_empty())
            && self.tags.is_empty()
            && self.file.as_deref().map_or(true, |f| f.trim().is_empty())
    }
}

/// One scored snapshot.
#[derive(Debug, Serialize)]
pub struct RankedResult {
    pub snapshot: WorkSnapshot,
    pub score: f32,
    /// Which signals fired, for display.
    pub match_reasons: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct SearchResults {
    pub results: Vec<RankedResult>,
    pub warnings: Vec<String>,
}

/// Commits touching one file on one date.
#[derive(Debug, Serialize)]
pub struct FileHistoryEntry {
    pub date: String,
    pub project_id: String,
    pub commits: Vec<JournalCommit>,
}

/// Rank stored snapshots against `criteria`.
pub fn search(store: &JournalStore, criteria: &SearchCriteria) -> Result<SearchResults, StoreError> {
    if criteria.is_empty() {
        return Err(StoreError::invalid(
            "search needs text, tags, or a file to match on",
        ));
    }

    let from = match &criteria.from {
        Some(f) => f.clone(),
        None => date::days_ago(DEFAULT_SEARCH_LOOKBACK_DAYS),
    };
    let to = match &criteria.to {
        Some(t) => t.clone(),
        None => date::today(),
    };

    let range = store.get_range(criteria.project.as_deref(), &from, &to)?;
    let mut results: Vec<RankedResult> = range
        .snapshots
        .into_iter()
        .filter_map(|snap| {
            score_snapshot(&snap, criteria).map(|(score, match_reasons)| RankedResult {
                snapshot: snap,
                score,
                match_reasons,
            })
        })
        .collect();

    // Rank fully, then cut: the limit must never hide a higher-scoring
    // older result behind a lower-scoring recent one.
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.snapshot.date.cmp(&a.snapshot.date))
    });
    results.truncate(criteria.limit);

    Ok(SearchResults {
        results,
        warnings: range.warnings,
    })
}

/// Score one snapshot. Returns `None` when nothing matched. Each signal
/// contributes its weight once, however many hits it has; the hit count
/// goes into the reason string.
pub fn score_snapshot(snap: &WorkSnapshot, criteria: &SearchCriteria) -> Option<(f32, Vec<String>)> {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    if let Some(text) = criteria.text.as_deref().filter(|t| !t.trim().is_empty()) {
        let needle = text.to_lowercase();

        let commit_hits = all_commits(snap)
            .filter(|c| c.message.to_lowercase().contains(&needle))
            .count();
        if commit_hits > 0 {
            score += weight::COMMIT_MESSAGE;
            reasons.push(format!("{commit_hits} commit message(s) mention {text:?}"));
        }

        let pr_hits = snap
            .pull_requests
            .iter()
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .count();
        if pr_hits > 0 {
            score += weight::PR_TITLE;
            reasons.push(format!("{pr_hits} PR title(s) mention {text:?}"));
        }

        if snap
            .notes
            .as_deref()
            .is_some_and(|n| n.to_lowercase().contains(&needle))
        {
            score += weight::NOTE;
            reasons.push(format!("notes mention {text:?}"));
        }

        let tag_hits = snap
            .tags
            .iter()
            .filter(|t| t.to_lowercase().contains(&needle))
            .count();
        if tag_hits > 0 {
            score += weight::TAG_PARTIAL;
            reasons.push(format!("{tag_hits} tag(s) match {text:?}"));
        }

        let file_hits = changed_paths(snap)
            .filter(|p| p.to_lowercase().contains(&needle))
            .count();
        if file_hits > 0 {
            score += weight::FILE_PATH;
            reasons.push(format!("{file_hits} changed file(s) match {text:?}"));
        }
    }

    for tag in &criteria.tags {
        let wanted = tag.to_lowercase();
        if snap.tags.iter().any(|t| t.to_lowercase() == wanted) {
            score += weight::TAG_EXACT;
            reasons.push(format!("tagged {wanted:?}"));
        } else if snap.tags.iter().any(|t| t.to_lowercase().contains(&wanted)) {
            score += weight::TAG_PARTIAL;
            reasons.push(format!("tag contains {wanted:?}"));
        }
    }

    if let Some(file) = criteria.file.as_deref().filter(|f| !f.trim().is_empty()) {
        let needle = file.to_lowercase();
        let hits = changed_paths(snap)
            .filter(|p| p.to_lowercase().contains(&needle))
            .count();
        if hits > 0 {
            score += weight::FILE_PATH;
            reasons.push(format!("{hits} changed file(s) match {file:?}"));
        }
    }

    if score > 0.0 {
        Some((score, reasons))
    } else {
        None
    }
}

/// Per-date history of commits touching a path. Supports partial and
/// basename queries (`auth.ts` matches `src/auth.ts`), case-insensitive.
/// Most recent date first; sorted fully before any truncation by the
/// caller.
pub fn find_file_history(
    store: &JournalStore,
    file: &str,
    project: Option<&str>,
    lookback_days: u32,
) -> Result<Vec<FileHistoryEntry>, StoreError> {
    if file.trim().is_empty() {
        return Err(StoreError::invalid("file path must not be empty"));
    }
    if lookback_days == 0 {
        return Err(StoreError::invalid("lookback days must be positive"));
    }

    let from = date::days_ago(i64::from(lookback_days));
    let to = date::today();
    let needle = file.to_lowercase();

    let range = store.get_range(project, &from, &to)?;
    let mut entries: Vec<FileHistoryEntry> = Vec::new();
    for snap in range.snapshots {
        let mut commits: Vec<JournalCommit> = Vec::new();
        for commit in all_commits(&snap) {
            if commit
                .changed_files
                .iter()
                .any(|p| p.to_lowercase().contains(&needle))
                && !commits.iter().any(|c| c.hash == commit.hash)
            {
                commits.push(commit.clone());
            }
        }
        if !commits.is_empty() {
            entries.push(FileHistoryEntry {
                date: snap.date,
                project_id: snap.project_id,
                commits,
            });
        }
    }

    entries.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(entries)
}

fn all_commits(snap: &WorkSnapshot) -> impl Iterator<Item = &JournalCommit> {
    snap.today_commits.iter().chain(snap.recent_commits.iter())
}

fn changed_paths(snap: &WorkSnapshot) -> impl Iterator<Item = &String> {
    all_commits(snap)
        .flat_map(|c| c.changed_files.iter())
        .chain(snap.top_changed_files.iter().map(|f| &f.path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use devlog_core::{PrSnapshot, PrState};
    use devlog_store::JournalConfig;

    fn open_store(tmp: &tempfile::TempDir) -> JournalStore {
        JournalStore::open(JournalConfig {
            root: Some(tmp.path().to_path_buf()),
            ..JournalConfig::default()
        })
        .unwrap()
    }

    fn commit(hash: &str, message: &str, files: &[&str]) -> JournalCommit {
        JournalCommit {
            hash: hash.into(),
            short_hash: hash[..hash.len().min(7)].into(),
            message: message.into(),
            author: "dev".into(),
            date: "2026-02-10T10:00:00Z".into(),
            changed_files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn snap(date: &str, project: &str) -> WorkSnapshot {
        WorkSnapshot::new(date, project, "2026-02-10T10:00:00Z")
    }

    fn text_criteria(text: &str) -> SearchCriteria {
        SearchCriteria {
            text: Some(text.into()),
            ..SearchCriteria::default()
        }
    }

    #[test]
    fn empty_criteria_detected_and_rejected() {
        let criteria = SearchCriteria {
            text: Some("  ".into()),
            ..SearchCriteria::default()
        };
        assert!(criteria.is_empty());

        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(&tmp);
        assert!(matches!(
            search(&store, &criteria),
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn more_signals_score_strictly_higher() {
        // One signal: commit message only.
        let mut one = snap(&date::days_ago(1), "acme");
        one.today_commits.push(commit("h1", "auth refactor", &[]));

        // Three signals: commit + PR title + note.
        let mut three = snap(&date::days_ago(2), "acme");
        three.today_commits.push(commit("h2", "auth cleanup", &[]));
        three.pull_requests.push(PrSnapshot {
            number: 1,
            title: "Rework auth flow".into(),
            state: PrState::Open,
            url: String::new(),
            base_branch: String::new(),
            head_branch: String::new(),
            labels: vec![],
        });
        three.notes = Some("auth is finally stable".into());

        let criteria = text_criteria("auth");
        let (score_one, _) = score_snapshot(&one, &criteria).unwrap();
        let (score_three, reasons) = score_snapshot(&three, &criteria).unwrap();
        assert!(score_three > score_one);
        assert_eq!(reasons.len(), 3);
    }

    #[test]
    fn ranking_orders_by_score_then_recency() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(&tmp);

        let mut strong_old = snap(&date::days_ago(20), "acme");
        strong_old.today_commits.push(commit("h1", "auth work", &[]));
        strong_old.notes = Some("auth notes".into());
        store.save(strong_old).unwrap();

        let mut weak_new = snap(&date::days_ago(1), "acme");
        weak_new.today_commits.push(commit("h2", "auth tweak", &[]));
        store.save(weak_new).unwrap();

        let results = search(&store, &text_criteria("auth")).unwrap();
        let dates: Vec<&str> = results.results.iter().map(|r| r.snapshot.date.as_str()).collect();
        assert_eq!(dates[0], date::days_ago(20));
        assert_eq!(dates[1], date::days_ago(1));
    }

    #[test]
    fn limit_applied_after_ranking() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(&tmp);

        let mut strong_old = snap(&date::days_ago(20), "acme");
        strong_old.today_commits.push(commit("h1", "auth work", &[]));
        strong_old.notes = Some("auth everywhere".into());
        store.save(strong_old).unwrap();

        let mut weak_new = snap(&date::days_ago(1), "acme");
        weak_new.today_commits.push(commit("h2", "auth tweak", &[]));
        store.save(weak_new).unwrap();

        let criteria = SearchCriteria {
            limit: 1,
            ..text_criteria("auth")
        };
        let results = search(&store, &criteria).unwrap();
        assert_eq!(results.results.len(), 1);
        // The higher-scoring older snapshot wins the single slot.
        assert_eq!(results.results[0].snapshot.date, date::days_ago(20));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let mut s = snap("2026-02-10", "acme");
        s.today_commits.push(commit("h1", "Fix AUTH Redirect", &[]));
        assert!(score_snapshot(&s, &text_criteria("auth")).is_some());
    }

    #[test]
    fn tag_exact_outweighs_substring() {
        let mut exact = snap("2026-02-10", "acme");
        exact.tags = vec!["deploy".into()];
        let mut partial = snap("2026-02-10", "acme");
        partial.tags = vec!["deploy-staging".into()];

        let criteria = SearchCriteria {
            tags: vec!["deploy".into()],
            ..SearchCriteria::default()
        };
        let (exact_score, _) = score_snapshot(&exact, &criteria).unwrap();
        let (partial_score, _) = score_snapshot(&partial, &criteria).unwrap();
        assert!(exact_score > partial_score);
    }

    #[test]
    fn project_filter_narrows_results() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(&tmp);

        let mut a = snap(&date::days_ago(1), "acme");
        a.today_commits.push(commit("h1", "auth", &[]));
        store.save(a).unwrap();
        let mut z = snap(&date::days_ago(1), "zeta");
        z.today_commits.push(commit("h2", "auth", &[]));
        store.save(z).unwrap();

        let criteria = SearchCriteria {
            project: Some("acme".into()),
            ..text_criteria("auth")
        };
        let results = search(&store, &criteria).unwrap();
        assert_eq!(results.results.len(), 1);
        assert_eq!(results.results[0].snapshot.project_id, "acme");
    }

    #[test]
    fn file_history_finds_both_dates_most_recent_first() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(&tmp);

        let d_old = date::days_ago(9);
        let d_new = date::days_ago(2);
        let mut old = snap(&d_old, "acme");
        old.today_commits.push(commit("h1", "auth v1", &["src/auth.ts"]));
        store.save(old).unwrap();
        let mut new = snap(&d_new, "acme");
        new.today_commits.push(commit("h2", "auth v2", &["src/auth.ts", "src/session.ts"]));
        store.save(new).unwrap();

        let entries = find_file_history(&store, "auth.ts", Some("acme"), 90).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, d_new);
        assert_eq!(entries[1].date, d_old);
        assert_eq!(entries[0].commits[0].hash, "h2");
    }

    #[test]
    fn file_history_respects_lookback_and_validates() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(&tmp);

        let mut old = snap(&date::days_ago(60), "acme");
        old.today_commits.push(commit("h1", "auth", &["src/auth.ts"]));
        store.save(old).unwrap();

        let entries = find_file_history(&store, "auth.ts", None, 30).unwrap();
        assert!(entries.is_empty());

        assert!(matches!(
            find_file_history(&store, "", None, 30),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            find_file_history(&store, "auth.ts", None, 0),
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn file_history_dedupes_commits_across_windows() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open_store(&tmp);

        let mut s = snap(&date::days_ago(1), "acme");
        let c = commit("h1", "auth", &["src/auth.ts"]);
        s.today_commits.push(c.clone());
        s.recent_commits.push(c);
        store.save(s).unwrap();

        let entries = find_file_history(&store, "auth.ts", None, 30).unwrap();
        assert_eq!(entries[0].commits.len(), 1);
    }
}
