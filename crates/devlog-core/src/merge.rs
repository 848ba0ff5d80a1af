//! Merge-on-save semantics: a new snapshot for an existing
//! `(date, project_id)` key is unioned into the stored record, never
//! replacing it. Repeated light snapshots through a day accumulate.

use crate::types::{normalize_tag, WorkSnapshot, MAX_ACTIVE_BRANCHES, MAX_TOP_FILES};

/// Union `incoming` into `existing` field by field.
///
/// List fields are unioned by identity key (commit hash, PR number,
/// ticket id, branch name), with the incoming version winning for any
/// identity present on both sides. Scalar fields take the incoming value
/// when it is non-empty. Notes concatenate. Tags are set-unioned.
pub fn merge_into(existing: &mut WorkSnapshot, incoming: WorkSnapshot) {
    existing.taken_at = incoming.taken_at;

    if incoming.repo_path.is_some() {
        existing.repo_path = incoming.repo_path;
    }
    if incoming.remote_url.is_some() {
        existing.remote_url = incoming.remote_url;
    }
    if !incoming.current_branch.is_empty() {
        existing.current_branch = incoming.current_branch;
    }
    if incoming.diff_stats.is_some() {
        existing.diff_stats = incoming.diff_stats;
    }

    union_by_key(&mut existing.today_commits, incoming.today_commits, |c| {
        c.hash.clone()
    });
    union_by_key(&mut existing.recent_commits, incoming.recent_commits, |c| {
        c.hash.clone()
    });
    union_by_key(&mut existing.pull_requests, incoming.pull_requests, |p| {
        p.number.to_string()
    });
    union_by_key(&mut existing.tickets, incoming.tickets, |t| t.id.clone());
    union_by_key(&mut existing.active_branches, incoming.active_branches, |b| {
        b.name.clone()
    });

    // Categories and top files are derived from a whole-day scan, so a
    // fresh non-empty computation supersedes the stored one.
    if !incoming.categories.is_empty() {
        existing.categories = incoming.categories;
    }
    if !incoming.top_changed_files.is_empty() {
        existing.top_changed_files = incoming.top_changed_files;
    }

    merge_notes(&mut existing.notes, incoming.notes);
    merge_tags(&mut existing.tags, incoming.tags);

    // Re-apply caps after union.
    existing.active_branches.truncate(MAX_ACTIVE_BRANCHES);
    existing
        .top_changed_files
        .sort_by(|a, b| b.frequency.cmp(&a.frequency));
    existing.top_changed_files.truncate(MAX_TOP_FILES);
}

/// Union `incoming` into `base`, keyed by `key`. Existing order is kept;
/// an incoming item replaces its keyed counterpart in place, new items
/// append in incoming order.
fn union_by_key<T, K, F>(base: &mut Vec<T>, incoming: Vec<T>, key: F)
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    for item in incoming {
        let k = key(&item);
        match base.iter_mut().find(|b| key(b) == k) {
            Some(slot) => *slot = item,
            None => base.push(item),
        }
    }
}

/// Notes concatenate rather than overwrite. Saving the same note twice
/// is a no-op so that merge stays idempotent.
fn merge_notes(existing: &mut Option<String>, incoming: Option<String>) {
    let Some(new) = incoming.filter(|n| !n.trim().is_empty()) else {
        return;
    };
    match existing {
        Some(old) if old.lines().any(|l| l == new) => {}
        Some(old) => {
            old.push('\n');
            old.push_str(&new);
        }
        None => *existing = Some(new),
    }
}

/// Tag set union: normalized, deduplicated, sorted.
fn merge_tags(existing: &mut Vec<String>, incoming: Vec<String>) {
    let mut all: Vec<String> = existing
        .drain(..)
        .chain(incoming)
        .filter_map(|t| normalize_tag(&t))
        .collect();
    all.sort();
    all.dedup();
    *existing = all;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FileChange, JournalCommit, PrSnapshot, PrState};

    fn commit(hash: &str, message: &str) -> JournalCommit {
        JournalCommit {
            hash: hash.into(),
            short_hash: hash[..hash.len().min(7)].into(),
            message: message.into(),
            author: "dev".into(),
            date: "2026-02-10T10:00:00Z".into(),
            changed_files: vec![],
        }
    }

    fn snap() -> WorkSnapshot {
        WorkSnapshot::new("2026-02-10", "acme", "2026-02-10T10:00:00Z")
    }

    #[test]
    fn merge_is_additive_across_commits() {
        let mut a = snap();
        a.today_commits.push(commit("h1", "first"));
        let mut b = snap();
        b.today_commits.push(commit("h2", "second"));

        merge_into(&mut a, b);
        let hashes: Vec<&str> = a.today_commits.iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(hashes, vec!["h1", "h2"]);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut base = snap();
        base.today_commits.push(commit("h1", "first"));
        base.tags = vec!["wip".into()];
        base.notes = Some("tried the cache fix".into());

        let mut once = base.clone();
        merge_into(&mut once, base.clone());
        let mut twice = once.clone();
        merge_into(&mut twice, base.clone());

        assert_eq!(serde_json::to_value(&once).unwrap(), serde_json::to_value(&twice).unwrap());
    }

    #[test]
    fn incoming_fields_win_per_identity() {
        let mut a = snap();
        a.today_commits.push(commit("h1", "wip"));
        let mut b = snap();
        b.today_commits.push(commit("h1", "finished message"));

        merge_into(&mut a, b);
        assert_eq!(a.today_commits.len(), 1);
        assert_eq!(a.today_commits[0].message, "finished message");
    }

    #[test]
    fn scalars_take_incoming_but_empty_does_not_erase() {
        let mut a = snap();
        a.current_branch = "main".into();
        a.diff_stats = Some(crate::types::DiffStats {
            files_changed: 3,
            insertions: 10,
            deletions: 2,
        });

        let mut b = snap();
        b.current_branch = "feat/login".into();
        // b has no diff stats (light snapshot)

        merge_into(&mut a, b);
        assert_eq!(a.current_branch, "feat/login");
        assert!(a.diff_stats.is_some());
    }

    #[test]
    fn notes_concatenate_once() {
        let mut a = snap();
        a.notes = Some("morning: auth bug".into());
        let mut b = snap();
        b.notes = Some("afternoon: fixed".into());
        merge_into(&mut a, b.clone());
        assert_eq!(a.notes.as_deref(), Some("morning: auth bug\nafternoon: fixed"));

        // Same note again does not duplicate.
        merge_into(&mut a, b);
        assert_eq!(a.notes.as_deref(), Some("morning: auth bug\nafternoon: fixed"));
    }

    #[test]
    fn tags_union_case_normalized() {
        let mut a = snap();
        a.tags = vec!["WIP".into(), "review".into()];
        let mut b = snap();
        b.tags = vec!["wip".into(), "deploy".into()];
        merge_into(&mut a, b);
        assert_eq!(a.tags, vec!["deploy", "review", "wip"]);
    }

    #[test]
    fn prs_dedupe_by_number() {
        let pr = |n: u64, state: PrState| PrSnapshot {
            number: n,
            title: format!("PR {n}"),
            state,
            url: String::new(),
            base_branch: String::new(),
            head_branch: String::new(),
            labels: vec![],
        };
        let mut a = snap();
        a.pull_requests.push(pr(7, PrState::Open));
        let mut b = snap();
        b.pull_requests.push(pr(7, PrState::Merged));
        b.pull_requests.push(pr(9, PrState::Open));

        merge_into(&mut a, b);
        assert_eq!(a.pull_requests.len(), 2);
        assert_eq!(a.pull_requests[0].state, PrState::Merged);
    }

    #[test]
    fn top_files_capped_and_sorted_after_merge() {
        let mut a = snap();
        let mut b = snap();
        b.top_changed_files = (0..30)
            .map(|i| FileChange {
                path: format!("src/f{i}.rs"),
                frequency: i,
            })
            .collect();
        merge_into(&mut a, b);
        assert_eq!(a.top_changed_files.len(), MAX_TOP_FILES);
        assert_eq!(a.top_changed_files[0].frequency, 29);
    }
}
