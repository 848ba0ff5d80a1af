//! Machine-derived snapshot tags. Pure: reads already-assembled fields
//! only, no I/O, so it can run synchronously inside save.

use crate::types::{PrState, WorkSnapshot};

/// Tag vocabulary.
pub mod tag {
    pub const HAS_WIP: &str = "has-wip";
    pub const OPEN_PR: &str = "open-pr";
    pub const MERGED_PR: &str = "merged-pr";
    pub const HAS_TICKETS: &str = "has-tickets";
    pub const LARGE_CHANGE: &str = "large-change";
    pub const BUSY_DAY: &str = "busy-day";
    pub const NO_COMMITS: &str = "no-commits";
}

/// The full machine vocabulary. Tags in this set are re-derived on
/// every save; user tags are never touched.
pub const VOCABULARY: &[&str] = &[
    tag::HAS_WIP,
    tag::OPEN_PR,
    tag::MERGED_PR,
    tag::HAS_TICKETS,
    tag::LARGE_CHANGE,
    tag::BUSY_DAY,
    tag::NO_COMMITS,
];

pub fn is_auto_tag(t: &str) -> bool {
    VOCABULARY.contains(&t)
}

/// Insertions + deletions at or above this mark a large change.
const LARGE_CHANGE_LINES: u32 = 500;

/// Commit count at or above this marks a busy day.
const BUSY_DAY_COMMITS: usize = 10;

/// Derive tags from snapshot content. Deterministic: equal snapshots
/// always produce the same tag list.
pub fn derive_tags(snap: &WorkSnapshot) -> Vec<String> {
    let mut tags = Vec::new();

    if snap.active_branches.iter().any(|b| b.has_uncommitted) {
        tags.push(tag::HAS_WIP.to_string());
    }
    if snap.pull_requests.iter().any(|p| p.state == PrState::Open) {
        tags.push(tag::OPEN_PR.to_string());
    }
    if snap.pull_requests.iter().any(|p| p.state == PrState::Merged) {
        tags.push(tag::MERGED_PR.to_string());
    }
    if !snap.tickets.is_empty() {
        tags.push(tag::HAS_TICKETS.to_string());
    }
    if let Some(d) = &snap.diff_stats {
        if d.insertions + d.deletions >= LARGE_CHANGE_LINES {
            tags.push(tag::LARGE_CHANGE.to_string());
        }
    }
    if snap.today_commits.len() >= BUSY_DAY_COMMITS {
        tags.push(tag::BUSY_DAY.to_string());
    } else if snap.today_commits.is_empty() {
        tags.push(tag::NO_COMMITS.to_string());
    }

    tags
}
