use devlog_core::WorkSnapshot;

/// One-line summary of a snapshot for list views.
/// Format: `[2026-02-10] acme-api      3 commits  2 PRs  #has-wip #open-pr`
pub fn snapshot_line(snap: &WorkSnapshot) -> String {
    let mut line = format!(
        "[{}] {:<20} {:>2} commits",
        snap.date,
        snap.project_id,
        snap.today_commits.len()
    );
    if !snap.pull_requests.is_empty() {
        line.push_str(&format!("  {} PRs", snap.pull_requests.len()));
    }
    if !snap.tickets.is_empty() {
        line.push_str(&format!("  {} tickets", snap.tickets.len()));
    }
    for tag in &snap.tags {
        line.push_str(&format!(" #{tag}"));
    }
    line
}

/// Truncate for single-line display.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        s.to_string()
    }
}

pub fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

/// Warnings go after the useful output, never swallowed.
pub fn print_warnings(warnings: &[String]) {
    for w in warnings {
        println!("warning: {w}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long message here", 10), "a long ...");
    }

    #[test]
    fn format_size_picks_unit() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn snapshot_line_includes_tags() {
        let mut snap = WorkSnapshot::new("2026-02-10", "acme", "2026-02-10T10:00:00Z");
        snap.tags = vec!["has-wip".into()];
        let line = snapshot_line(&snap);
        assert!(line.starts_with("[2026-02-10] acme"));
        assert!(line.contains("#has-wip"));
    }
}
