//! Ticket references extracted locally from branch names and commit
//! messages. Pure, no network: a remote tracker client can replace this
//! without touching the assembler.

use devlog_core::TicketSnapshot;
use regex::Regex;
use std::sync::OnceLock;

/// Status recorded for locally-extracted references; devlog never knows
/// more than "this work mentions the ticket".
pub const STATUS_REFERENCED: &str = "referenced";

fn jira_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Z][A-Z0-9]+-\d+)\b").expect("static regex"))
}

fn issue_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#(\d+)\b").expect("static regex"))
}

/// Scan branch names and commit messages for `ABC-123`-style keys and
/// `#123`-style issue references. Deduplicated, sorted by id.
pub fn extract_ticket_refs<S: AsRef<str>>(sources: &[S]) -> Vec<TicketSnapshot> {
    let mut tickets: Vec<TicketSnapshot> = Vec::new();
    let mut seen = std::collections::BTreeSet::new();

    for source in sources {
        let text = source.as_ref();
        for cap in jira_re().captures_iter(text) {
            let id = cap[1].to_string();
            if seen.insert(id.clone()) {
                tickets.push(TicketSnapshot {
                    id,
                    title: String::new(),
                    status: STATUS_REFERENCED.to_string(),
                    ticket_type: "ticket".to_string(),
                });
            }
        }
        for cap in issue_re().captures_iter(text) {
            let id = format!("#{}", &cap[1]);
            if seen.insert(id.clone()) {
                tickets.push(TicketSnapshot {
                    id,
                    title: String::new(),
                    status: STATUS_REFERENCED.to_string(),
                    ticket_type: "issue".to_string(),
                });
            }
        }
    }

    tickets.sort_by(|a, b| a.id.cmp(&b.id));
    tickets
}
