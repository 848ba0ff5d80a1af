//! Remote PR provider. Optional, skippable, failure-tolerant: the
//! assembler turns any error here into a single warning.

use devlog_core::{PrSnapshot, PrState};
use std::path::PathBuf;
use std::process::Command;

pub trait RemoteProvider {
    /// Open PRs authored by the current user.
    fn list_open_prs(&self) -> anyhow::Result<Vec<PrSnapshot>>;
    /// PRs authored by the current user merged on or after `date`.
    fn list_merged_prs_since(&self, date: &str) -> anyhow::Result<Vec<PrSnapshot>>;
}

const PR_JSON_FIELDS: &str = "number,title,state,url,baseRefName,headRefName,labels";

/// `RemoteProvider` backed by the `gh` CLI.
pub struct GhCli {
    cwd: PathBuf,
}

impl GhCli {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    fn gh(&self, args: &[&str]) -> anyhow::Result<String> {
        let output = Command::new("gh")
            .args(args)
            .current_dir(&self.cwd)
            .output()
            .map_err(|e| anyhow::anyhow!("gh not available: {e}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("gh {} failed: {}", args.first().unwrap_or(&""), stderr.trim());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl RemoteProvider for GhCli {
    fn list_open_prs(&self) -> anyhow::Result<Vec<PrSnapshot>> {
        let out = self.gh(&[
            "pr", "list", "--author", "@me", "--state", "open", "--json", PR_JSON_FIELDS,
        ])?;
        parse_pr_list(&out)
    }

    fn list_merged_prs_since(&self, date: &str) -> anyhow::Result<Vec<PrSnapshot>> {
        let search = format!("merged:>={date}");
        let out = self.gh(&[
            "pr", "list", "--author", "@me", "--state", "merged", "--search", &search, "--json",
            PR_JSON_FIELDS,
        ])?;
        parse_pr_list(&out)
    }
}

/// Parse `gh pr list --json` output. Field access is defensive: a
/// missing field becomes a default, never a parse failure.
pub fn parse_pr_list(json: &str) -> anyhow::Result<Vec<PrSnapshot>> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| anyhow::anyhow!("bad gh output: {e}"))?;
    let items = value
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("bad gh output: expected array"))?;

    let mut prs = Vec::new();
    for item in items {
        let Some(number) = item.get("number").and_then(|v| v.as_u64()) else {
            continue;
        };
        let state = match item.get("state").and_then(|v| v.as_str()).unwrap_or("") {
            "MERGED" => PrState::Merged,
            "CLOSED" => PrState::Closed,
            _ => PrState::Open,
        };
        prs.push(PrSnapshot {
            number,
            title: str_field(item, "title"),
            state,
            url: str_field(item, "url"),
            base_branch: str_field(item, "baseRefName"),
            head_branch: str_field(item, "headRefName"),
            labels: item
                .get("labels")
                .and_then(|v| v.as_array())
                .map(|arr| {
                    arr.iter()
                        .filter_map(|l| l.get("name").and_then(|n| n.as_str()))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        });
    }
    Ok(prs)
}

fn str_field(item: &serde_json::Value, key: &str) -> String {
    item.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}
