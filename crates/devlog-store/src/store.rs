use crate::config::JournalConfig;
use crate::error::StoreError;
use crate::lock::ProjectLock;
use crate::paths::JournalPaths;
use crate::write_atomic;
use devlog_core::{autotag, date, merge, normalize_tag, ProjectSummary, WorkSnapshot};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Result of one `save` call.
#[derive(Debug)]
pub struct SaveOutcome {
    /// True if a record already existed for the key and was merged into.
    pub merged: bool,
    /// The record as persisted (post-merge, post-auto-tag).
    pub snapshot: WorkSnapshot,
    pub warnings: Vec<String>,
}

/// Snapshots matching a range query, plus warnings for records that had
/// to be skipped.
#[derive(Debug, Default)]
pub struct RangeResult {
    pub snapshots: Vec<WorkSnapshot>,
    pub warnings: Vec<String>,
}

/// Aggregate journal statistics.
#[derive(Debug, Serialize)]
pub struct StoreStats {
    pub snapshots: usize,
    pub distinct_dates: usize,
    pub projects: usize,
    pub oldest_date: Option<String>,
    pub newest_date: Option<String>,
    pub total_bytes: u64,
}

/// What a prune pass removed. Irreversible.
#[derive(Debug, Serialize)]
pub struct PruneReport {
    pub removed: usize,
    pub dates: Vec<String>,
}

/// Durable, queryable persistence of [`WorkSnapshot`] records, one per
/// `(date, project_id)` key, stored as one pretty-printed JSON file per
/// key under `journal/<project_id>/<date>.json`.
pub struct JournalStore {
    paths: JournalPaths,
    config: JournalConfig,
}

impl JournalStore {
    /// Open (creating layout if needed) the journal named by `config`.
    pub fn open(config: JournalConfig) -> Result<Self, StoreError> {
        let paths = JournalPaths::new(config.resolved_root());
        paths.ensure_layout()?;
        Ok(Self { paths, config })
    }

    pub fn paths(&self) -> &JournalPaths {
        &self.paths
    }

    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    /// Persist a snapshot. If a record already exists for the key, the
    /// incoming snapshot is merged into it (read-merge-write under the
    /// project lock); otherwise a new record is created. Auto-tags are
    /// derived from the final record before it is written.
    pub fn save(&self, snapshot: WorkSnapshot) -> Result<SaveOutcome, StoreError> {
        validate_date(&snapshot.date)?;
        validate_project_id(&snapshot.project_id)?;

        let _lock = ProjectLock::acquire(&self.paths.lock_file(&snapshot.project_id))?;
        let file = self.paths.snapshot_file(&snapshot.project_id, &snapshot.date);

        let mut warnings = Vec::new();
        let (mut record, merged) = match self.read_record(&file) {
            Ok(Some(mut existing)) => {
                merge::merge_into(&mut existing, snapshot);
                (existing, true)
            }
            Ok(None) => (snapshot, false),
            Err(StoreError::Corrupt { path, reason }) => {
                tracing::warn!(path = %path.display(), %reason, "replacing corrupt journal record");
                warnings.push(format!(
                    "existing record {} was corrupt ({reason}); replaced",
                    path.display()
                ));
                (snapshot, false)
            }
            Err(e) => return Err(e),
        };

        // Auto-tags describe the record as it now stands, so the machine
        // vocabulary is re-derived rather than accumulated; user tags
        // pass through untouched.
        let mut tags: Vec<String> = record
            .tags
            .iter()
            .filter_map(|t| normalize_tag(t))
            .filter(|t| !autotag::is_auto_tag(t))
            .collect();
        tags.extend(autotag::derive_tags(&record));
        tags.sort();
        tags.dedup();
        record.tags = tags;

        let json =
            serde_json::to_string_pretty(&record).map_err(|e| StoreError::Other(e.into()))?;
        write_atomic(&file, json.as_bytes())?;

        Ok(SaveOutcome {
            merged,
            snapshot: record,
            warnings,
        })
    }

    /// Point lookup for one key.
    pub fn get(&self, date: &str, project_id: &str) -> Result<WorkSnapshot, StoreError> {
        validate_date(date)?;
        validate_project_id(project_id)?;
        let file = self.paths.snapshot_file(project_id, date);
        match self.read_record(&file)? {
            Some(snap) => Ok(snap),
            None => Err(StoreError::NotFound {
                date: date.to_string(),
                project_id: project_id.to_string(),
            }),
        }
    }

    /// All snapshots in `[from, to]` inclusive, for one project or all
    /// projects, ordered by date then project. A corrupt record is
    /// skipped with a warning; it never fails the whole query.
    pub fn get_range(
        &self,
        project_id: Option<&str>,
        from: &str,
        to: &str,
    ) -> Result<RangeResult, StoreError> {
        validate_date(from)?;
        validate_date(to)?;
        if from > to {
            return Err(StoreError::invalid(format!(
                "range start {from} is after range end {to}"
            )));
        }

        let projects = match project_id {
            Some(p) => {
                validate_project_id(p)?;
                if !self.paths.project_dir(p).is_dir() {
                    return Err(StoreError::invalid(format!("unknown project {p:?}")));
                }
                vec![p.to_string()]
            }
            None => self.project_ids()?,
        };

        let mut result = RangeResult::default();
        for project in &projects {
            for (record_date, path) in self.record_files(project)? {
                if record_date.as_str() < from || record_date.as_str() > to {
                    continue;
                }
                match self.read_record(&path) {
                    Ok(Some(snap)) => result.snapshots.push(snap),
                    Ok(None) => {}
                    Err(StoreError::Corrupt { path, reason }) => {
                        tracing::warn!(path = %path.display(), %reason, "skipping corrupt record");
                        result
                            .warnings
                            .push(format!("skipped corrupt record {}: {reason}", path.display()));
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        result
            .snapshots
            .sort_by(|a, b| a.date.cmp(&b.date).then(a.project_id.cmp(&b.project_id)));
        Ok(result)
    }

    /// The last `days` calendar days including today, all projects.
    pub fn get_recent(&self, days: u32) -> Result<RangeResult, StoreError> {
        if days == 0 {
            return Err(StoreError::invalid("days must be positive"));
        }
        let from = date::days_ago(i64::from(days) - 1);
        let to = date::today();
        self.get_range(None, &from, &to)
    }

    /// One summary per project seen, sorted by most recent activity.
    pub fn list_projects(&self) -> Result<Vec<ProjectSummary>, StoreError> {
        let mut summaries = Vec::new();
        for project in self.project_ids()? {
            let files = self.record_files(&project)?;
            let Some((last_date, last_path)) = files.last().cloned() else {
                continue;
            };
            // Provenance comes from the newest readable record.
            let repo_path = self
                .read_record(&last_path)
                .ok()
                .flatten()
                .and_then(|s| s.repo_path);
            summaries.push(ProjectSummary {
                project_id: project,
                repo_path,
                last_snapshot_date: last_date,
                snapshot_count: files.len(),
            });
        }
        summaries.sort_by(|a, b| b.last_snapshot_date.cmp(&a.last_snapshot_date));
        Ok(summaries)
    }

    /// Aggregate counts over the whole journal.
    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        let mut snapshots = 0usize;
        let mut dates: BTreeSet<String> = BTreeSet::new();
        let mut total_bytes = 0u64;
        let projects = self.project_ids()?;
        for project in &projects {
            for (record_date, path) in self.record_files(project)? {
                snapshots += 1;
                total_bytes += path.metadata().map(|m| m.len()).unwrap_or(0);
                dates.insert(record_date);
            }
        }
        Ok(StoreStats {
            snapshots,
            distinct_dates: dates.len(),
            projects: projects.len(),
            oldest_date: dates.iter().next().cloned(),
            newest_date: dates.iter().next_back().cloned(),
            total_bytes,
        })
    }

    /// Delete every record strictly older than `today - max_age_days`.
    /// A record dated exactly at the cutoff is retained.
    pub fn prune(&self, max_age_days: u32) -> Result<PruneReport, StoreError> {
        if max_age_days == 0 {
            return Err(StoreError::invalid("prune age must be positive"));
        }
        let cutoff = date::days_ago(i64::from(max_age_days));

        let mut removed = 0usize;
        let mut dates: BTreeSet<String> = BTreeSet::new();
        for project in self.project_ids()? {
            let victims: Vec<_> = self
                .record_files(&project)?
                .into_iter()
                .filter(|(d, _)| d.as_str() < cutoff.as_str())
                .collect();
            if victims.is_empty() {
                continue;
            }
            // Deletion is a write; take the same lock as save.
            let _lock = ProjectLock::acquire(&self.paths.lock_file(&project))?;
            for (record_date, path) in victims {
                std::fs::remove_file(&path)?;
                removed += 1;
                dates.insert(record_date);
            }
        }

        Ok(PruneReport {
            removed,
            dates: dates.into_iter().collect(),
        })
    }

    /// Records that would be removed by `prune(max_age_days)`.
    pub fn prune_candidates(&self, max_age_days: u32) -> Result<PruneReport, StoreError> {
        if max_age_days == 0 {
            return Err(StoreError::invalid("prune age must be positive"));
        }
        let cutoff = date::days_ago(i64::from(max_age_days));
        let mut removed = 0usize;
        let mut dates: BTreeSet<String> = BTreeSet::new();
        for project in self.project_ids()? {
            for (record_date, _) in self.record_files(&project)? {
                if record_date.as_str() < cutoff.as_str() {
                    removed += 1;
                    dates.insert(record_date);
                }
            }
        }
        Ok(PruneReport {
            removed,
            dates: dates.into_iter().collect(),
        })
    }

    // ── Internals ──

    fn read_record(&self, path: &Path) -> Result<Option<WorkSnapshot>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(snap) => Ok(Some(snap)),
            Err(e) => Err(StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }

    fn project_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.paths.journal_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                ids.push(name.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Record files for a project, sorted by date key (filename order is
    /// date order for `YYYY-MM-DD.json`).
    fn record_files(&self, project_id: &str) -> Result<Vec<(String, std::path::PathBuf)>, StoreError> {
        let dir = self.paths.project_dir(project_id);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(record_date) = JournalPaths::date_of(&path) else {
                continue;
            };
            // Only well-formed date keys count as records.
            if date::parse_date(record_date).is_ok() {
                files.push((record_date.to_string(), path));
            }
        }
        files.sort();
        Ok(files)
    }
}

fn validate_date(s: &str) -> Result<(), StoreError> {
    date::parse_date(s)
        .map(|_| ())
        .map_err(|e| StoreError::invalid(e.to_string()))
}

fn validate_project_id(id: &str) -> Result<(), StoreError> {
    if id.is_empty() {
        return Err(StoreError::invalid("project id must not be empty"));
    }
    if devlog_core::slug::project_slug(id) != id {
        return Err(StoreError::invalid(format!(
            "project id {id:?} is not a valid slug"
        )));
    }
    Ok(())
}
