//! Scan-history store: one JSON record per completed scan
//!
//! Records are small summaries, not full reports; the `finding_ids` list of
//! sorted `id|file|line` keys is the diffing unit. Comparing the current
//! report against the most recent record for the same project path yields the
//! "N new, M resolved" line the orchestrator logs.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::ScanReport;

const MAX_NAME_LEN: usize = 40;

/// Errors raised by the history store. All of them are recoverable at the
/// pipeline level: a failed save is logged and the scan still succeeds.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding scan record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Stored summary of one scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: String,
    pub project_name: String,
    pub project_path: String,
    pub timestamp: DateTime<Utc>,
    pub duration: String,
    pub finding_count: usize,
    pub by_severity: BTreeMap<String, usize>,
    pub scanners_run: Vec<String>,
    /// Sorted `id|file|line` keys used for diffing.
    pub finding_ids: Vec<String>,
}

/// Difference between the current scan and the previous one for the same
/// project path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanDiff {
    pub new_findings: Vec<String>,
    pub resolved_findings: Vec<String>,
    pub total_before: usize,
    pub total_after: usize,
}

/// Directory-backed history store. Single writer per scan.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store backed by `~/.ward/store`.
    pub fn default_location() -> Result<Self, StoreError> {
        let dir = super::dirs::store_dir().map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no home directory")
        })?;
        Ok(Self::new(dir))
    }

    /// Persist a summary record for the given report.
    pub fn save(&self, report: &ScanReport) -> Result<ScanRecord, StoreError> {
        std::fs::create_dir_all(&self.dir)?;

        let record = self.record_for(report);
        let body = serde_json::to_string_pretty(&record)?;
        let filename = format!(
            "{}_{}.json",
            record.timestamp.format("%Y-%m-%dT%H-%M-%S"),
            sanitize_name(&record.project_name)
        );
        std::fs::write(self.dir.join(filename), body)?;
        Ok(record)
    }

    /// All stored records, most recent first. Unreadable entries are skipped.
    pub fn list(&self) -> Result<Vec<ScanRecord>, StoreError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(_) => continue,
            };
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Ok(raw) = std::fs::read_to_string(&path) else {
                continue;
            };
            if let Ok(record) = serde_json::from_str::<ScanRecord>(&raw) {
                records.push(record);
            }
        }

        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    /// Most recent record whose project path matches.
    pub fn last_for(&self, project_path: &Path) -> Result<Option<ScanRecord>, StoreError> {
        let wanted = project_path.to_string_lossy();
        Ok(self
            .list()?
            .into_iter()
            .find(|record| record.project_path == wanted))
    }

    /// Diff the report against the last stored scan for its project path.
    /// Returns `None` when no previous scan exists.
    pub fn compare_last(&self, report: &ScanReport) -> Result<Option<ScanDiff>, StoreError> {
        let Some(last) = self.last_for(&report.project.root_path)? else {
            return Ok(None);
        };

        let current_keys = report.finding_keys();
        let current_set: HashSet<&String> = current_keys.iter().collect();
        let previous_set: HashSet<&String> = last.finding_ids.iter().collect();

        Ok(Some(ScanDiff {
            new_findings: current_keys
                .iter()
                .filter(|k| !previous_set.contains(*k))
                .cloned()
                .collect(),
            resolved_findings: last
                .finding_ids
                .iter()
                .filter(|k| !current_set.contains(*k))
                .cloned()
                .collect(),
            total_before: last.finding_count,
            total_after: report.findings.len(),
        }))
    }

    fn record_for(&self, report: &ScanReport) -> ScanRecord {
        let by_severity = report
            .count_by_severity()
            .into_iter()
            .map(|(severity, count)| (severity.to_string(), count))
            .collect();

        ScanRecord {
            id: record_id(report),
            project_name: report.project.project_name.clone(),
            project_path: report.project.root_path.to_string_lossy().to_string(),
            timestamp: report.completed_at,
            duration: format!("{:?}", report.duration()),
            finding_count: report.findings.len(),
            by_severity,
            scanners_run: report.scanners_run.clone(),
            finding_ids: report.finding_keys(),
        }
    }
}

fn record_id(report: &ScanReport) -> String {
    let mut hasher = Sha256::new();
    hasher.update(report.project.root_path.to_string_lossy().as_bytes());
    hasher.update(report.completed_at.to_rfc3339().as_bytes());
    format!("{:x}", hasher.finalize())[..12].to_string()
}

fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c == '/' || c == ' ' { '_' } else { c })
        .collect();
    cleaned.chars().take(MAX_NAME_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_and_truncates() {
        assert_eq!(sanitize_name("acme/shop front"), "acme_shop_front");
        let long = "x".repeat(60);
        assert_eq!(sanitize_name(&long).len(), MAX_NAME_LEN);
    }
}
