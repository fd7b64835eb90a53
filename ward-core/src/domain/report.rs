//! The scan report aggregate

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::context::ProjectContext;
use super::finding::Finding;
use super::severity::Severity;

/// Final aggregate result of a scan: the resolved context plus the findings
/// that survived post-processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub project: ProjectContext,
    pub findings: Vec<Finding>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Scanner names that completed successfully.
    pub scanners_run: Vec<String>,
    /// Scanner name to error text for scanners that failed.
    pub scanner_errors: BTreeMap<String, String>,
}

impl ScanReport {
    /// Wall-clock duration of the scan.
    pub fn duration(&self) -> Duration {
        (self.completed_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    /// Number of findings per severity level. Levels with no findings are
    /// omitted.
    pub fn count_by_severity(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for finding in &self.findings {
            *counts.entry(finding.severity).or_insert(0) += 1;
        }
        counts
    }

    /// Findings grouped by their category tag, preserving report order.
    pub fn findings_by_category(&self) -> BTreeMap<String, Vec<&Finding>> {
        let mut grouped: BTreeMap<String, Vec<&Finding>> = BTreeMap::new();
        for finding in &self.findings {
            grouped
                .entry(finding.category.clone())
                .or_default()
                .push(finding);
        }
        grouped
    }

    /// Sorted `id|file|line` keys, the unit of history diffing.
    pub fn finding_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.findings.iter().map(Finding::dedup_key).collect();
        keys.sort();
        keys
    }
}
