//! Fingerprint baseline: persisted suppression of accepted findings
//!
//! A baseline is written from a scan's post-filter findings and attached to
//! later scans; any finding whose fingerprint appears in it is dropped before
//! reporting. This is what lets the tool gate CI without re-flagging known
//! issues.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{Finding, Severity};

/// Errors raised by baseline load/save.
///
/// A referenced-but-missing baseline file is deliberately a hard error: a CI
/// setup pointing at an absent baseline should fail loudly, not silently
/// report everything.
#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing baseline {path}: {message}")]
    Parse { path: String, message: String },
}

/// One suppressed finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineEntry {
    pub fingerprint: String,
    pub id: String,
    pub file: String,
    pub line: u32,
    pub title: String,
    pub severity: Severity,
}

/// On-disk baseline document plus the in-memory fingerprint index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Baseline {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub entries: Vec<BaselineEntry>,

    #[serde(skip)]
    fingerprints: HashSet<String>,
}

impl Baseline {
    /// Build a baseline from the findings of a completed scan.
    pub fn from_findings(findings: &[Finding]) -> Self {
        let now = Utc::now();
        let entries: Vec<BaselineEntry> = findings
            .iter()
            .map(|f| BaselineEntry {
                fingerprint: f.fingerprint(),
                id: f.id.clone(),
                file: f.file.clone(),
                line: f.line,
                title: f.title.clone(),
                severity: f.severity,
            })
            .collect();
        let fingerprints = entries.iter().map(|e| e.fingerprint.clone()).collect();
        Self {
            version: "1.0".to_string(),
            created_at: now,
            updated_at: now,
            entries,
            fingerprints,
        }
    }

    /// Read and index a baseline file. Missing files are an error.
    pub fn load(path: &Path) -> Result<Self, BaselineError> {
        let raw = std::fs::read_to_string(path)?;
        let mut baseline: Baseline =
            serde_json::from_str(&raw).map_err(|e| BaselineError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        baseline.fingerprints = baseline
            .entries
            .iter()
            .map(|e| e.fingerprint.clone())
            .collect();

        info!(
            path = %path.display(),
            entry_count = baseline.entries.len(),
            "Loaded baseline"
        );
        Ok(baseline)
    }

    /// Write the baseline as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), BaselineError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body =
            serde_json::to_string_pretty(self).expect("baseline serialization cannot fail");
        std::fs::write(path, body)?;

        info!(
            path = %path.display(),
            entry_count = self.entries.len(),
            "Saved baseline"
        );
        Ok(())
    }

    /// Whether a finding is suppressed by this baseline.
    pub fn is_suppressed(&self, finding: &Finding) -> bool {
        self.fingerprints.contains(&finding.fingerprint())
    }

    /// Split findings into `(kept, suppressed_count)`.
    pub fn filter(&self, findings: Vec<Finding>) -> (Vec<Finding>, usize) {
        let mut kept = Vec::with_capacity(findings.len());
        let mut suppressed = 0;
        for finding in findings {
            if self.is_suppressed(&finding) {
                suppressed += 1;
            } else {
                kept.push(finding);
            }
        }
        (kept, suppressed)
    }

    /// Fingerprints currently in the baseline.
    pub fn fingerprints(&self) -> &HashSet<String> {
        &self.fingerprints
    }
}
