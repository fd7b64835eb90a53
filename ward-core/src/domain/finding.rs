//! The finding value object and its stable fingerprint

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::severity::Severity;

/// Maximum length of a code snippet before it is truncated.
pub const SNIPPET_MAX_LEN: usize = 200;

/// A single security issue discovered by a scanner.
///
/// Findings are immutable once constructed; the orchestrator only ever
/// filters and reorders them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Stable rule identifier, e.g. `ENV-002` or a CVE id.
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    /// Free-text grouping tag, e.g. `Configuration` or `Dependencies`.
    pub category: String,
    /// Name of the scanner that produced this finding.
    pub scanner: String,
    /// Repository-relative file path; empty when not file-scoped.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
    /// 1-based line number; 0 when the finding is not line-scoped.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub line: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code_snippet: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub remediation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl Finding {
    /// Stable short hash identifying this finding across runs.
    ///
    /// Only `id`, `file`, and `line` participate, so description or severity
    /// edits never invalidate a baseline.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.id.as_bytes());
        hasher.update(b":");
        hasher.update(self.file.as_bytes());
        hasher.update(b":");
        hasher.update(self.line.to_string().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        digest[..16].to_string()
    }

    /// Deduplication key: the `(id, file, line)` triple.
    pub fn dedup_key(&self) -> String {
        format!("{}|{}|{}", self.id, self.file, self.line)
    }
}

/// Trim and cap a snippet at [`SNIPPET_MAX_LEN`] characters, appending the
/// original size when truncated.
pub fn truncate_snippet(text: &str) -> String {
    let trimmed = text.trim();
    let total = trimmed.chars().count();
    if total <= SNIPPET_MAX_LEN {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(SNIPPET_MAX_LEN).collect();
    format!("{head}... ({total} chars)")
}
