//! Dependency scanner: resolved packages reconciled with OSV.dev
//!
//! Two-phase protocol. Phase one posts the whole installed-package list in
//! batches of 100 to `/v1/querybatch`; the response only says which packages
//! have advisories at all. Phase two fetches full advisories per affected
//! package from `/v1/query`. The asymmetry in error handling is deliberate:
//! the batch list is cheap and a failure there means the scanner has nothing
//! trustworthy to report, while per-package detail is best-effort.

pub mod osv;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use ward_core::domain::{Finding, FindingEmitter, ProjectContext, Scanner, ScannerError, Severity};

pub use osv::{OsvClient, OsvError, OsvVulnerability, PackageQuery};

const BATCH_SIZE: usize = 100;
const MAX_REFERENCES: usize = 3;
const MAX_DETAILS_LEN: usize = 300;
const LOCK_FILE: &str = "composer.lock";

/// Scanner checking installed packages against the OSV.dev advisory
/// database.
#[derive(Debug, Default)]
pub struct DependencyScanner {
    client: OsvClient,
}

impl DependencyScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the scanner at a different advisory endpoint (tests).
    pub fn with_client(client: OsvClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Scanner for DependencyScanner {
    fn name(&self) -> &'static str {
        "dependency-scanner"
    }

    fn description(&self) -> &'static str {
        "Live CVE checks via OSV.dev (Packagist)"
    }

    async fn scan(
        &self,
        cancel: &CancellationToken,
        project: &ProjectContext,
        emit: FindingEmitter<'_>,
    ) -> Result<Vec<Finding>, ScannerError> {
        if project.installed_packages.is_empty() {
            return Ok(Vec::new());
        }

        // Phase 1: batch probe. Context iteration is ordered, so batch
        // contents and result alignment are deterministic.
        let queries: Vec<PackageQuery> = project
            .installed_packages
            .iter()
            .filter_map(|(name, version)| {
                normalize_version(version).map(|v| PackageQuery::packagist(name, &v))
            })
            .collect();

        let mut affected = Vec::new();
        for chunk in queries.chunks(BATCH_SIZE) {
            let flags = self
                .client
                .query_batch(cancel, chunk)
                .await
                .map_err(scanner_error)?;
            for (query, has_vulns) in chunk.iter().zip(flags) {
                if has_vulns {
                    affected.push((query.package.name.clone(), query.version.clone()));
                }
            }
        }

        if affected.is_empty() {
            return Ok(Vec::new());
        }
        debug!(count = affected.len(), "Packages with advisories");

        // Phase 2: per-package detail, best-effort.
        let mut findings = Vec::new();
        for (name, version) in affected {
            let vulns = match self.client.query_package(cancel, &name, &version).await {
                Ok(vulns) => vulns,
                Err(OsvError::Cancelled) => return Err(ScannerError::Cancelled),
                Err(error) => {
                    warn!(package = %name, %error, "Skipping package detail query");
                    continue;
                }
            };
            for vuln in vulns {
                let finding = advisory_to_finding(self.name(), &name, &version, &vuln);
                emit(finding.clone());
                findings.push(finding);
            }
        }

        Ok(findings)
    }
}

fn scanner_error(error: OsvError) -> ScannerError {
    match error {
        OsvError::Cancelled => ScannerError::Cancelled,
        other => ScannerError::Advisory(other.to_string()),
    }
}

/// Strip a leading `v`/`V`; branch versions OSV cannot match yield `None`.
fn normalize_version(version: &str) -> Option<String> {
    let version = version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version);
    if version.is_empty() || version.starts_with("dev-") {
        return None;
    }
    Some(version.to_string())
}

/// Map one OSV advisory onto a Ward finding.
fn advisory_to_finding(
    scanner: &str,
    package: &str,
    version: &str,
    vuln: &OsvVulnerability,
) -> Finding {
    // Prefer the CVE alias over the advisory's native id.
    let id = vuln
        .aliases
        .iter()
        .find(|alias| alias.starts_with("CVE-"))
        .cloned()
        .unwrap_or_else(|| vuln.id.clone());

    let description = if vuln.summary.is_empty() {
        let total = vuln.details.chars().count();
        if total > MAX_DETAILS_LEN {
            let head: String = vuln.details.chars().take(MAX_DETAILS_LEN).collect();
            format!("{head}...")
        } else {
            vuln.details.clone()
        }
    } else {
        vuln.summary.clone()
    };

    let remediation = match fixed_version(vuln, package) {
        Some(fixed) => format!(
            "Upgrade {package} to {fixed} or later:\n  composer require {package}:{fixed}"
        ),
        None => format!("Run: composer update {package}"),
    };

    let references: Vec<String> = vuln
        .references
        .iter()
        .filter(|r| r.reference_type == "ADVISORY" || r.reference_type == "WEB")
        .map(|r| r.url.clone())
        .take(MAX_REFERENCES)
        .collect();

    Finding {
        id: id.clone(),
        title: format!("[{id}] {package}@{version} — {}", vuln.summary),
        description,
        severity: advisory_severity(&vuln.database_specific.severity),
        category: "Dependencies".into(),
        scanner: scanner.into(),
        file: LOCK_FILE.into(),
        line: 0,
        code_snippet: String::new(),
        remediation,
        references,
    }
}

/// Earliest `fixed` event across the affected ranges for this package.
fn fixed_version(vuln: &OsvVulnerability, package: &str) -> Option<String> {
    vuln.affected
        .iter()
        .filter(|a| a.package.name == package)
        .flat_map(|a| &a.ranges)
        .flat_map(|r| &r.events)
        .find_map(|event| event.fixed.clone())
}

fn advisory_severity(raw: &str) -> Severity {
    match raw.to_ascii_uppercase().as_str() {
        "CRITICAL" => Severity::Critical,
        "HIGH" => Severity::High,
        "MODERATE" | "MEDIUM" => Severity::Medium,
        "LOW" => Severity::Low,
        // Unscored advisories still deserve attention.
        _ => Severity::Medium,
    }
}
