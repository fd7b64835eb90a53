//! Machine-readable JSON report

use std::path::{Path, PathBuf};

use serde::Serialize;

use ward_core::domain::{Finding, ScanReport};

use super::super::{ReportError, Reporter};

const FILE_NAME: &str = "ward-report.json";

#[derive(Serialize)]
struct JsonReport<'a> {
    project: JsonProject<'a>,
    summary: JsonSummary<'a>,
    findings: &'a [Finding],
}

#[derive(Serialize)]
struct JsonProject<'a> {
    name: &'a str,
    path: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    laravel_version: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    php_version: &'a str,
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    total_findings: usize,
    by_severity: std::collections::BTreeMap<String, usize>,
    duration: String,
    scanners_run: &'a [String],
    #[serde(skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    scanner_errors: &'a std::collections::BTreeMap<String, String>,
}

/// Writes `ward-report.json`, the always-produced machine format.
pub struct JsonReporter {
    output_dir: PathBuf,
}

impl JsonReporter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }
}

impl Reporter for JsonReporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn generate(&self, report: &ScanReport) -> Result<PathBuf, ReportError> {
        let by_severity = report
            .count_by_severity()
            .into_iter()
            .map(|(severity, count)| (severity.to_string(), count))
            .collect();

        let document = JsonReport {
            project: JsonProject {
                name: &report.project.project_name,
                path: report.project.root_path.to_string_lossy().to_string(),
                laravel_version: &report.project.laravel_version,
                php_version: &report.project.php_version,
            },
            summary: JsonSummary {
                total_findings: report.findings.len(),
                by_severity,
                duration: format!("{:?}", report.duration()),
                scanners_run: &report.scanners_run,
                scanner_errors: &report.scanner_errors,
            },
            findings: &report.findings,
        };

        let body = serde_json::to_string_pretty(&document)?;
        let path = self.output_dir.join(FILE_NAME);
        std::fs::write(&path, body)?;
        Ok(path)
    }
}
