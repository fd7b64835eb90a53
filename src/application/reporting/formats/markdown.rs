//! Markdown report

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use ward_core::domain::{ScanReport, Severity};

use super::super::{ReportError, Reporter};

const FILE_NAME: &str = "ward-report.md";

/// Writes `ward-report.md`: project summary, severity counts, then findings
/// grouped by severity in descending order.
pub struct MarkdownReporter {
    output_dir: PathBuf,
}

impl MarkdownReporter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }
}

impl Reporter for MarkdownReporter {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn extension(&self) -> &'static str {
        "md"
    }

    fn generate(&self, report: &ScanReport) -> Result<PathBuf, ReportError> {
        let counts = report.count_by_severity();
        let mut out = String::with_capacity(8 * 1024);

        out.push_str("# Ward Security Report\n\n");
        let _ = writeln!(out, "- **Project:** {}", report.project.project_name);
        let _ = writeln!(
            out,
            "- **Path:** `{}`",
            report.project.root_path.display()
        );
        if !report.project.laravel_version.is_empty() {
            let _ = writeln!(out, "- **Laravel:** {}", report.project.laravel_version);
        }
        if !report.project.php_version.is_empty() {
            let _ = writeln!(out, "- **PHP:** {}", report.project.php_version);
        }
        let _ = writeln!(out, "- **Duration:** {:?}", report.duration());
        let _ = writeln!(
            out,
            "- **Scanners:** {}",
            report.scanners_run.join(", ")
        );
        out.push('\n');

        out.push_str("## Summary\n\n");
        let _ = writeln!(out, "| Severity | Count |");
        let _ = writeln!(out, "|---|---|");
        let _ = writeln!(out, "| **Total** | {} |", report.findings.len());
        for severity in Severity::all().into_iter().rev() {
            if let Some(count) = counts.get(&severity) {
                let _ = writeln!(out, "| {severity} | {count} |");
            }
        }
        out.push('\n');

        for severity in Severity::all().into_iter().rev() {
            let group: Vec<_> = report
                .findings
                .iter()
                .filter(|f| f.severity == severity)
                .collect();
            if group.is_empty() {
                continue;
            }

            let _ = writeln!(out, "## {severity} ({})\n", group.len());
            for finding in group {
                let _ = writeln!(out, "### {} — {}\n", finding.id, finding.title);
                if finding.line > 0 {
                    let _ = writeln!(out, "`{}:{}`\n", finding.file, finding.line);
                } else if !finding.file.is_empty() {
                    let _ = writeln!(out, "`{}`\n", finding.file);
                }
                if !finding.description.is_empty() {
                    let _ = writeln!(out, "{}\n", finding.description);
                }
                if !finding.code_snippet.is_empty() {
                    let _ = writeln!(out, "```php\n{}\n```\n", finding.code_snippet);
                }
                if !finding.remediation.is_empty() {
                    let _ = writeln!(out, "**Remediation:** {}\n", finding.remediation);
                }
                for reference in &finding.references {
                    let _ = writeln!(out, "- <{reference}>");
                }
                if !finding.references.is_empty() {
                    out.push('\n');
                }
            }
        }

        let _ = writeln!(out, "---\n\nGenerated by Ward v{}", crate::VERSION);

        let path = self.output_dir.join(FILE_NAME);
        std::fs::write(&path, out)?;
        Ok(path)
    }
}
