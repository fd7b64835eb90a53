//! Self-contained HTML report

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use ward_core::domain::{ScanReport, Severity};

use super::super::{ReportError, Reporter};

const FILE_NAME: &str = "ward-report.html";

const STYLE: &str = r#"
  :root {
    --bg: #0d1117; --surface: #161b22; --border: #30363d;
    --text: #e6edf3; --muted: #8b949e;
    --critical: #ff5252; --high: #ffb74d; --medium: #ffd54f;
    --low: #81c784; --info: #64b5f6; --accent: #b388ff;
  }
  * { margin:0; padding:0; box-sizing:border-box; }
  body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
         background: var(--bg); color: var(--text); line-height: 1.6; padding: 2rem; }
  .container { max-width: 1100px; margin: 0 auto; }
  h1 { color: var(--accent); margin-bottom: 0.5rem; font-size: 1.8rem; }
  .subtitle { color: var(--muted); margin-bottom: 2rem; }
  .summary { display: flex; gap: 1rem; flex-wrap: wrap; margin-bottom: 2rem; }
  .stat { background: var(--surface); border: 1px solid var(--border);
          border-radius: 8px; padding: 1rem 1.5rem; min-width: 120px; text-align: center; }
  .stat .number { font-size: 2rem; font-weight: bold; }
  .stat .label { color: var(--muted); font-size: 0.85rem; text-transform: uppercase; }
  .stat.critical .number { color: var(--critical); }
  .stat.high .number { color: var(--high); }
  .stat.medium .number { color: var(--medium); }
  .stat.low .number { color: var(--low); }
  .stat.info .number { color: var(--info); }
  .stat.total .number { color: var(--accent); }
  .finding { background: var(--surface); border: 1px solid var(--border);
             border-radius: 8px; padding: 1.25rem; margin-bottom: 1rem; }
  .finding-header { display: flex; align-items: center; gap: 0.75rem; margin-bottom: 0.5rem; }
  .badge { padding: 2px 10px; border-radius: 12px; font-size: 0.75rem; font-weight: 600; text-transform: uppercase; }
  .badge.critical { background: var(--critical); color: #000; }
  .badge.high { background: var(--high); color: #000; }
  .badge.medium { background: var(--medium); color: #000; }
  .badge.low { background: var(--low); color: #000; }
  .badge.info { background: var(--info); color: #000; }
  .finding h3 { font-size: 1rem; }
  .finding .meta { color: var(--muted); font-size: 0.85rem; margin-bottom: 0.75rem; }
  .finding .description { margin-bottom: 0.75rem; }
  .finding pre { background: #0d1117; border: 1px solid var(--border);
                 border-radius: 6px; padding: 0.75rem; overflow-x: auto; font-size: 0.85rem;
                 margin-bottom: 0.75rem; color: var(--info); }
  .finding .remediation { background: rgba(179,136,255,0.08); border-left: 3px solid var(--accent);
                          padding: 0.75rem; border-radius: 0 6px 6px 0; font-size: 0.9rem; }
  .finding .references { margin-top: 0.5rem; }
  .finding .references a { color: var(--info); font-size: 0.85rem; }
  .footer { margin-top: 3rem; text-align: center; color: var(--muted); font-size: 0.85rem; }
  @media (prefers-color-scheme: light) {
    :root { --bg:#fff; --surface:#f6f8fa; --border:#d0d7de; --text:#1f2328; --muted:#656d76; }
    .finding pre { background: #f6f8fa; }
  }
"#;

/// Writes `ward-report.html`: inline CSS, dark by default with a light
/// scheme override, no external assets.
pub struct HtmlReporter {
    output_dir: PathBuf,
}

impl HtmlReporter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }
}

impl Reporter for HtmlReporter {
    fn name(&self) -> &'static str {
        "html"
    }

    fn extension(&self) -> &'static str {
        "html"
    }

    fn generate(&self, report: &ScanReport) -> Result<PathBuf, ReportError> {
        let counts = report.count_by_severity();
        let mut out = String::with_capacity(16 * 1024);

        let _ = write!(
            out,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             <title>Ward Security Report</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
             <div class=\"container\">\n"
        );

        let _ = write!(
            out,
            "<h1>Ward Security Report</h1>\n<p class=\"subtitle\">{} &mdash; Laravel {} &mdash; \
             {:?} &mdash; {} scanner(s)</p>\n",
            esc(&report.project.project_name),
            esc(&report.project.laravel_version),
            report.duration(),
            report.scanners_run.len()
        );

        out.push_str("<div class=\"summary\">");
        let _ = write!(
            out,
            "<div class=\"stat total\"><div class=\"number\">{}</div><div class=\"label\">Total</div></div>",
            report.findings.len()
        );
        for severity in Severity::all().into_iter().rev() {
            if let Some(count) = counts.get(&severity) {
                let _ = write!(
                    out,
                    "<div class=\"stat {}\"><div class=\"number\">{}</div><div class=\"label\">{}</div></div>",
                    severity.as_str().to_lowercase(),
                    count,
                    severity
                );
            }
        }
        out.push_str("</div>\n");

        for finding in &report.findings {
            let class = finding.severity.as_str().to_lowercase();
            out.push_str("<div class=\"finding\">");
            let _ = write!(
                out,
                "<div class=\"finding-header\"><span class=\"badge {class}\">{}</span><h3>{}</h3></div>",
                finding.severity,
                esc(&finding.title)
            );
            let _ = write!(
                out,
                "<div class=\"meta\">{} &bull; {}:{} &bull; {}</div>",
                esc(&finding.id),
                esc(&finding.file),
                finding.line,
                esc(&finding.category)
            );
            let _ = write!(
                out,
                "<div class=\"description\">{}</div>",
                esc(&finding.description)
            );
            if !finding.code_snippet.is_empty() {
                let _ = write!(out, "<pre>{}</pre>", esc(&finding.code_snippet));
            }
            if !finding.remediation.is_empty() {
                let _ = write!(
                    out,
                    "<div class=\"remediation\">{}</div>",
                    esc(&finding.remediation)
                );
            }
            if !finding.references.is_empty() {
                out.push_str("<div class=\"references\">");
                for reference in &finding.references {
                    let _ = write!(
                        out,
                        "<a href=\"{0}\" target=\"_blank\" rel=\"noopener\">{0}</a> ",
                        esc(reference)
                    );
                }
                out.push_str("</div>");
            }
            out.push_str("</div>\n");
        }

        let _ = write!(
            out,
            "<div class=\"footer\">Generated by Ward v{}</div>\n</div>\n</body>\n</html>",
            crate::VERSION
        );

        let path = self.output_dir.join(FILE_NAME);
        std::fs::write(&path, out)?;
        Ok(path)
    }
}

fn esc(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
