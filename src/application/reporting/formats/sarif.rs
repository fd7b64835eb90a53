//! SARIF v2.1.0 report for code-scanning integrations

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use ward_core::domain::{ScanReport, Severity};

use super::super::{ReportError, Reporter};

const FILE_NAME: &str = "ward-report.sarif";
const SCHEMA_URI: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/main/sarif-2.1/schema/sarif-schema-2.1.0.json";

#[derive(Serialize)]
struct SarifDocument {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: &'static str,
    information_uri: &'static str,
    version: &'static str,
    semantic_version: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    name: String,
    short_description: SarifMessage,
    full_description: SarifMessage,
    default_configuration: SarifConfiguration,
    help: SarifMessage,
    properties: SarifRuleProperties,
}

#[derive(Serialize)]
struct SarifConfiguration {
    level: &'static str,
}

#[derive(Serialize)]
struct SarifRuleProperties {
    tags: Vec<String>,
    #[serde(rename = "security-severity")]
    security_severity: &'static str,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    rule_index: usize,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partial_fingerprints: Option<HashMap<&'static str, String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
    region: SarifRegion,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRegion {
    start_line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    snippet: Option<SarifMessage>,
}

/// Writes `ward-report.sarif` for GitHub Code Scanning and friends.
pub struct SarifReporter {
    output_dir: PathBuf,
}

impl SarifReporter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }
}

impl Reporter for SarifReporter {
    fn name(&self) -> &'static str {
        "sarif"
    }

    fn extension(&self) -> &'static str {
        "sarif"
    }

    fn generate(&self, report: &ScanReport) -> Result<PathBuf, ReportError> {
        // One rule per unique finding id, in first-appearance order; every
        // result references its rule by index.
        let mut rule_index: HashMap<&str, usize> = HashMap::new();
        let mut rules = Vec::new();
        for finding in &report.findings {
            if rule_index.contains_key(finding.id.as_str()) {
                continue;
            }
            rule_index.insert(&finding.id, rules.len());
            rules.push(SarifRule {
                id: finding.id.clone(),
                name: finding.title.clone(),
                short_description: SarifMessage {
                    text: finding.title.clone(),
                },
                full_description: SarifMessage {
                    text: finding.description.clone(),
                },
                default_configuration: SarifConfiguration {
                    level: sarif_level(finding.severity),
                },
                help: SarifMessage {
                    text: finding.remediation.clone(),
                },
                properties: SarifRuleProperties {
                    tags: vec![finding.category.clone()],
                    security_severity: sarif_security(finding.severity),
                },
            });
        }

        let results = report
            .findings
            .iter()
            .map(|finding| {
                let snippet = (!finding.code_snippet.is_empty()).then(|| SarifMessage {
                    text: finding.code_snippet.clone(),
                });
                let partial_fingerprints = (!finding.references.is_empty()).then(|| {
                    HashMap::from([("primaryLocationLineHash", finding.fingerprint())])
                });
                SarifResult {
                    rule_id: finding.id.clone(),
                    rule_index: rule_index[finding.id.as_str()],
                    level: sarif_level(finding.severity),
                    message: SarifMessage {
                        text: finding.title.clone(),
                    },
                    locations: vec![SarifLocation {
                        physical_location: SarifPhysicalLocation {
                            artifact_location: SarifArtifactLocation {
                                uri: finding.file.clone(),
                            },
                            region: SarifRegion {
                                // SARIF requires startLine >= 1.
                                start_line: finding.line.max(1),
                                snippet,
                            },
                        },
                    }],
                    partial_fingerprints,
                }
            })
            .collect();

        let document = SarifDocument {
            schema: SCHEMA_URI,
            version: "2.1.0",
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: "Ward",
                        information_uri: "https://github.com/ward-scanner/ward",
                        version: crate::VERSION,
                        semantic_version: crate::VERSION,
                        rules,
                    },
                },
                results,
            }],
        };

        let body = serde_json::to_string_pretty(&document)?;
        let path = self.output_dir.join(FILE_NAME);
        std::fs::write(&path, body)?;
        Ok(path)
    }
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low | Severity::Info => "note",
    }
}

fn sarif_security(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "critical",
        Severity::High => "high",
        Severity::Medium => "medium",
        Severity::Low => "low",
        Severity::Info => "informational",
    }
}
