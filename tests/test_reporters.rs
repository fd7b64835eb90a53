use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Utc;

use ward::application::reporting::{build_reporters, HtmlReporter, JsonReporter, MarkdownReporter, Reporter, SarifReporter};
use ward_core::domain::{Finding, ProjectContext, ScanReport, Severity};

fn sample_report(root: &str) -> ScanReport {
    let now = Utc::now();
    ScanReport {
        project: ProjectContext {
            root_path: PathBuf::from(root),
            project_name: "acme/shop".into(),
            laravel_version: "^10.0".into(),
            php_version: "^8.1".into(),
            ..Default::default()
        },
        findings: vec![
            Finding {
                id: "ENV-002".into(),
                title: "APP_DEBUG is enabled".into(),
                description: "Debug mode leaks <stack traces> & queries".into(),
                severity: Severity::High,
                category: "Configuration".into(),
                scanner: "env-scanner".into(),
                file: ".env".into(),
                line: 2,
                code_snippet: "APP_DEBUG=true".into(),
                remediation: "Set APP_DEBUG=false".into(),
                references: vec![
                    "https://owasp.org/Top10/A05_2021-Security_Misconfiguration/".into(),
                ],
            },
            Finding {
                id: "CVE-2024-12345".into(),
                title: "[CVE-2024-12345] laravel/framework@8.10.0 — RCE".into(),
                description: "Remote code execution".into(),
                severity: Severity::Critical,
                category: "Dependencies".into(),
                scanner: "dependency-scanner".into(),
                file: "composer.lock".into(),
                line: 0,
                code_snippet: String::new(),
                remediation: "Upgrade to 8.22.1".into(),
                references: vec!["https://example.com/adv".into()],
            },
            Finding {
                id: "ENV-002".into(),
                title: "APP_DEBUG is enabled".into(),
                description: "Second occurrence with a shared rule id".into(),
                severity: Severity::High,
                category: "Configuration".into(),
                scanner: "env-scanner".into(),
                file: ".env.staging".into(),
                line: 4,
                code_snippet: String::new(),
                remediation: "Set APP_DEBUG=false".into(),
                references: vec![],
            },
        ],
        started_at: now,
        completed_at: now + chrono::Duration::milliseconds(1500),
        scanners_run: vec!["env-scanner".into(), "dependency-scanner".into()],
        scanner_errors: BTreeMap::new(),
    }
}

#[test]
fn json_report_round_trips_core_fields() {
    let dir = tempfile::tempdir().unwrap();
    let report = sample_report("/tmp/fx");

    let path = JsonReporter::new(dir.path()).generate(&report).unwrap();
    assert_eq!(path.file_name().unwrap(), "ward-report.json");

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(parsed["project"]["name"], "acme/shop");
    assert_eq!(parsed["summary"]["total_findings"], 3);
    assert_eq!(parsed["summary"]["by_severity"]["High"], 2);
    assert_eq!(parsed["summary"]["by_severity"]["Critical"], 1);

    let findings = parsed["findings"].as_array().unwrap();
    assert_eq!(findings.len(), 3);
    assert_eq!(findings[0]["id"], "ENV-002");
    assert_eq!(findings[0]["severity"], "High");
    assert_eq!(findings[0]["file"], ".env");
    assert_eq!(findings[0]["line"], 2);
    // Line 0 means not line-scoped and is omitted from the document.
    assert_eq!(findings[1]["id"], "CVE-2024-12345");
    assert!(findings[1].get("line").is_none());
}

#[test]
fn sarif_rules_are_unique_and_results_reference_them() {
    let dir = tempfile::tempdir().unwrap();
    let report = sample_report("/tmp/fx");

    let path = SarifReporter::new(dir.path()).generate(&report).unwrap();
    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(parsed["version"], "2.1.0");
    let run = &parsed["runs"][0];
    let rules = run["tool"]["driver"]["rules"].as_array().unwrap();
    let results = run["results"].as_array().unwrap();

    // Two unique ids across three findings.
    assert_eq!(rules.len(), 2);
    assert_eq!(results.len(), 3);

    for result in results {
        let index = result["ruleIndex"].as_u64().unwrap() as usize;
        assert!(index < rules.len());
        assert_eq!(rules[index]["id"], result["ruleId"]);

        // startLine is clamped to >= 1 and uriBaseId is omitted.
        let region = &result["locations"][0]["physicalLocation"]["region"];
        assert!(region["startLine"].as_u64().unwrap() >= 1);
        let artifact = &result["locations"][0]["physicalLocation"]["artifactLocation"];
        assert!(artifact.get("uriBaseId").is_none());
    }

    // Critical maps to error, and security-severity mirrors the level name.
    let cve_rule = rules
        .iter()
        .find(|rule| rule["id"] == "CVE-2024-12345")
        .unwrap();
    assert_eq!(cve_rule["defaultConfiguration"]["level"], "error");
    assert_eq!(cve_rule["properties"]["security-severity"], "critical");

    // Findings with references carry a fingerprint.
    let with_refs = results
        .iter()
        .find(|result| result["ruleId"] == "CVE-2024-12345")
        .unwrap();
    assert!(with_refs["partialFingerprints"]["primaryLocationLineHash"].is_string());
}

#[test]
fn html_report_escapes_user_content() {
    let dir = tempfile::tempdir().unwrap();
    let mut report = sample_report("/tmp/fx");
    report.findings[0].code_snippet = "'debug' => env('APP_DEBUG', false),".into();

    let path = HtmlReporter::new(dir.path()).generate(&report).unwrap();
    let html = std::fs::read_to_string(&path).unwrap();

    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains("&lt;stack traces&gt; &amp; queries"));
    assert!(!html.contains("<stack traces>"));
    assert!(html.contains("&#39;debug&#39; =&gt; env(&#39;APP_DEBUG&#39;, false),"));
    assert!(!html.contains("'debug' => env("));
    assert!(html.contains("prefers-color-scheme: light"));
}

#[test]
fn markdown_groups_by_descending_severity() {
    let dir = tempfile::tempdir().unwrap();
    let report = sample_report("/tmp/fx");

    let path = MarkdownReporter::new(dir.path()).generate(&report).unwrap();
    let markdown = std::fs::read_to_string(&path).unwrap();

    let critical = markdown.find("## Critical").unwrap();
    let high = markdown.find("## High").unwrap();
    assert!(critical < high);
    assert!(markdown.contains("`.env:2`"));
    assert!(markdown.contains("# Ward Security Report"));
}

#[test]
fn json_is_always_in_the_reporter_set() {
    let dir = tempfile::tempdir().unwrap();

    let reporters = build_reporters(&[], dir.path());
    assert_eq!(reporters.len(), 1);
    assert_eq!(reporters[0].name(), "json");

    let reporters = build_reporters(
        &["sarif".to_string(), "terminal".to_string(), "sarif".to_string()],
        dir.path(),
    );
    let names: Vec<&str> = reporters.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["sarif", "json"]);
}
