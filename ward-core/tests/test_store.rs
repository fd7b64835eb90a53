use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Duration, Utc};
use ward_core::domain::{Finding, ProjectContext, ScanReport, Severity};
use ward_core::infrastructure::HistoryStore;

fn finding(id: &str, file: &str, line: u32) -> Finding {
    Finding {
        id: id.into(),
        title: String::new(),
        description: String::new(),
        severity: Severity::High,
        category: "Test".into(),
        scanner: "test".into(),
        file: file.into(),
        line,
        code_snippet: String::new(),
        remediation: String::new(),
        references: vec![],
    }
}

fn report(root: &str, findings: Vec<Finding>, offset_secs: i64) -> ScanReport {
    let completed = Utc::now() + Duration::seconds(offset_secs);
    ScanReport {
        project: ProjectContext {
            root_path: PathBuf::from(root),
            project_name: "acme/shop".into(),
            ..Default::default()
        },
        findings,
        started_at: completed - Duration::seconds(1),
        completed_at: completed,
        scanners_run: vec!["env-scanner".into()],
        scanner_errors: BTreeMap::new(),
    }
}

#[test]
fn save_then_list_returns_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::new(dir.path());

    let record = store
        .save(&report("/tmp/fx", vec![finding("ENV-002", ".env", 2)], 0))
        .unwrap();
    assert_eq!(record.finding_count, 1);
    assert_eq!(record.by_severity.get("High"), Some(&1));
    assert_eq!(record.id.len(), 12);

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].project_path, "/tmp/fx");
    assert_eq!(listed[0].finding_ids, vec!["ENV-002|.env|2"]);
}

#[test]
fn compare_last_reports_new_and_resolved() {
    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::new(dir.path());

    store
        .save(&report(
            "/tmp/fx",
            vec![finding("ENV-002", ".env", 2), finding("CFG-001", "config/app.php", 7)],
            -60,
        ))
        .unwrap();

    let current = report(
        "/tmp/fx",
        vec![finding("ENV-002", ".env", 2), finding("XSS-001", "a.blade.php", 4)],
        0,
    );
    let diff = store.compare_last(&current).unwrap().unwrap();

    assert_eq!(diff.new_findings, vec!["XSS-001|a.blade.php|4"]);
    assert_eq!(diff.resolved_findings, vec!["CFG-001|config/app.php|7"]);
    assert_eq!(diff.total_before, 2);
    assert_eq!(diff.total_after, 2);
}

#[test]
fn compare_last_ignores_other_projects() {
    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::new(dir.path());

    store
        .save(&report("/tmp/other", vec![finding("ENV-002", ".env", 2)], -60))
        .unwrap();

    let current = report("/tmp/fx", vec![], 0);
    assert!(store.compare_last(&current).unwrap().is_none());
}

#[test]
fn list_is_most_recent_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::new(dir.path());

    store.save(&report("/tmp/fx", vec![], -120)).unwrap();
    store
        .save(&report("/tmp/fx", vec![finding("A", "f", 1)], 0))
        .unwrap();

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0].timestamp > listed[1].timestamp);
    assert_eq!(listed[0].finding_count, 1);
}
