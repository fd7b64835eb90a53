use ward_core::domain::{Finding, Severity};
use ward_core::infrastructure::Baseline;

fn finding(id: &str, file: &str, line: u32) -> Finding {
    Finding {
        id: id.into(),
        title: format!("{id} title"),
        description: String::new(),
        severity: Severity::Medium,
        category: "Test".into(),
        scanner: "test".into(),
        file: file.into(),
        line,
        code_snippet: String::new(),
        remediation: String::new(),
        references: vec![],
    }
}

#[test]
fn save_load_filter_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".ward-baseline.json");

    let findings = vec![
        finding("ENV-002", ".env", 2),
        finding("AUTH-001", "routes/web.php", 10),
        finding("SEC-001", "config/app.php", 5),
    ];

    Baseline::from_findings(&findings).save(&path).unwrap();
    let loaded = Baseline::load(&path).unwrap();

    assert_eq!(loaded.version, "1.0");
    assert_eq!(loaded.entries.len(), 3);

    // Filtering the same set suppresses everything.
    let (kept, suppressed) = loaded.filter(findings.clone());
    assert!(kept.is_empty());
    assert_eq!(suppressed, 3);

    // A new finding passes through.
    let mut next_scan = findings;
    next_scan.push(finding("XSS-001", "resources/views/user.blade.php", 42));
    let (kept, suppressed) = loaded.filter(next_scan);
    assert_eq!(suppressed, 3);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].id, "XSS-001");
}

#[test]
fn loaded_fingerprints_match_saved_findings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("baseline.json");

    let findings = vec![finding("CFG-004", "config/session.php", 31)];
    Baseline::from_findings(&findings).save(&path).unwrap();

    let loaded = Baseline::load(&path).unwrap();
    assert!(loaded.fingerprints().contains(&findings[0].fingerprint()));
}

#[test]
fn suppression_survives_metadata_changes() {
    let findings = vec![finding("ENV-002", ".env", 2)];
    let baseline = Baseline::from_findings(&findings);

    let mut reworded = finding("ENV-002", ".env", 2);
    reworded.title = "completely new title".into();
    reworded.severity = Severity::Critical;
    reworded.description = "rewritten".into();

    assert!(baseline.is_suppressed(&reworded));
}

#[test]
fn missing_baseline_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.json");
    assert!(Baseline::load(&path).is_err());
}
