mod common;

use std::path::Path;

use common::{context_for, run_scanner, with_id};
use ward_core::config::{PatternDef, PatternType, RuleDefinition};
use ward_core::domain::Severity;
use ward_scanners::RulesScanner;

fn rule(id: &str, patterns: Vec<PatternDef>) -> RuleDefinition {
    RuleDefinition {
        id: id.into(),
        title: format!("{id} title"),
        description: String::new(),
        severity: Severity::Medium,
        category: "Rules".into(),
        enabled: true,
        tags: vec![],
        patterns,
        remediation: String::new(),
        references: vec![],
    }
}

fn pattern(pattern_type: PatternType, target: &str, text: &str, negative: bool) -> PatternDef {
    PatternDef {
        pattern_type,
        target: target.into(),
        pattern: text.into(),
        negative,
        exclude_pattern: None,
    }
}

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("app/Models")).unwrap();
    std::fs::create_dir_all(root.join("routes")).unwrap();
    std::fs::create_dir_all(root.join("vendor/package")).unwrap();
    std::fs::write(
        root.join("app/Models/User.php"),
        "<?php\nclass User extends Model\n{\n    public $timestamps = true;\n}\n",
    )
    .unwrap();
    std::fs::write(
        root.join("routes/web.php"),
        "<?php\nRoute::get('/', fn () => view('welcome'));\nRoute::get('/admin', 'AdminController@index');\n",
    )
    .unwrap();
    // Files under vendor/ must never be scanned.
    std::fs::write(
        root.join("vendor/package/evil.php"),
        "<?php\neval($_GET['cmd']);\n",
    )
    .unwrap();
    dir
}

#[tokio::test]
async fn positive_contains_pattern_reports_each_matching_line() {
    let dir = fixture();
    let scanner = RulesScanner::new(vec![rule(
        "ROUTE-001",
        vec![pattern(PatternType::Contains, "php-files", "Route::get", false)],
    )]);

    let (findings, emitted) = run_scanner(&scanner, &context_for(dir.path())).await.unwrap();

    let hits = with_id(&findings, "ROUTE-001");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].file, "routes/web.php");
    assert_eq!(hits[0].line, 2);
    assert_eq!(hits[1].line, 3);
    assert_eq!(emitted.len(), findings.len());
}

#[tokio::test]
async fn negative_pattern_fires_per_file_without_match() {
    // One model class with no $fillable declaration gets exactly one
    // finding with no line number.
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("app/Models")).unwrap();
    std::fs::write(
        dir.path().join("app/Models/User.php"),
        "<?php\nclass User extends Model\n{\n    public $timestamps = true;\n}\n",
    )
    .unwrap();

    let scanner = RulesScanner::new(vec![rule(
        "MODEL-001",
        vec![pattern(PatternType::Contains, "php-files", "$fillable", true)],
    )]);

    let (findings, _) = run_scanner(&scanner, &context_for(dir.path())).await.unwrap();

    let hits = with_id(&findings, "MODEL-001");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].file, "app/Models/User.php");
    assert_eq!(hits[0].line, 0);
}

#[tokio::test]
async fn vendor_directories_are_skipped() {
    let dir = fixture();
    let scanner = RulesScanner::new(vec![rule(
        "EVAL-001",
        vec![pattern(PatternType::Contains, "php-files", "eval(", false)],
    )]);

    let (findings, _) = run_scanner(&scanner, &context_for(dir.path())).await.unwrap();
    assert!(with_id(&findings, "EVAL-001").is_empty());
}

#[tokio::test]
async fn regex_pattern_matches_lines() {
    let dir = fixture();
    let scanner = RulesScanner::new(vec![rule(
        "ROUTE-002",
        vec![pattern(
            PatternType::Regex,
            "routes-files",
            r"Route::(get|post)\('/admin",
            false,
        )],
    )]);

    let (findings, _) = run_scanner(&scanner, &context_for(dir.path())).await.unwrap();
    let hits = with_id(&findings, "ROUTE-002");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].line, 3);
    assert!(hits[0].code_snippet.contains("/admin"));
}

#[tokio::test]
async fn invalid_regex_is_skipped_without_aborting_other_patterns() {
    let dir = fixture();
    let scanner = RulesScanner::new(vec![rule(
        "MIXED-001",
        vec![
            pattern(PatternType::Regex, "php-files", "([unclosed", false),
            pattern(PatternType::Contains, "routes-files", "Route::get", false),
        ],
    )]);

    let (findings, _) = run_scanner(&scanner, &context_for(dir.path())).await.unwrap();
    // The broken first pattern contributes nothing; the second still runs.
    assert_eq!(with_id(&findings, "MIXED-001").len(), 2);
}

#[tokio::test]
async fn file_exists_positive_and_negative() {
    let dir = fixture();
    std::fs::write(dir.path().join(".env.backup"), "APP_KEY=leaked\n").unwrap();

    let scanner = RulesScanner::new(vec![
        rule(
            "BACKUP-001",
            vec![pattern(PatternType::FileExists, "", ".env.backup", false)],
        ),
        rule(
            "LOCK-001",
            vec![pattern(PatternType::FileExists, "", "composer.lock", true)],
        ),
    ]);

    let (findings, _) = run_scanner(&scanner, &context_for(dir.path())).await.unwrap();

    let backup = with_id(&findings, "BACKUP-001");
    assert_eq!(backup.len(), 1);
    assert_eq!(backup[0].file, ".env.backup");

    // No composer.lock in the fixture, so the negative check fires once.
    let lock = with_id(&findings, "LOCK-001");
    assert_eq!(lock.len(), 1);
    assert_eq!(lock[0].line, 0);
}

#[tokio::test]
async fn disabled_rules_do_not_run() {
    let dir = fixture();
    let mut disabled = rule(
        "ROUTE-001",
        vec![pattern(PatternType::Contains, "php-files", "Route::get", false)],
    );
    disabled.enabled = false;

    let scanner = RulesScanner::new(vec![disabled]);
    let (findings, _) = run_scanner(&scanner, &context_for(dir.path())).await.unwrap();
    assert!(findings.is_empty());
}

#[tokio::test]
async fn exclude_pattern_suppresses_matching_lines() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("routes")).unwrap();
    std::fs::write(
        dir.path().join("routes/web.php"),
        "<?php\nRoute::get('/open', 'C@a');\nRoute::get('/safe', 'C@b')->middleware('auth');\n",
    )
    .unwrap();

    let scanner = RulesScanner::new(vec![rule(
        "AUTH-001",
        vec![PatternDef {
            pattern_type: PatternType::Contains,
            target: "routes-files".into(),
            pattern: "Route::get".into(),
            negative: false,
            exclude_pattern: Some("middleware\\('auth'\\)".into()),
        }],
    )]);

    let (findings, _) = run_scanner(&scanner, &context_for(dir.path())).await.unwrap();
    let hits = with_id(&findings, "AUTH-001");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].line, 2);
}
