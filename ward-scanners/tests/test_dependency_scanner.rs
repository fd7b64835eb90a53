mod common;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{context_for, run_scanner};
use ward_core::domain::{Severity, ScannerError};
use ward_scanners::dependency::{DependencyScanner, OsvClient};

fn project_with_packages(packages: &[(&str, &str)]) -> ward_core::domain::ProjectContext {
    let dir = std::env::temp_dir();
    let mut project = context_for(&dir);
    for (name, version) in packages {
        project
            .installed_packages
            .insert(name.to_string(), version.to_string());
    }
    project
}

#[tokio::test]
async fn advisory_for_installed_package_becomes_finding() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/querybatch"))
        .and(body_partial_json(json!({
            "queries": [{
                "package": {"name": "laravel/framework", "ecosystem": "Packagist"},
                "version": "8.10.0"
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"vulns": [{"id": "GHSA-xxxx"}]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vulns": [{
                "id": "GHSA-xxxx",
                "summary": "RCE in cookie deserialization",
                "aliases": ["CVE-2024-12345"],
                "references": [
                    {"type": "ADVISORY", "url": "https://example.com/adv"}
                ],
                "affected": [{
                    "package": {"name": "laravel/framework", "ecosystem": "Packagist"},
                    "ranges": [{
                        "type": "ECOSYSTEM",
                        "events": [
                            {"introduced": "8.0.0"},
                            {"fixed": "8.22.1"}
                        ]
                    }]
                }],
                "database_specific": {"severity": "HIGH"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let scanner = DependencyScanner::with_client(OsvClient::new(server.uri()));
    let project = project_with_packages(&[("laravel/framework", "8.10.0")]);

    let (findings, emitted) = run_scanner(&scanner, &project).await.unwrap();

    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.id, "CVE-2024-12345");
    assert_eq!(finding.severity, Severity::High);
    assert_eq!(finding.category, "Dependencies");
    assert_eq!(finding.file, "composer.lock");
    assert!(finding.remediation.contains("8.22.1"));
    assert_eq!(emitted.len(), 1);
}

#[tokio::test]
async fn clean_batch_means_no_detail_queries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/querybatch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"vulns": []}, {}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"vulns": []})))
        .expect(0)
        .mount(&server)
        .await;

    let scanner = DependencyScanner::with_client(OsvClient::new(server.uri()));
    let project =
        project_with_packages(&[("laravel/framework", "10.0.0"), ("monolog/monolog", "3.2.0")]);

    let (findings, _) = run_scanner(&scanner, &project).await.unwrap();
    assert!(findings.is_empty());
}

#[tokio::test]
async fn batch_failure_fails_the_scanner() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/querybatch"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let scanner = DependencyScanner::with_client(OsvClient::new(server.uri()));
    let project = project_with_packages(&[("laravel/framework", "8.10.0")]);

    let result = run_scanner(&scanner, &project).await;
    assert!(matches!(result, Err(ScannerError::Advisory(_))));
}

#[tokio::test]
async fn detail_failure_is_skipped_per_package() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/querybatch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"vulns": [{"id": "A"}]}, {"vulns": [{"id": "B"}]}]
        })))
        .mount(&server)
        .await;

    // Both detail queries hit the same endpoint; serve an error body for the
    // first package and a real advisory for the second.
    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .and(body_partial_json(json!({
            "package": {"name": "laravel/framework"}
        })))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/query"))
        .and(body_partial_json(json!({
            "package": {"name": "monolog/monolog"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vulns": [{
                "id": "GHSA-mono",
                "summary": "Log injection",
                "database_specific": {"severity": "LOW"}
            }]
        })))
        .mount(&server)
        .await;

    let scanner = DependencyScanner::with_client(OsvClient::new(server.uri()));
    let project =
        project_with_packages(&[("laravel/framework", "8.10.0"), ("monolog/monolog", "1.0.0")]);

    let (findings, _) = run_scanner(&scanner, &project).await.unwrap();

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].id, "GHSA-mono");
    assert_eq!(findings[0].severity, Severity::Low);
}

#[tokio::test]
async fn dev_and_empty_versions_are_not_queried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/querybatch"))
        .and(body_partial_json(json!({
            "queries": [{
                "package": {"name": "monolog/monolog", "ecosystem": "Packagist"},
                "version": "3.2.0"
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"vulns": []}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let scanner = DependencyScanner::with_client(OsvClient::new(server.uri()));
    let project = project_with_packages(&[
        ("acme/unstable", "dev-master"),
        ("monolog/monolog", "v3.2.0"),
    ]);

    let (findings, _) = run_scanner(&scanner, &project).await.unwrap();
    assert!(findings.is_empty());
}

#[tokio::test]
async fn no_packages_means_no_network_traffic() {
    // Unroutable endpoint: any request would fail the test with an error.
    let scanner = DependencyScanner::with_client(OsvClient::new("http://127.0.0.1:1"));
    let project = project_with_packages(&[]);

    let (findings, _) = run_scanner(&scanner, &project).await.unwrap();
    assert!(findings.is_empty());
}
