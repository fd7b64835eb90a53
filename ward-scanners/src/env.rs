//! Environment file scanner
//!
//! Fixed checks (ENV-001 … ENV-008) over `.env` and `.env.example`. Values
//! are read straight from disk; the masked copies in [`ProjectContext`] are
//! never used here.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use ward_core::domain::{Finding, FindingEmitter, ProjectContext, Scanner, ScannerError, Severity};

use crate::envfile::EnvFile;

const SENSITIVE_EXAMPLE_KEYS: [&str; 5] = [
    "DB_PASSWORD",
    "MAIL_PASSWORD",
    "AWS_SECRET_ACCESS_KEY",
    "REDIS_PASSWORD",
    "PUSHER_APP_SECRET",
];

/// Scanner for `.env` security issues.
#[derive(Debug, Default)]
pub struct EnvScanner;

impl EnvScanner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Scanner for EnvScanner {
    fn name(&self) -> &'static str {
        "env-scanner"
    }

    fn description(&self) -> &'static str {
        "Environment file security checks"
    }

    async fn scan(
        &self,
        _cancel: &CancellationToken,
        project: &ProjectContext,
        emit: FindingEmitter<'_>,
    ) -> Result<Vec<Finding>, ScannerError> {
        let mut findings = Vec::new();
        let mut push = |finding: Finding| {
            emit(finding.clone());
            findings.push(finding);
        };

        let env_path = project.root_path.join(".env");
        let env = match tokio::fs::read_to_string(&env_path).await {
            Ok(content) => EnvFile::parse(&content),
            Err(_) => {
                push(Finding {
                    id: "ENV-001".into(),
                    title: "No .env file found".into(),
                    description: "The project has no .env file. While this may be intentional \
                                  in containerized deployments, ensure environment configuration \
                                  is provided through another mechanism."
                        .into(),
                    severity: Severity::Info,
                    category: "Configuration".into(),
                    scanner: self.name().into(),
                    file: ".env".into(),
                    line: 0,
                    code_snippet: String::new(),
                    remediation: "Copy .env.example to .env and configure your environment \
                                  variables."
                        .into(),
                    references: vec![],
                });
                return Ok(findings);
            }
        };

        if let Some(value) = env.get("APP_DEBUG") {
            if value.eq_ignore_ascii_case("true") {
                push(Finding {
                    id: "ENV-002".into(),
                    title: "APP_DEBUG is enabled".into(),
                    description: "APP_DEBUG is set to true. In production, this exposes detailed \
                                  error messages including stack traces, database queries, and \
                                  environment variables to end users."
                        .into(),
                    severity: Severity::High,
                    category: "Configuration".into(),
                    scanner: self.name().into(),
                    file: ".env".into(),
                    line: env.line_of("APP_DEBUG"),
                    code_snippet: format!("APP_DEBUG={value}"),
                    remediation: "Set APP_DEBUG=false in your production .env file. Use Laravel's \
                                  logging system for error tracking instead."
                        .into(),
                    references: vec![
                        "https://owasp.org/Top10/A05_2021-Security_Misconfiguration/".into(),
                    ],
                });
            }
        }

        match env.get("APP_KEY") {
            Some("") => push(Finding {
                id: "ENV-003".into(),
                title: "APP_KEY is empty".into(),
                description: "The application encryption key is not set. Laravel uses this key to \
                              encrypt cookies, sessions, and other sensitive data. Without it, \
                              encrypted data is insecure."
                    .into(),
                severity: Severity::Critical,
                category: "Cryptography".into(),
                scanner: self.name().into(),
                file: ".env".into(),
                line: env.line_of("APP_KEY"),
                code_snippet: "APP_KEY=".into(),
                remediation: "Generate a new application key: php artisan key:generate".into(),
                references: vec!["https://cwe.mitre.org/data/definitions/321.html".into()],
            }),
            Some(value) if is_weak_key(value) => push(Finding {
                id: "ENV-004".into(),
                title: "APP_KEY appears to be a default or weak key".into(),
                description: "The application key looks like a default or placeholder value. This \
                              makes all encrypted data (sessions, cookies, passwords) predictable \
                              and breakable."
                    .into(),
                severity: Severity::Critical,
                category: "Cryptography".into(),
                scanner: self.name().into(),
                file: ".env".into(),
                line: env.line_of("APP_KEY"),
                code_snippet: format!("APP_KEY={value}"),
                remediation: "Generate a new application key: php artisan key:generate".into(),
                references: vec!["https://cwe.mitre.org/data/definitions/321.html".into()],
            }),
            Some(_) => {}
            None => push(Finding {
                id: "ENV-003".into(),
                title: "APP_KEY is not defined".into(),
                description: "No APP_KEY variable found in .env. Laravel requires this key for \
                              all encryption operations."
                    .into(),
                severity: Severity::Critical,
                category: "Cryptography".into(),
                scanner: self.name().into(),
                file: ".env".into(),
                line: 0,
                code_snippet: String::new(),
                remediation: "Add APP_KEY to .env and generate a key: php artisan key:generate"
                    .into(),
                references: vec!["https://cwe.mitre.org/data/definitions/321.html".into()],
            }),
        }

        if let Some(value) = env.get("APP_ENV") {
            let lowered = value.to_ascii_lowercase();
            if matches!(lowered.as_str(), "local" | "development" | "dev") {
                push(Finding {
                    id: "ENV-005".into(),
                    title: format!("APP_ENV is set to '{value}'"),
                    description: "The application environment suggests a non-production \
                                  configuration. If this is a production server, debug features \
                                  may be enabled and performance optimizations skipped."
                        .into(),
                    severity: Severity::Medium,
                    category: "Configuration".into(),
                    scanner: self.name().into(),
                    file: ".env".into(),
                    line: env.line_of("APP_ENV"),
                    code_snippet: format!("APP_ENV={value}"),
                    remediation: "Set APP_ENV=production on production servers.".into(),
                    references: vec![],
                });
            }
        }

        if env.get("DB_PASSWORD") == Some("") {
            push(Finding {
                id: "ENV-006".into(),
                title: "Database password is empty".into(),
                description: "DB_PASSWORD is set to an empty string. While this may be valid for \
                              local development with trust authentication, it's a security risk \
                              if this configuration reaches production."
                    .into(),
                severity: Severity::Low,
                category: "Configuration".into(),
                scanner: self.name().into(),
                file: ".env".into(),
                line: env.line_of("DB_PASSWORD"),
                code_snippet: "DB_PASSWORD=".into(),
                remediation: "Set a strong database password for non-local environments.".into(),
                references: vec![],
            });
        }

        if env.get("SESSION_DRIVER") == Some("file")
            && env
                .get("APP_ENV")
                .is_some_and(|e| e.eq_ignore_ascii_case("production"))
        {
            push(Finding {
                id: "ENV-007".into(),
                title: "File-based sessions in production".into(),
                description: "SESSION_DRIVER is set to 'file' in what appears to be a production \
                              environment. File sessions don't scale across multiple servers and \
                              are slower than alternatives."
                    .into(),
                severity: Severity::Low,
                category: "Configuration".into(),
                scanner: self.name().into(),
                file: ".env".into(),
                line: env.line_of("SESSION_DRIVER"),
                code_snippet: "SESSION_DRIVER=file".into(),
                remediation: "Use redis, memcached, or database session drivers for production: \
                              SESSION_DRIVER=redis"
                    .into(),
                references: vec![],
            });
        }

        for finding in self.check_env_example(project).await {
            push(finding);
        }

        Ok(findings)
    }
}

impl EnvScanner {
    /// ENV-008: `.env.example` is committed to version control, so any
    /// sensitive key holding a real-looking value there is a leaked secret.
    async fn check_env_example(&self, project: &ProjectContext) -> Vec<Finding> {
        let path = project.root_path.join(".env.example");
        let Ok(content) = tokio::fs::read_to_string(&path).await else {
            return Vec::new();
        };
        let env = EnvFile::parse(&content);

        let mut findings = Vec::new();
        for key in SENSITIVE_EXAMPLE_KEYS {
            let Some(value) = env.get(key) else { continue };
            if value.is_empty() || is_placeholder(value) || value.len() <= 6 {
                continue;
            }
            findings.push(Finding {
                id: "ENV-008".into(),
                title: format!("Potential real credential in .env.example: {key}"),
                description: format!(
                    "The .env.example file contains a value for {key} that doesn't look like a \
                     placeholder. This file is typically committed to version control and should \
                     only contain example values."
                ),
                severity: Severity::Medium,
                category: "Secrets".into(),
                scanner: self.name().into(),
                file: ".env.example".into(),
                line: env.line_of(key),
                code_snippet: format!("{key}={}", mask_value(value)),
                remediation: format!(
                    "Replace the value of {key} in .env.example with a placeholder like \
                     'your_{}_here'.",
                    key.to_ascii_lowercase()
                ),
                references: vec!["https://cwe.mitre.org/data/definitions/798.html".into()],
            });
        }
        findings
    }
}

fn is_weak_key(value: &str) -> bool {
    let lowered = value.to_ascii_lowercase();
    if lowered.starts_with("base64:aaaaaaa") {
        return true;
    }
    if lowered == "somerandostrng" || lowered == "somerandomstring" {
        return true;
    }
    // A real key is 32 bytes of base64; anything this short is a stub.
    value.starts_with("base64:") && value.len() < 20
}

fn is_placeholder(value: &str) -> bool {
    let lowered = value.to_ascii_lowercase();
    matches!(lowered.as_str(), "null" | "secret" | "password" | "changeme")
        || (lowered.starts_with("your_") && lowered.ends_with("_here"))
}

/// Keep the first and last two characters, mask the rest.
fn mask_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_key_predicates() {
        assert!(is_weak_key("base64:AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="));
        assert!(is_weak_key("base64:short"));
        assert!(is_weak_key("SomeRandomString"));
        assert!(!is_weak_key("base64:abcdefghijklmnopqrstuvwxyz123456"));
    }

    #[test]
    fn placeholder_detection() {
        assert!(is_placeholder("null"));
        assert!(is_placeholder("CHANGEME"));
        assert!(is_placeholder("your_db_password_here"));
        assert!(!is_placeholder("hunter2hunter2"));
    }

    #[test]
    fn masking_keeps_edges() {
        assert_eq!(mask_value("s3cretpass"), "s3******ss");
        assert_eq!(mask_value("abcd"), "****");
    }
}
