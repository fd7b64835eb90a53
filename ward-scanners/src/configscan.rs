//! Laravel configuration scanner
//!
//! Regex checks (CFG-001 … CFG-013) over a fixed whitelist of `config/*.php`
//! files. Each check reports at most once per file: the first matching line
//! wins. Secret-bearing snippets are masked before they leave this module.

use std::path::Path;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio_util::sync::CancellationToken;

use ward_core::domain::{Finding, FindingEmitter, ProjectContext, Scanner, ScannerError, Severity};

static DEBUG_TRUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"'debug'\s*=>\s*true").unwrap());
static CIPHER_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"'cipher'\s*=>\s*'([^']+)'").unwrap());
static RESET_EXPIRE: Lazy<Regex> = Lazy::new(|| Regex::new(r"'expire'\s*=>\s*(\d{3,})").unwrap());
static HTTP_ONLY_OFF: Lazy<Regex> = Lazy::new(|| Regex::new(r"'http_only'\s*=>\s*false").unwrap());
static SECURE_OFF: Lazy<Regex> = Lazy::new(|| Regex::new(r"'secure'\s*=>\s*false").unwrap());
static SAME_SITE_NONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'same_site'\s*=>\s*('none'|null)").unwrap());
static LONG_LIFETIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'lifetime'\s*=>\s*(\d{4,})").unwrap());
static HARDCODED_PASSWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'password'\s*=>\s*'[^']{4,}'").unwrap());
static HARDCODED_BROADCAST_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'(secret|key)'\s*=>\s*'[a-zA-Z0-9]{10,}'").unwrap());
static SLACK_WEBHOOK: Lazy<Regex> = Lazy::new(|| Regex::new(r"hooks\.slack\.com/services").unwrap());
static CORS_WILDCARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'allowed_origins'\s*=>\s*\[\s*'\*'\s*\]").unwrap());
static CORS_CREDENTIALS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'supports_credentials'\s*=>\s*true").unwrap());
static QUOTED_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"=>\s*'([^']{4,})'").unwrap());

/// Scanner for security misconfigurations in framework config files.
#[derive(Debug, Default)]
pub struct ConfigScanner;

impl ConfigScanner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Scanner for ConfigScanner {
    fn name(&self) -> &'static str {
        "config-scanner"
    }

    fn description(&self) -> &'static str {
        "Laravel configuration security checks"
    }

    async fn scan(
        &self,
        _cancel: &CancellationToken,
        project: &ProjectContext,
        emit: FindingEmitter<'_>,
    ) -> Result<Vec<Finding>, ScannerError> {
        let config_dir = project.root_path.join("config");
        if !config_dir.is_dir() {
            return Ok(Vec::new());
        }

        type CheckFn = fn(&ConfigScanner, &[String]) -> Vec<Finding>;
        let checks: [(&str, CheckFn); 8] = [
            ("app.php", Self::check_app),
            ("auth.php", Self::check_auth),
            ("session.php", Self::check_session),
            ("mail.php", Self::check_mail),
            ("cors.php", Self::check_cors),
            ("database.php", Self::check_database),
            ("broadcasting.php", Self::check_broadcasting),
            ("logging.php", Self::check_logging),
        ];

        let mut findings = Vec::new();
        for (file, check) in checks {
            let Some(lines) = read_lines(&config_dir.join(file)).await else {
                continue;
            };
            for finding in check(self, &lines) {
                emit(finding.clone());
                findings.push(finding);
            }
        }
        Ok(findings)
    }
}

impl ConfigScanner {
    fn check_app(&self, lines: &[String]) -> Vec<Finding> {
        let mut findings = Vec::new();

        if let Some((snippet, line)) = find_pattern(lines, &DEBUG_TRUE) {
            findings.push(self.finding(
                "CFG-001",
                "Debug mode hardcoded to true in app.php",
                "config/app.php has 'debug' => true instead of reading from env(). This means \
                 debug mode is always on, even in production.",
                Severity::High,
                "Configuration",
                "config/app.php",
                line,
                snippet,
                "Use: 'debug' => env('APP_DEBUG', false),",
                &["https://owasp.org/Top10/A05_2021-Security_Misconfiguration/"],
            ));
        }

        for (index, raw) in lines.iter().enumerate() {
            if let Some(caps) = CIPHER_VALUE.captures(raw) {
                let cipher = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                if !cipher.eq_ignore_ascii_case("aes-256-cbc") {
                    findings.push(self.finding(
                        "CFG-002",
                        "Non-standard encryption cipher configured",
                        "The application encryption cipher is not the recommended AES-256-CBC. \
                         Using a weaker cipher reduces the security of encrypted data.",
                        Severity::Medium,
                        "Cryptography",
                        "config/app.php",
                        index as u32 + 1,
                        raw.trim().to_string(),
                        "Use: 'cipher' => 'AES-256-CBC',",
                        &[],
                    ));
                }
                break;
            }
        }

        findings
    }

    fn check_auth(&self, lines: &[String]) -> Vec<Finding> {
        let Some((snippet, line)) = find_pattern(lines, &RESET_EXPIRE) else {
            return Vec::new();
        };
        vec![self.finding(
            "CFG-003",
            "Password reset token expiry is very long",
            "The password reset token expires after a very long period. Long-lived reset tokens \
             increase the window for token theft and reuse.",
            Severity::Low,
            "Authentication",
            "config/auth.php",
            line,
            snippet,
            "Set a reasonable expiry: 'expire' => 60, (60 minutes)",
            &[],
        )]
    }

    fn check_session(&self, lines: &[String]) -> Vec<Finding> {
        let mut findings = Vec::new();

        if let Some((snippet, line)) = find_pattern(lines, &HTTP_ONLY_OFF) {
            findings.push(self.finding(
                "CFG-004",
                "Session cookie missing HttpOnly flag",
                "The session cookie HttpOnly flag is set to false. This allows JavaScript to \
                 access the session cookie, enabling theft through XSS attacks.",
                Severity::High,
                "Configuration",
                "config/session.php",
                line,
                snippet,
                "Set: 'http_only' => true,",
                &["https://cwe.mitre.org/data/definitions/1004.html"],
            ));
        }

        if let Some((snippet, line)) = find_pattern(lines, &SECURE_OFF) {
            findings.push(self.finding(
                "CFG-005",
                "Session cookie missing Secure flag",
                "The session cookie Secure flag is false. The cookie will be sent over plain \
                 HTTP, allowing session hijacking via network sniffing.",
                Severity::Medium,
                "Configuration",
                "config/session.php",
                line,
                snippet,
                "Set: 'secure' => env('SESSION_SECURE_COOKIE', true),",
                &["https://cwe.mitre.org/data/definitions/614.html"],
            ));
        }

        if let Some((snippet, line)) = find_pattern(lines, &SAME_SITE_NONE) {
            findings.push(self.finding(
                "CFG-006",
                "Session cookie SameSite set to none",
                "The SameSite attribute is set to 'none', allowing the cookie to be sent with \
                 cross-site requests. This weakens CSRF protection.",
                Severity::Medium,
                "Configuration",
                "config/session.php",
                line,
                snippet,
                "Set: 'same_site' => 'lax', (or 'strict' for maximum protection)",
                &[],
            ));
        }

        if let Some((snippet, line)) = find_pattern(lines, &LONG_LIFETIME) {
            findings.push(self.finding(
                "CFG-007",
                "Session lifetime is excessively long",
                "Sessions persist for an unusually long time. Long session lifetimes increase \
                 the risk of session hijacking and unauthorized access from abandoned sessions.",
                Severity::Low,
                "Configuration",
                "config/session.php",
                line,
                snippet,
                "Set a reasonable session lifetime: 'lifetime' => 120, (2 hours)",
                &[],
            ));
        }

        findings
    }

    fn check_mail(&self, lines: &[String]) -> Vec<Finding> {
        let Some((snippet, line)) = find_pattern_not_env(lines, &HARDCODED_PASSWORD) else {
            return Vec::new();
        };
        vec![self.finding(
            "CFG-008",
            "Mail password hardcoded in config",
            "A mail password is hardcoded in config/mail.php instead of using env(). This \
             credential is exposed to anyone with source access.",
            Severity::High,
            "Secrets",
            "config/mail.php",
            line,
            mask_config_value(&snippet),
            "Use: 'password' => env('MAIL_PASSWORD'),",
            &[],
        )]
    }

    fn check_cors(&self, lines: &[String]) -> Vec<Finding> {
        let mut findings = Vec::new();
        let wildcard = find_pattern(lines, &CORS_WILDCARD);

        if let Some((snippet, line)) = wildcard.clone() {
            findings.push(self.finding(
                "CFG-009",
                "CORS allows all origins",
                "config/cors.php allows requests from any origin ('*'). This permits cross-site \
                 data theft if authenticated endpoints return sensitive data.",
                Severity::Medium,
                "Configuration",
                "config/cors.php",
                line,
                snippet,
                "Specify allowed origins: 'allowed_origins' => [env('FRONTEND_URL')],",
                &["https://cwe.mitre.org/data/definitions/942.html"],
            ));
        }

        if let Some((snippet, line)) = find_pattern(lines, &CORS_CREDENTIALS) {
            // Credentials combined with a wildcard origin is the dangerous pair.
            if wildcard.is_some() {
                findings.push(self.finding(
                    "CFG-010",
                    "CORS allows credentials with wildcard origin",
                    "CORS is configured with both 'supports_credentials' => true and wildcard \
                     allowed_origins. This combination allows any website to make authenticated \
                     requests to your API.",
                    Severity::High,
                    "Configuration",
                    "config/cors.php",
                    line,
                    snippet,
                    "Never combine 'supports_credentials' => true with wildcard origins. \
                     Specify exact allowed origins.",
                    &["https://cwe.mitre.org/data/definitions/942.html"],
                ));
            }
        }

        findings
    }

    fn check_database(&self, lines: &[String]) -> Vec<Finding> {
        let Some((snippet, line)) = find_pattern_not_env(lines, &HARDCODED_PASSWORD) else {
            return Vec::new();
        };
        vec![self.finding(
            "CFG-011",
            "Database password hardcoded in config",
            "A database password is hardcoded in config/database.php. Use env() to keep \
             credentials out of source.",
            Severity::High,
            "Secrets",
            "config/database.php",
            line,
            mask_config_value(&snippet),
            "Use: 'password' => env('DB_PASSWORD', ''),",
            &[],
        )]
    }

    fn check_broadcasting(&self, lines: &[String]) -> Vec<Finding> {
        let Some((snippet, line)) = find_pattern_not_env(lines, &HARDCODED_BROADCAST_KEY) else {
            return Vec::new();
        };
        vec![self.finding(
            "CFG-012",
            "Broadcasting secret/key hardcoded in config",
            "A Pusher or broadcasting service key is hardcoded instead of using env().",
            Severity::Medium,
            "Secrets",
            "config/broadcasting.php",
            line,
            mask_config_value(&snippet),
            "Use: 'secret' => env('PUSHER_APP_SECRET'),",
            &[],
        )]
    }

    fn check_logging(&self, lines: &[String]) -> Vec<Finding> {
        let Some((snippet, line)) = find_pattern_not_env(lines, &SLACK_WEBHOOK) else {
            return Vec::new();
        };
        vec![self.finding(
            "CFG-013",
            "Slack webhook URL hardcoded in logging config",
            "A Slack webhook URL is hardcoded in config/logging.php. Webhook URLs are sensitive; \
             anyone with the URL can post to your Slack channel.",
            Severity::Medium,
            "Secrets",
            "config/logging.php",
            line,
            mask_config_value(&snippet),
            "Use: 'url' => env('LOG_SLACK_WEBHOOK_URL'),",
            &[],
        )]
    }

    #[allow(clippy::too_many_arguments)]
    fn finding(
        &self,
        id: &str,
        title: &str,
        description: &str,
        severity: Severity,
        category: &str,
        file: &str,
        line: u32,
        code_snippet: String,
        remediation: &str,
        references: &[&str],
    ) -> Finding {
        Finding {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            severity,
            category: category.into(),
            scanner: self.name().into(),
            file: file.into(),
            line,
            code_snippet,
            remediation: remediation.into(),
            references: references.iter().map(|r| r.to_string()).collect(),
        }
    }
}

async fn read_lines(path: &Path) -> Option<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await.ok()?;
    Some(content.lines().map(str::to_string).collect())
}

/// First line matching the regex: `(trimmed line, 1-based number)`.
fn find_pattern(lines: &[String], re: &Regex) -> Option<(String, u32)> {
    lines
        .iter()
        .enumerate()
        .find(|(_, line)| re.is_match(line))
        .map(|(index, line)| (line.trim().to_string(), index as u32 + 1))
}

/// Like [`find_pattern`] but skips lines that read the value from env().
fn find_pattern_not_env(lines: &[String], re: &Regex) -> Option<(String, u32)> {
    lines
        .iter()
        .enumerate()
        .find(|(_, line)| re.is_match(line) && !line.contains("env("))
        .map(|(index, line)| (line.trim().to_string(), index as u32 + 1))
}

/// Mask quoted values longer than four characters, keeping two characters on
/// each edge.
fn mask_config_value(line: &str) -> String {
    QUOTED_VALUE
        .replace_all(line, |caps: &regex::Captures<'_>| {
            let value = &caps[1];
            let chars: Vec<char> = value.chars().collect();
            if chars.len() > 4 {
                let head: String = chars[..2].iter().collect();
                let tail: String = chars[chars.len() - 2..].iter().collect();
                format!("=> '{head}****{tail}'")
            } else {
                caps[0].to_string()
            }
        })
        .to_string()
}
