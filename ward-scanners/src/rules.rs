//! Rule-based scanner
//!
//! Executes declarative [`RuleDefinition`]s from the rule store against
//! categorized file targets. Three pattern types:
//!
//! - `regex` / `contains`: line-oriented matching over the target's files.
//!   Positive patterns yield one finding per matching line; negative patterns
//!   yield one finding per file that contains no match.
//! - `file-exists`: glob under the project root. Positive yields one finding
//!   per matched file; negative yields a single finding when nothing matches.
//!
//! Invalid regexes are skipped silently; a broken pattern must not take the
//! rest of the rule set down with it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use globset::{Glob, GlobSetBuilder};
use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use walkdir::WalkDir;

use ward_core::config::{PatternDef, PatternType, RuleDefinition};
use ward_core::domain::{
    truncate_snippet, Finding, FindingEmitter, ProjectContext, Scanner, ScannerError,
};

/// Directories never descended into during target walks: package caches, VCS
/// metadata, framework storage, editor state.
const SKIP_DIRS: [&str; 6] = ["vendor", "node_modules", ".git", "storage", ".idea", ".vscode"];

/// Scanner executing user-supplied YAML rules.
#[derive(Debug)]
pub struct RulesScanner {
    rules: Vec<RuleDefinition>,
}

impl RulesScanner {
    pub fn new(rules: Vec<RuleDefinition>) -> Self {
        Self { rules }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

#[async_trait]
impl Scanner for RulesScanner {
    fn name(&self) -> &'static str {
        "rules-scanner"
    }

    fn description(&self) -> &'static str {
        "Custom YAML rule checks"
    }

    async fn scan(
        &self,
        cancel: &CancellationToken,
        project: &ProjectContext,
        emit: FindingEmitter<'_>,
    ) -> Result<Vec<Finding>, ScannerError> {
        let mut findings = Vec::new();

        for rule in &self.rules {
            if cancel.is_cancelled() {
                return Err(ScannerError::Cancelled);
            }
            if !rule.enabled {
                continue;
            }
            for pattern in &rule.patterns {
                for finding in evaluate_pattern(self.name(), rule, pattern, &project.root_path) {
                    emit(finding.clone());
                    findings.push(finding);
                }
            }
        }

        Ok(findings)
    }
}

fn evaluate_pattern(
    scanner: &str,
    rule: &RuleDefinition,
    pattern: &PatternDef,
    root: &Path,
) -> Vec<Finding> {
    match pattern.pattern_type {
        PatternType::FileExists => check_file_exists(scanner, rule, pattern, root),
        PatternType::Regex | PatternType::Contains => {
            check_file_content(scanner, rule, pattern, root)
        }
    }
}

fn check_file_exists(
    scanner: &str,
    rule: &RuleDefinition,
    pattern: &PatternDef,
    root: &Path,
) -> Vec<Finding> {
    let matches = glob_files(root, &pattern.pattern);

    if pattern.negative {
        if matches.is_empty() {
            return vec![build_finding(scanner, rule, &pattern.pattern, 0, "")];
        }
        return Vec::new();
    }

    matches
        .iter()
        .map(|path| build_finding(scanner, rule, &relative(root, path), 0, ""))
        .collect()
}

fn check_file_content(
    scanner: &str,
    rule: &RuleDefinition,
    pattern: &PatternDef,
    root: &Path,
) -> Vec<Finding> {
    let files = resolve_target(&pattern.target, root);
    if files.is_empty() {
        return Vec::new();
    }

    let regex = match pattern.pattern_type {
        PatternType::Regex => match Regex::new(&pattern.pattern) {
            Ok(re) => Some(re),
            Err(error) => {
                debug!(rule = %rule.id, %error, "Skipping invalid rule regex");
                return Vec::new();
            }
        },
        _ => None,
    };
    let exclude = pattern
        .exclude_pattern
        .as_deref()
        .and_then(|p| Regex::new(p).ok());

    let mut findings = Vec::new();
    for file in files {
        let matches = scan_file(&file, pattern, regex.as_ref(), exclude.as_ref());
        let rel = relative(root, &file);

        if pattern.negative {
            if matches.is_empty() {
                findings.push(build_finding(scanner, rule, &rel, 0, ""));
            }
        } else {
            for (line, text) in matches {
                findings.push(build_finding(scanner, rule, &rel, line, &text));
            }
        }
    }
    findings
}

/// Matching lines of one file as `(1-based line, trimmed text)`.
fn scan_file(
    path: &Path,
    pattern: &PatternDef,
    regex: Option<&Regex>,
    exclude: Option<&Regex>,
) -> Vec<(u32, String)> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };

    let mut matches = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let matched = match pattern.pattern_type {
            PatternType::Regex => regex.is_some_and(|re| re.is_match(line)),
            PatternType::Contains => line.contains(&pattern.pattern),
            PatternType::FileExists => false,
        };
        if !matched {
            continue;
        }
        if exclude.is_some_and(|re| re.is_match(line)) {
            continue;
        }
        matches.push((index as u32 + 1, line.trim().to_string()));
    }
    matches
}

/// Map a target name to concrete files under the project root.
///
/// Known categories get baked-in locations; recursive categories add a
/// filesystem walk. A target containing glob metacharacters is used as a
/// literal glob relative to the root.
fn resolve_target(target: &str, root: &Path) -> Vec<PathBuf> {
    let mut files = match target {
        "php-files" => walk_by_suffix(root, &[".php"]),
        "blade-files" => walk_by_suffix(root, &[".blade.php"]),
        "js-files" => walk_by_suffix(root, &[".js", ".ts", ".jsx", ".tsx"]),
        "config-files" => list_dir(&root.join("config"), ".php"),
        "routes-files" => list_dir(&root.join("routes"), ".php"),
        "migration-files" => list_dir(&root.join("database").join("migrations"), ".php"),
        "env-files" => {
            let mut found = glob_files(root, ".env");
            found.extend(glob_files(root, ".env.*"));
            found
        }
        other if other.chars().any(|c| matches!(c, '*' | '?' | '[')) => glob_files(root, other),
        _ => Vec::new(),
    };
    files.sort();
    files.dedup();
    files
}

/// Files matching a glob pattern relative to the root.
fn glob_files(root: &Path, pattern: &str) -> Vec<PathBuf> {
    let mut builder = GlobSetBuilder::new();
    match Glob::new(pattern) {
        Ok(glob) => builder.add(glob),
        Err(_) => return Vec::new(),
    };
    let Ok(set) = builder.build() else {
        return Vec::new();
    };

    walk(root)
        .filter(|path| {
            let rel = path.strip_prefix(root).unwrap_or(path);
            set.is_match(rel)
        })
        .collect()
}

/// Recursive walk collecting files by suffix, skipping heavy directories.
fn walk_by_suffix(root: &Path, suffixes: &[&str]) -> Vec<PathBuf> {
    walk(root)
        .filter(|path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            suffixes.iter().any(|suffix| name.ends_with(suffix))
        })
        .collect()
}

fn walk(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| SKIP_DIRS.contains(&name)))
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
}

/// Non-recursive listing of one directory by extension suffix.
fn list_dir(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| name.ends_with(suffix))
        })
        .collect()
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

fn build_finding(
    scanner: &str,
    rule: &RuleDefinition,
    file: &str,
    line: u32,
    snippet: &str,
) -> Finding {
    Finding {
        id: rule.id.clone(),
        title: rule.title.clone(),
        description: rule.description.clone(),
        severity: rule.severity,
        category: rule.category.clone(),
        scanner: scanner.to_string(),
        file: file.to_string(),
        line,
        code_snippet: truncate_snippet(snippet),
        remediation: rule.remediation.clone(),
        references: rule.references.clone(),
    }
}
