//! Declarative rule definitions and the YAML rule store
//!
//! Rules live in `~/.ward/rules/*.yaml` plus any directories named in
//! `rules.custom_dirs`. Load order is deterministic: directories in
//! configuration order, files within a directory sorted by name, rules in
//! file order. User-level disables and overrides are applied after loading.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ConfigError, RulesConfig};
use crate::domain::Severity;

/// How a single pattern matches against its target files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternType {
    Regex,
    Contains,
    FileExists,
}

/// One pattern check within a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternDef {
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    /// File category (`php-files`, `blade-files`, …) or a literal glob.
    #[serde(default)]
    pub target: String,
    pub pattern: String,
    /// `true` flips the check: the finding fires when the pattern is absent.
    #[serde(default)]
    pub negative: bool,
    /// Lines also matching this pattern are not counted as matches.
    #[serde(default)]
    pub exclude_pattern: Option<String>,
}

/// A declarative rule as written in a YAML rules file. Pure data; the rules
/// scanner interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<PatternDef>,
    #[serde(default)]
    pub remediation: String,
    #[serde(default)]
    pub references: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

/// Top-level structure of a rules YAML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

/// Read a single rules file. Rules with an empty id are dropped with a
/// warning; they have no stable identity for baselines or overrides.
pub fn load_rules_file(path: &Path) -> Result<Vec<RuleDefinition>, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let file: RuleFile = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rules = Vec::with_capacity(file.rules.len());
    for rule in file.rules {
        if rule.id.trim().is_empty() {
            warn!(path = %path.display(), "Skipping rule with empty id");
            continue;
        }
        rules.push(rule);
    }
    Ok(rules)
}

/// Load every `.yaml`/`.yml` file in a directory, sorted by file name.
/// A missing directory yields no rules.
pub fn load_rules_dir(dir: &Path) -> Result<Vec<RuleDefinition>, ConfigError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("yaml") | Some("yml")
                )
        })
        .collect();
    paths.sort();

    let mut all = Vec::new();
    for path in paths {
        all.extend(load_rules_file(&path)?);
    }
    Ok(all)
}

/// Load rules from the well-known rules directory plus any custom
/// directories, then apply the user's disable list and per-rule overrides.
pub fn load_all_rules(rules_config: &RulesConfig) -> Result<Vec<RuleDefinition>, ConfigError> {
    let mut all = Vec::new();

    if let Ok(dir) = crate::infrastructure::dirs::rules_dir() {
        all.extend(load_rules_dir(&dir)?);
    }
    for dir in &rules_config.custom_dirs {
        all.extend(load_rules_dir(dir)?);
    }

    Ok(apply_overrides(all, rules_config))
}

/// Apply `rules.disable` and `rules.override` to a loaded rule set.
pub fn apply_overrides(
    rules: Vec<RuleDefinition>,
    rules_config: &RulesConfig,
) -> Vec<RuleDefinition> {
    rules
        .into_iter()
        .filter(|rule| !rules_config.disable.iter().any(|id| id == &rule.id))
        .filter_map(|mut rule| {
            if let Some(over) = rules_config.overrides.get(&rule.id) {
                if let Some(severity) = over.severity {
                    rule.severity = severity;
                }
                if over.enabled == Some(false) {
                    return None;
                }
            }
            Some(rule)
        })
        .collect()
}
