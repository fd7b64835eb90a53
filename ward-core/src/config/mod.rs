//! Configuration management
//!
//! `WardConfig` is the aggregate value object handed to the pipeline at
//! start. It is loaded once (from `~/.ward/config.yaml` or an explicit path)
//! and passed by value; no process-scoped singleton exists.

pub mod rules;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::Severity;

pub use rules::{PatternDef, PatternType, RuleDefinition, RuleFile};

/// Errors raised while loading or saving configuration and rule files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("home directory could not be resolved")]
    NoHomeDir,
}

/// Top-level configuration for a scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WardConfig {
    /// Minimum severity included in the report.
    pub severity: Severity,
    pub output: OutputConfig,
    pub scanners: ScannersConfig,
    pub rules: RulesConfig,
    pub providers: ProvidersConfig,
}

/// Report formats and destination directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Subset of `json`, `sarif`, `html`, `markdown`, `terminal`.
    /// Empty means JSON only.
    pub formats: Vec<String>,
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            formats: Vec::new(),
            dir: PathBuf::from("."),
        }
    }
}

/// Scanner enable/disable lists, matched case-insensitively.
/// A non-empty enable list is authoritative.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannersConfig {
    pub enable: Vec<String>,
    pub disable: Vec<String>,
}

/// User-level rule adjustments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Rule ids dropped outright.
    pub disable: Vec<String>,
    /// Per-rule overrides keyed by rule id.
    #[serde(rename = "override")]
    pub overrides: BTreeMap<String, RuleOverride>,
    /// Extra directories scanned for rule files.
    pub custom_dirs: Vec<PathBuf>,
}

/// Override applied to a single rule after loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleOverride {
    pub severity: Option<Severity>,
    pub enabled: Option<bool>,
}

/// Source provider behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Shallow clone depth; 0 means full history. Negative values are
    /// coerced to 1.
    pub git_depth: i32,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self { git_depth: 1 }
    }
}

impl ProvidersConfig {
    /// Effective clone depth: `None` for a full clone.
    pub fn effective_git_depth(&self) -> Option<u32> {
        match self.git_depth {
            0 => None,
            d if d < 0 => Some(1),
            d => Some(d as u32),
        }
    }
}

impl WardConfig {
    /// Load configuration from an explicit path. A missing file yields the
    /// defaults; a malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from `~/.ward/config.yaml`, falling back to the
    /// defaults when the directory or file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        match crate::infrastructure::dirs::config_file() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Write the configuration to the given path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_yaml::to_string(self).expect("config serialization cannot fail");
        let contents = format!("# Ward configuration\n\n{body}");
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_behaviour() {
        let config = WardConfig::default();
        assert_eq!(config.severity, Severity::Info);
        assert!(config.output.formats.is_empty());
        assert_eq!(config.output.dir, PathBuf::from("."));
        assert_eq!(config.providers.git_depth, 1);
    }

    #[test]
    fn git_depth_coercion() {
        let full = ProvidersConfig { git_depth: 0 };
        assert_eq!(full.effective_git_depth(), None);

        let negative = ProvidersConfig { git_depth: -4 };
        assert_eq!(negative.effective_git_depth(), Some(1));

        let shallow = ProvidersConfig { git_depth: 3 };
        assert_eq!(shallow.effective_git_depth(), Some(3));
    }

    #[test]
    fn yaml_round_trip() {
        let yaml = r#"
severity: high
output:
  formats: [json, sarif]
  dir: reports
scanners:
  disable: [dependency-scanner]
rules:
  disable: [AUTH-001]
  override:
    XSS-001:
      severity: critical
providers:
  git_depth: 0
"#;
        let config: WardConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.severity, Severity::High);
        assert_eq!(config.output.formats, vec!["json", "sarif"]);
        assert_eq!(config.scanners.disable, vec!["dependency-scanner"]);
        assert_eq!(
            config.rules.overrides.get("XSS-001").unwrap().severity,
            Some(Severity::Critical)
        );
        assert_eq!(config.providers.effective_git_depth(), None);
    }
}
