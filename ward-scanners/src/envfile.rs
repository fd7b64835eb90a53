//! Minimal dotenv parsing shared by the env scanner and the framework
//! resolver
//!
//! Only the `KEY=VALUE` subset Laravel projects actually use: blank lines and
//! `#` comments are skipped, surrounding single or double quotes stripped.
//! No interpolation, no multi-line values.

use std::collections::BTreeMap;

/// Parsed view of a dotenv file, retaining line numbers for findings.
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    vars: BTreeMap<String, String>,
    lines: BTreeMap<String, u32>,
}

impl EnvFile {
    pub fn parse(content: &str) -> Self {
        let mut vars = BTreeMap::new();
        let mut lines = BTreeMap::new();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim().to_string();
            if key.is_empty() {
                continue;
            }
            let value = strip_quotes(value.trim()).to_string();

            lines.entry(key.clone()).or_insert(index as u32 + 1);
            vars.insert(key, value);
        }

        Self { vars, lines }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// 1-based line of the first assignment of `key`; 0 when absent.
    pub fn line_of(&self, key: &str) -> u32 {
        self.lines.get(key).copied().unwrap_or(0)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    let value = value.strip_suffix('"').unwrap_or(value);
    let value = value.strip_prefix('\'').unwrap_or(value);
    value.strip_suffix('\'').unwrap_or(value)
}
