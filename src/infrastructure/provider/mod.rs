//! Source providers
//!
//! A provider makes the project available on local disk before anything else
//! runs: the local provider validates an existing directory, the git
//! provider clones into a temporary checkout. Provider failure is the only
//! fatal error in the pipeline.

pub mod git;
pub mod local;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

pub use git::GitProvider;
pub use local::LocalProvider;

/// Errors raised while acquiring the project source.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("path does not exist: {0}")]
    NotFound(PathBuf),

    #[error("path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("git clone failed: {0}")]
    Clone(String),

    #[error("acquisition cancelled")]
    Cancelled,
}

/// Result of acquiring a project source.
#[derive(Debug, Clone)]
pub struct SourceResult {
    /// Absolute root of the project on local disk.
    pub root_path: PathBuf,
    /// Whether the source is recognizably a Laravel project.
    pub is_laravel: bool,
    /// Whether the source carries git metadata.
    pub has_git: bool,
}

/// Abstracts where the project code comes from.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    async fn acquire(
        &mut self,
        cancel: &CancellationToken,
        target: &str,
    ) -> Result<SourceResult, ProviderError>;

    /// Release anything the provider created. Safe to call more than once.
    fn cleanup(&mut self);
}

/// Whether the target string names a remote git source rather than a local
/// path.
pub fn is_git_url(target: &str) -> bool {
    target.starts_with("http://")
        || target.starts_with("https://")
        || target.starts_with("git@")
        || target.starts_with("ssh://")
        || target.ends_with(".git")
}

#[derive(Deserialize)]
struct ComposerRequire {
    #[serde(default)]
    require: std::collections::BTreeMap<String, serde_json::Value>,
}

/// Laravel detection: the `artisan` entry script is the strong signal, with
/// `laravel/framework` in the manifest as fallback.
pub(crate) fn detect_laravel(root: &Path) -> bool {
    if root.join("artisan").is_file() {
        return true;
    }
    let Ok(raw) = std::fs::read_to_string(root.join("composer.json")) else {
        return false;
    };
    let Ok(manifest) = serde_json::from_str::<ComposerRequire>(&raw) else {
        return false;
    };
    manifest.require.contains_key("laravel/framework")
}
