//! Package resolver: exact versions from the lock file

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use ward_core::domain::{ContextResolver, ProjectContext, ResolveError};

#[derive(Debug, Deserialize)]
struct ComposerLock {
    #[serde(default)]
    packages: Vec<LockedPackage>,
    #[serde(default, rename = "packages-dev")]
    packages_dev: Vec<LockedPackage>,
}

#[derive(Debug, Deserialize)]
struct LockedPackage {
    name: String,
    version: String,
}

/// Populates `installed_packages` from `composer.lock`, including dev
/// packages. A missing lock file is not an error.
#[derive(Debug, Default)]
pub struct PackageResolver;

impl PackageResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContextResolver for PackageResolver {
    fn name(&self) -> &'static str {
        "packages"
    }

    fn priority(&self) -> u32 {
        20
    }

    async fn resolve(
        &self,
        root: &Path,
        project: &mut ProjectContext,
    ) -> Result<(), ResolveError> {
        let Ok(raw) = tokio::fs::read_to_string(root.join("composer.lock")).await else {
            return Ok(());
        };
        let lock: ComposerLock = match serde_json::from_str(&raw) {
            Ok(lock) => lock,
            Err(error) => return Err(ResolveError::Parse(error.to_string())),
        };

        for package in lock.packages.into_iter().chain(lock.packages_dev) {
            project
                .installed_packages
                .insert(package.name, package.version);
        }
        Ok(())
    }
}
