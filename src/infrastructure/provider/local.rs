//! Local filesystem provider

use std::path::PathBuf;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{detect_laravel, ProviderError, SourceProvider, SourceResult};

/// Provider for projects already on local disk. Validates the path and
/// detects framework presence; creates nothing, so cleanup is a no-op.
#[derive(Debug, Default)]
pub struct LocalProvider;

impl LocalProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SourceProvider for LocalProvider {
    async fn acquire(
        &mut self,
        _cancel: &CancellationToken,
        target: &str,
    ) -> Result<SourceResult, ProviderError> {
        let path = PathBuf::from(target);
        let absolute = match path.canonicalize() {
            Ok(path) => path,
            Err(_) => return Err(ProviderError::NotFound(path)),
        };
        if !absolute.is_dir() {
            return Err(ProviderError::NotADirectory(absolute));
        }

        Ok(SourceResult {
            is_laravel: detect_laravel(&absolute),
            has_git: absolute.join(".git").exists(),
            root_path: absolute,
        })
    }

    fn cleanup(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_path_is_an_error() {
        let mut provider = LocalProvider::new();
        let cancel = CancellationToken::new();
        let result = provider.acquire(&cancel, "/definitely/not/here").await;
        assert!(matches!(result, Err(ProviderError::NotFound(_))));
    }

    #[tokio::test]
    async fn file_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("composer.json");
        std::fs::write(&file, "{}").unwrap();

        let mut provider = LocalProvider::new();
        let cancel = CancellationToken::new();
        let result = provider
            .acquire(&cancel, &file.to_string_lossy())
            .await;
        assert!(matches!(result, Err(ProviderError::NotADirectory(_))));
    }

    #[tokio::test]
    async fn directory_resolves_to_absolute_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("artisan"), "#!/usr/bin/env php\n").unwrap();

        let mut provider = LocalProvider::new();
        let cancel = CancellationToken::new();
        let result = provider
            .acquire(&cancel, &dir.path().to_string_lossy())
            .await
            .unwrap();

        assert!(result.root_path.is_absolute());
        assert!(result.is_laravel);
        assert!(!result.has_git);
    }
}
