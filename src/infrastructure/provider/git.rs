//! Git provider: shallow clone into a temporary checkout

use async_trait::async_trait;
use git2::{build::RepoBuilder, FetchOptions};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{detect_laravel, ProviderError, SourceProvider, SourceResult};

/// Provider that clones a remote repository into a temp directory.
///
/// The clone runs in-process through libgit2 on a blocking task, so nothing
/// is written to the terminal even when a presentation layer owns it. The
/// checkout lives as long as the provider holds its [`TempDir`]; dropping it
/// (on clone failure, cleanup, or provider drop) removes the directory.
#[derive(Debug)]
pub struct GitProvider {
    /// `None` means a full-history clone.
    depth: Option<u32>,
    checkout: Option<TempDir>,
}

impl GitProvider {
    pub fn new(depth: Option<u32>) -> Self {
        Self {
            depth,
            checkout: None,
        }
    }
}

#[async_trait]
impl SourceProvider for GitProvider {
    async fn acquire(
        &mut self,
        cancel: &CancellationToken,
        target: &str,
    ) -> Result<SourceResult, ProviderError> {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let checkout = tempfile::Builder::new().prefix("ward-scan-").tempdir()?;
        let destination = checkout.path().to_path_buf();
        let url = target.to_string();
        let depth = self.depth;

        info!(repository = %url, ?depth, "Cloning repository");

        let clone_result = tokio::task::spawn_blocking(move || {
            let mut fetch_options = FetchOptions::new();
            fetch_options.download_tags(git2::AutotagOption::None);
            if let Some(depth) = depth {
                fetch_options.depth(depth as i32);
            }

            let mut builder = RepoBuilder::new();
            builder.fetch_options(fetch_options);
            builder.clone(&url, &destination).map(|_| ())
        })
        .await
        .map_err(|join_error| ProviderError::Clone(join_error.to_string()))?;

        if let Err(error) = clone_result {
            // TempDir drops here, removing the partial checkout.
            return Err(ProviderError::Clone(error.message().to_string()));
        }
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let root_path = checkout.path().to_path_buf();
        debug!(path = %root_path.display(), "Clone completed");
        self.checkout = Some(checkout);

        Ok(SourceResult {
            is_laravel: detect_laravel(&root_path),
            has_git: true,
            root_path,
        })
    }

    fn cleanup(&mut self) {
        if let Some(checkout) = self.checkout.take() {
            let path = checkout.path().to_path_buf();
            drop(checkout);
            debug!(path = %path.display(), "Removed git checkout");
        }
    }
}

impl Drop for GitProvider {
    fn drop(&mut self) {
        self.cleanup();
    }
}
