//! Context resolver capability trait

use std::path::Path;

use async_trait::async_trait;

use super::context::ProjectContext;

/// Errors a resolver can fail with. Resolver failures are logged and leave
/// the corresponding context fields unset; they never abort the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest parse error: {0}")]
    Parse(String),
}

/// A resolver populates a slice of the [`ProjectContext`] from files under
/// the project root.
#[async_trait]
pub trait ContextResolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lower priorities run first.
    fn priority(&self) -> u32;

    async fn resolve(&self, root: &Path, project: &mut ProjectContext)
        -> Result<(), ResolveError>;
}
