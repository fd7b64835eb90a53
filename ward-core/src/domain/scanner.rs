//! Scanner capability trait

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::context::ProjectContext;
use super::finding::Finding;

/// Callback a scanner uses to stream findings as they are discovered.
///
/// The orchestrator wires this to a `FindingDiscovered` publication; the same
/// findings are also expected in the returned vector.
pub type FindingEmitter<'a> = &'a (dyn Fn(Finding) + Send + Sync);

/// Errors a scanner can fail with. A failing scanner never aborts the
/// pipeline; the orchestrator records the error and moves on.
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("advisory service error: {0}")]
    Advisory(String),

    #[error("scan cancelled")]
    Cancelled,
}

/// A security scanner: consumes the resolved [`ProjectContext`], produces
/// findings.
///
/// Scanners must not mutate the project or the context. Blocking work should
/// honor `cancel` at its next natural suspension point.
#[async_trait]
pub trait Scanner: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    async fn scan(
        &self,
        cancel: &CancellationToken,
        project: &ProjectContext,
        emit: FindingEmitter<'_>,
    ) -> Result<Vec<Finding>, ScannerError>;
}
