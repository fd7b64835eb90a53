//! Shared fixture helpers for scanner integration tests
#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;
use ward_core::domain::{Finding, ProjectContext, Scanner, ScannerError};

/// Context rooted at a fixture directory with no resolved metadata.
pub fn context_for(root: &Path) -> ProjectContext {
    ProjectContext {
        root_path: root.to_path_buf(),
        ..Default::default()
    }
}

/// Run a scanner and return both its returned findings and everything it
/// emitted, so tests can assert the two streams agree.
pub async fn run_scanner(
    scanner: &dyn Scanner,
    project: &ProjectContext,
) -> Result<(Vec<Finding>, Vec<Finding>), ScannerError> {
    let emitted = Mutex::new(Vec::new());
    let emit = |finding: Finding| {
        emitted.lock().unwrap().push(finding);
    };
    let cancel = CancellationToken::new();
    let returned = scanner.scan(&cancel, project, &emit).await?;
    Ok((returned, emitted.into_inner().unwrap()))
}

/// Findings with a given id.
pub fn with_id<'a>(findings: &'a [Finding], id: &str) -> Vec<&'a Finding> {
    findings.iter().filter(|f| f.id == id).collect()
}
