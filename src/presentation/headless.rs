//! Headless presentation: classified lifecycle lines on stdout
//!
//! The pipeline never prints; it only publishes events. This adapter
//! subscribes to the bus and renders a stream suitable for CI logs:
//!
//! ```text
//! [info] scan started (3 scanners)
//! [info] stage Provider done
//! [warn] Path does not appear to be a Laravel project
//! [finding] High ENV-002 .env:2 APP_DEBUG is enabled
//! ```

use std::sync::Arc;

use ward_core::eventbus::{EventBus, EventPayload, LogLevel};

/// Subscribe the headless renderer to every pipeline event.
pub fn attach(bus: &Arc<EventBus>) {
    bus.subscribe_all(|event| match &event.payload {
        EventPayload::ScanStarted { scanner_count, .. } => {
            println!("[info] scan started ({scanner_count} scanners)");
        }
        EventPayload::ScanCompleted { report } => {
            println!(
                "[info] scan completed: {} finding(s) in {:?}",
                report.findings.len(),
                report.duration()
            );
        }
        EventPayload::ScanFailed { error } => {
            println!("[error] scan failed: {error}");
        }
        EventPayload::StageStarted { .. } => {}
        EventPayload::StageCompleted { stage } => {
            println!("[info] stage {stage} done");
        }
        EventPayload::ScannerStarted { name } => {
            println!("[info] {name} running");
        }
        EventPayload::ScannerCompleted {
            name,
            finding_count,
        } => {
            println!("[info] {name} finished: {finding_count} finding(s)");
        }
        EventPayload::ScannerFailed { name, error } => {
            println!("[error] {name} failed: {error}");
        }
        EventPayload::ScannerSkipped { name, reason } => {
            println!("[info] {name} skipped: {reason}");
        }
        EventPayload::FindingDiscovered { finding } => {
            let location = if finding.line > 0 {
                format!("{}:{}", finding.file, finding.line)
            } else {
                finding.file.clone()
            };
            println!(
                "[finding] {} {} {} {}",
                finding.severity, finding.id, location, finding.title
            );
        }
        EventPayload::ContextResolved {
            project_name,
            laravel_version,
            package_count,
            ..
        } => {
            println!(
                "[info] resolved {project_name} (laravel {laravel_version}, {package_count} packages)"
            );
        }
        EventPayload::ProgressUpdate { scanner, message, .. } => {
            println!("[info] {scanner}: {message}");
        }
        EventPayload::LogMessage { level, message } => {
            println!("[{level}] {message}");
        }
        EventPayload::ScannerRegistered { .. } => {}
    });
}
