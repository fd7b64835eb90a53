//! Pipeline orchestrator
//!
//! Sequences the five stages (Provider → Resolvers → Scanners →
//! Post-Process → Report) and narrates each of them on the event bus. Only
//! a provider failure (or cancellation) aborts the pipeline; resolver,
//! scanner, reporter, baseline-save, and history failures are logged and the
//! scan completes.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use ward_core::config::rules::load_all_rules;
use ward_core::domain::{Finding, PipelineStage, ProjectContext, ScanReport, Scanner, ScannerError};
use ward_core::eventbus::{EventBus, EventPayload, LogLevel};
use ward_core::infrastructure::{Baseline, HistoryStore};
use ward_core::WardConfig;
use ward_scanners::resolvers::default_resolvers;
use ward_scanners::{ConfigScanner, DependencyScanner, EnvScanner, RulesScanner};

use crate::application::reporting::build_reporters;
use crate::infrastructure::provider::{
    is_git_url, GitProvider, LocalProvider, ProviderError, SourceProvider,
};

/// Errors that abort the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("provider: {0}")]
    Provider(#[from] ProviderError),

    #[error("scan cancelled")]
    Cancelled,
}

/// Coordinates the full scan pipeline.
pub struct Orchestrator {
    bus: Arc<EventBus>,
    config: WardConfig,
    target: String,
    baseline: Option<Baseline>,
    baseline_path: Option<PathBuf>,
    history: Option<HistoryStore>,
}

impl Orchestrator {
    pub fn new(bus: Arc<EventBus>, config: WardConfig, target: impl Into<String>) -> Self {
        Self {
            bus,
            config,
            target: target.into(),
            baseline: None,
            baseline_path: None,
            history: None,
        }
    }

    /// Attach an existing baseline for suppression.
    pub fn with_baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = Some(baseline);
        self
    }

    /// Save a fresh baseline from the post-filter findings to this path.
    pub fn with_baseline_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.baseline_path = Some(path.into());
        self
    }

    /// Use a specific history store instead of `~/.ward/store`.
    pub fn with_history_store(mut self, store: HistoryStore) -> Self {
        self.history = Some(store);
        self
    }

    /// Execute the pipeline. Returns the final report, which has also been
    /// published as `ScanCompleted`.
    pub async fn run(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Arc<ScanReport>, PipelineError> {
        let started_at = Utc::now();
        let scanners = self.build_roster();

        self.bus.publish(EventPayload::ScanStarted {
            project_path: self.target.clone(),
            scanner_count: scanners.len(),
        });

        // --- Stage 1: Provider ---
        self.stage_start(PipelineStage::Provider);

        let mut provider: Box<dyn SourceProvider> = if is_git_url(&self.target) {
            self.log(LogLevel::Info, format!("Cloning {} ...", self.target));
            Box::new(GitProvider::new(self.config.providers.effective_git_depth()))
        } else {
            Box::new(LocalProvider::new())
        };

        let source = match provider.acquire(cancel, &self.target).await {
            Ok(source) => source,
            Err(error) => {
                let error = PipelineError::from(error);
                self.fail(&error);
                return Err(error);
            }
        };

        if !source.is_laravel {
            self.log(
                LogLevel::Warn,
                "Path does not appear to be a Laravel project",
            );
        }
        self.stage_complete(PipelineStage::Provider);
        self.check_cancelled(cancel, &mut provider)?;

        // --- Stage 2: Resolvers ---
        self.stage_start(PipelineStage::Resolvers);

        let mut project = ProjectContext::default();
        for resolver in default_resolvers() {
            if let Err(error) = resolver.resolve(&source.root_path, &mut project).await {
                self.log(
                    LogLevel::Error,
                    format!("Resolver {} failed: {error}", resolver.name()),
                );
            }
        }

        self.bus.publish(EventPayload::ContextResolved {
            project_name: project.project_name.clone(),
            laravel_version: project.laravel_version.clone(),
            php_version: project.php_version.clone(),
            framework_type: project.framework_type.clone(),
            package_count: project.installed_packages.len(),
        });
        self.stage_complete(PipelineStage::Resolvers);
        self.check_cancelled(cancel, &mut provider)?;

        // --- Stage 3: Scanners ---
        self.stage_start(PipelineStage::Scanners);

        for scanner in &scanners {
            self.bus.publish(EventPayload::ScannerRegistered {
                name: scanner.name().to_string(),
                description: scanner.description().to_string(),
            });
        }

        let mut findings: Vec<Finding> = Vec::new();
        let mut scanners_run = Vec::new();
        let mut scanner_errors = BTreeMap::new();

        for scanner in &scanners {
            if self.is_disabled(scanner.name()) {
                self.bus.publish(EventPayload::ScannerSkipped {
                    name: scanner.name().to_string(),
                    reason: "disabled in config".into(),
                });
                continue;
            }

            self.bus.publish(EventPayload::ScannerStarted {
                name: scanner.name().to_string(),
            });

            let bus = self.bus.clone();
            let emit = move |finding: Finding| {
                bus.publish(EventPayload::FindingDiscovered { finding });
            };

            match scanner.scan(cancel, &project, &emit).await {
                Ok(scanner_findings) => {
                    self.bus.publish(EventPayload::ScannerCompleted {
                        name: scanner.name().to_string(),
                        finding_count: scanner_findings.len(),
                    });
                    findings.extend(scanner_findings);
                    scanners_run.push(scanner.name().to_string());
                }
                Err(error) => {
                    self.bus.publish(EventPayload::ScannerFailed {
                        name: scanner.name().to_string(),
                        error: error.to_string(),
                    });
                    if matches!(error, ScannerError::Cancelled) {
                        provider.cleanup();
                        let error = PipelineError::Cancelled;
                        self.fail(&error);
                        return Err(error);
                    }
                    scanner_errors.insert(scanner.name().to_string(), error.to_string());
                }
            }
        }
        self.stage_complete(PipelineStage::Scanners);
        self.check_cancelled(cancel, &mut provider)?;

        // --- Stage 4: Post-Process ---
        self.stage_start(PipelineStage::PostProcess);

        let mut findings = deduplicate(findings);
        findings.retain(|f| f.severity >= self.config.severity);

        if let Some(baseline) = &self.baseline {
            let (kept, suppressed) = baseline.filter(findings);
            findings = kept;
            if suppressed > 0 {
                self.log(
                    LogLevel::Info,
                    format!("{suppressed} findings suppressed by baseline"),
                );
            }
        }
        self.stage_complete(PipelineStage::PostProcess);

        // --- Stage 5: Report ---
        self.stage_start(PipelineStage::Report);

        let report = Arc::new(ScanReport {
            project,
            findings,
            started_at,
            completed_at: Utc::now(),
            scanners_run,
            scanner_errors,
        });

        for reporter in build_reporters(&self.config.output.formats, &self.config.output.dir) {
            match reporter.generate(&report) {
                Ok(path) => self.log(
                    LogLevel::Info,
                    format!("Report written to {}", path.display()),
                ),
                Err(error) => self.log(
                    LogLevel::Error,
                    format!("{} reporter failed: {error}", reporter.name()),
                ),
            }
        }

        if let Some(path) = &self.baseline_path {
            match Baseline::from_findings(&report.findings).save(path) {
                Ok(()) => self.log(
                    LogLevel::Info,
                    format!(
                        "Baseline saved to {} ({} findings)",
                        path.display(),
                        report.findings.len()
                    ),
                ),
                Err(error) => {
                    self.log(LogLevel::Warn, format!("Failed to save baseline: {error}"))
                }
            }
        }

        self.record_history(&report);
        self.stage_complete(PipelineStage::Report);

        provider.cleanup();

        self.bus.publish(EventPayload::ScanCompleted {
            report: report.clone(),
        });
        Ok(report)
    }

    /// Fixed scanners plus the rules scanner when the store yields at least
    /// one enabled rule, filtered by the config enable/disable lists.
    fn build_roster(&self) -> Vec<Box<dyn Scanner>> {
        let mut scanners: Vec<Box<dyn Scanner>> = vec![
            Box::new(EnvScanner::new()),
            Box::new(ConfigScanner::new()),
            Box::new(DependencyScanner::new()),
        ];

        match load_all_rules(&self.config.rules) {
            Ok(rules) => {
                let enabled = rules.iter().filter(|r| r.enabled).count();
                if enabled > 0 {
                    self.log(LogLevel::Info, format!("Loaded {enabled} custom rule(s)"));
                    scanners.push(Box::new(RulesScanner::new(rules)));
                }
            }
            Err(error) => {
                self.log(
                    LogLevel::Warn,
                    format!("Failed to load custom rules: {error}"),
                );
            }
        }

        self.filter_roster(scanners)
    }

    fn filter_roster(&self, scanners: Vec<Box<dyn Scanner>>) -> Vec<Box<dyn Scanner>> {
        let enable: HashSet<String> = self
            .config
            .scanners
            .enable
            .iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();
        let disable: HashSet<String> = self
            .config
            .scanners
            .disable
            .iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();

        if enable.is_empty() && disable.is_empty() {
            return scanners;
        }

        scanners
            .into_iter()
            .filter(|scanner| {
                let name = scanner.name().to_ascii_lowercase();
                if !enable.is_empty() && !enable.contains(&name) {
                    self.log(
                        LogLevel::Info,
                        format!("Skipping {} (not in enable list)", scanner.name()),
                    );
                    return false;
                }
                if disable.contains(&name) {
                    self.log(LogLevel::Info, format!("Skipping {} (disabled)", scanner.name()));
                    return false;
                }
                true
            })
            .collect()
    }

    fn is_disabled(&self, name: &str) -> bool {
        self.config
            .scanners
            .disable
            .iter()
            .any(|disabled| disabled.eq_ignore_ascii_case(name))
    }

    fn record_history(&self, report: &ScanReport) {
        let store = match &self.history {
            Some(store) => store.clone(),
            None => match HistoryStore::default_location() {
                Ok(store) => store,
                Err(error) => {
                    warn!(%error, "History store unavailable");
                    return;
                }
            },
        };

        match store.compare_last(report) {
            Ok(Some(diff))
                if !diff.new_findings.is_empty() || !diff.resolved_findings.is_empty() =>
            {
                self.log(
                    LogLevel::Info,
                    format!(
                        "vs last scan: {} new, {} resolved ({}→{})",
                        diff.new_findings.len(),
                        diff.resolved_findings.len(),
                        diff.total_before,
                        diff.total_after
                    ),
                );
            }
            Ok(_) => {}
            Err(error) => self.log(LogLevel::Warn, format!("History diff failed: {error}")),
        }

        if let Err(error) = store.save(report) {
            self.log(
                LogLevel::Warn,
                format!("Failed to save scan history: {error}"),
            );
        }
    }

    fn check_cancelled(
        &self,
        cancel: &CancellationToken,
        provider: &mut Box<dyn SourceProvider>,
    ) -> Result<(), PipelineError> {
        if cancel.is_cancelled() {
            provider.cleanup();
            let error = PipelineError::Cancelled;
            self.fail(&error);
            return Err(error);
        }
        Ok(())
    }

    fn stage_start(&self, stage: PipelineStage) {
        self.bus.publish(EventPayload::StageStarted { stage });
    }

    fn stage_complete(&self, stage: PipelineStage) {
        self.bus.publish(EventPayload::StageCompleted { stage });
    }

    fn fail(&self, error: &PipelineError) {
        self.bus.publish(EventPayload::ScanFailed {
            error: error.to_string(),
        });
    }

    fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.bus.publish(EventPayload::LogMessage {
            level,
            message: message.into(),
        });
    }
}

/// Drop later findings sharing an `(id, file, line)` triple with an earlier
/// one, preserving first-seen order.
fn deduplicate(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = HashSet::new();
    findings
        .into_iter()
        .filter(|finding| seen.insert(finding.dedup_key()))
        .collect()
}
