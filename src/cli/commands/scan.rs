//! `ward scan` - run the full pipeline against a target

use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Args;
use tokio_util::sync::CancellationToken;

use ward_core::domain::Severity;
use ward_core::eventbus::EventBus;
use ward_core::infrastructure::Baseline;

use crate::application::orchestrator::Orchestrator;
use crate::cli::exit_codes;
use crate::presentation::headless;

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Local path or git URL of the project to scan
    #[arg(default_value = ".")]
    pub target: String,

    /// Comma-separated report formats (json, sarif, html, markdown, terminal)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Baseline file whose fingerprints are suppressed from the report
    #[arg(long)]
    pub baseline: Option<std::path::PathBuf>,

    /// Write a new baseline from this scan's findings to the given path
    #[arg(long)]
    pub update_baseline: Option<std::path::PathBuf>,

    /// Exit non-zero when findings at or above this severity exist
    #[arg(long)]
    pub fail_on: Option<String>,

    /// Minimum severity to include in the report
    #[arg(long)]
    pub severity: Option<String>,
}

pub async fn run(config_path: Option<&Path>, args: ScanArgs) -> anyhow::Result<i32> {
    let mut config = crate::cli::load_config(config_path).context("loading config")?;

    if let Some(formats) = &args.output {
        config.output.formats = formats
            .split(',')
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
    }
    if let Some(severity) = &args.severity {
        config.severity = Severity::parse(severity);
    }

    // A referenced-but-missing baseline must fail before the pipeline runs.
    let baseline = match &args.baseline {
        Some(path) => Some(Baseline::load(path).context("loading baseline")?),
        None => None,
    };

    let bus = Arc::new(EventBus::new());
    headless::attach(&bus);

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let mut orchestrator = Orchestrator::new(bus.clone(), config, args.target.clone());
    if let Some(baseline) = baseline {
        orchestrator = orchestrator.with_baseline(baseline);
    }
    if let Some(path) = &args.update_baseline {
        orchestrator = orchestrator.with_baseline_path(path.clone());
    }

    let outcome = orchestrator.run(&cancel).await;
    bus.close();

    let report = match outcome {
        Ok(report) => report,
        Err(_) => return Ok(exit_codes::FAILURE),
    };

    if let Some(threshold) = &args.fail_on {
        let threshold = Severity::parse(threshold);
        let gated = report
            .findings
            .iter()
            .any(|finding| finding.severity >= threshold);
        if gated {
            return Ok(exit_codes::FAILURE);
        }
    }

    Ok(exit_codes::SUCCESS)
}
