//! Report generation
//!
//! Every reporter serializes the same [`ScanReport`] into one file in the
//! configured output directory. Reporter failures are logged by the
//! orchestrator and never abort the scan.

pub mod formats;

use std::path::{Path, PathBuf};

use ward_core::domain::ScanReport;

pub use formats::html::HtmlReporter;
pub use formats::json::JsonReporter;
pub use formats::markdown::MarkdownReporter;
pub use formats::sarif::SarifReporter;

/// Errors raised while generating a report file.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A report serializer.
pub trait Reporter: Send + Sync {
    fn name(&self) -> &'static str;

    /// File extension of the generated document.
    fn extension(&self) -> &'static str;

    /// Write the report; returns the path of the generated file.
    fn generate(&self, report: &ScanReport) -> Result<PathBuf, ReportError>;
}

/// Build the reporter set for the configured formats.
///
/// Unknown formats are ignored, `terminal` is handled by the presentation
/// layer rather than a file reporter, and JSON is always produced as a
/// fallback even when not requested.
pub fn build_reporters(formats: &[String], output_dir: &Path) -> Vec<Box<dyn Reporter>> {
    let mut reporters: Vec<Box<dyn Reporter>> = Vec::new();
    let mut seen = Vec::new();

    let requested: Vec<String> = if formats.is_empty() {
        vec!["json".to_string()]
    } else {
        formats.to_vec()
    };

    for format in &requested {
        let format = format.to_ascii_lowercase();
        if seen.contains(&format) {
            continue;
        }
        seen.push(format.clone());

        match format.as_str() {
            "json" => reporters.push(Box::new(JsonReporter::new(output_dir))),
            "sarif" => reporters.push(Box::new(SarifReporter::new(output_dir))),
            "html" => reporters.push(Box::new(HtmlReporter::new(output_dir))),
            "markdown" | "md" => reporters.push(Box::new(MarkdownReporter::new(output_dir))),
            _ => {}
        }
    }

    if !seen.iter().any(|f| f == "json") {
        reporters.push(Box::new(JsonReporter::new(output_dir)));
    }

    reporters
}
