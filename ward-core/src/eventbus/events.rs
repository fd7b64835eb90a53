//! Lifecycle events published by the scan pipeline

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{Finding, PipelineStage, ScanReport};

/// Discriminant used for per-kind subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ScanStarted,
    ScanCompleted,
    ScanFailed,
    StageStarted,
    StageCompleted,
    ScannerRegistered,
    ScannerStarted,
    ScannerCompleted,
    ScannerFailed,
    ScannerSkipped,
    FindingDiscovered,
    ContextResolved,
    ProgressUpdate,
    LogMessage,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScanStarted => "scan.started",
            Self::ScanCompleted => "scan.completed",
            Self::ScanFailed => "scan.failed",
            Self::StageStarted => "stage.started",
            Self::StageCompleted => "stage.completed",
            Self::ScannerRegistered => "scanner.registered",
            Self::ScannerStarted => "scanner.started",
            Self::ScannerCompleted => "scanner.completed",
            Self::ScannerFailed => "scanner.failed",
            Self::ScannerSkipped => "scanner.skipped",
            Self::FindingDiscovered => "finding.discovered",
            Self::ContextResolved => "context.resolved",
            Self::ProgressUpdate => "progress.update",
            Self::LogMessage => "log.message",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log classification for `LogMessage` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed payload of a pipeline event.
#[derive(Debug, Clone)]
pub enum EventPayload {
    ScanStarted {
        project_path: String,
        scanner_count: usize,
    },
    ScanCompleted {
        report: Arc<ScanReport>,
    },
    ScanFailed {
        error: String,
    },
    StageStarted {
        stage: PipelineStage,
    },
    StageCompleted {
        stage: PipelineStage,
    },
    ScannerRegistered {
        name: String,
        description: String,
    },
    ScannerStarted {
        name: String,
    },
    ScannerCompleted {
        name: String,
        finding_count: usize,
    },
    ScannerFailed {
        name: String,
        error: String,
    },
    ScannerSkipped {
        name: String,
        reason: String,
    },
    FindingDiscovered {
        finding: Finding,
    },
    ContextResolved {
        project_name: String,
        laravel_version: String,
        php_version: String,
        framework_type: String,
        package_count: usize,
    },
    ProgressUpdate {
        scanner: String,
        message: String,
        percent: f64,
    },
    LogMessage {
        level: LogLevel,
        message: String,
    },
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ScanStarted { .. } => EventKind::ScanStarted,
            Self::ScanCompleted { .. } => EventKind::ScanCompleted,
            Self::ScanFailed { .. } => EventKind::ScanFailed,
            Self::StageStarted { .. } => EventKind::StageStarted,
            Self::StageCompleted { .. } => EventKind::StageCompleted,
            Self::ScannerRegistered { .. } => EventKind::ScannerRegistered,
            Self::ScannerStarted { .. } => EventKind::ScannerStarted,
            Self::ScannerCompleted { .. } => EventKind::ScannerCompleted,
            Self::ScannerFailed { .. } => EventKind::ScannerFailed,
            Self::ScannerSkipped { .. } => EventKind::ScannerSkipped,
            Self::FindingDiscovered { .. } => EventKind::FindingDiscovered,
            Self::ContextResolved { .. } => EventKind::ContextResolved,
            Self::ProgressUpdate { .. } => EventKind::ProgressUpdate,
            Self::LogMessage { .. } => EventKind::LogMessage,
        }
    }
}

/// Timestamped event envelope delivered to subscribers.
#[derive(Debug, Clone)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}
