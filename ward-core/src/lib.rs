//! Ward Core - Foundation crate for the Ward security scanner
//!
//! This crate provides the pieces shared by every stage of the scan pipeline:
//!
//! # Modules
//!
//! - [`domain`] — Severity, findings, project context, reports, and the
//!   scanner/resolver capability traits
//! - [`eventbus`] — Typed publish/subscribe bus the pipeline narrates itself on
//! - [`config`] — The `WardConfig` value object and the YAML rule store
//! - [`infrastructure`] — Baseline and scan-history persistence
//!
//! # Architecture
//!
//! ```text
//! ward-core/
//! ├── domain/           # Pure value objects and capability traits
//! ├── eventbus/         # Lifecycle events + synchronous bus
//! ├── config/           # Configuration value object, rule definitions
//! └── infrastructure/   # Baseline file, history store, ~/.ward dirs
//! ```
//!
//! Everything here is a leaf: no networking, no subprocess execution, and no
//! knowledge of individual scanners.

pub mod config;
pub mod domain;
pub mod eventbus;
pub mod infrastructure;

pub use config::WardConfig;
pub use domain::{Finding, ProjectContext, ScanReport, Severity};
pub use eventbus::EventBus;
