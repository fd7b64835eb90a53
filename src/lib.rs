//! Ward - Event-driven security scanner for Laravel projects
//!
//! The root crate glues the pipeline together: the orchestrator sequencing
//! Provider → Resolvers → Scanners → Post-Process → Report, the source
//! providers, the report serializers, and the command-line front end.
//!
//! Domain models and the event bus live in [`ward_core`]; the individual
//! security checks live in [`ward_scanners`].

pub mod application;
pub mod cli;
pub mod infrastructure;
pub mod presentation;

pub use application::orchestrator::Orchestrator;

/// Version reported in generated documents.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
