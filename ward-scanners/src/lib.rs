//! Ward Scanners - the security checks behind the scan pipeline
//!
//! Four scanners, each implementing [`ward_core::domain::Scanner`]:
//!
//! - [`env::EnvScanner`] — structured checks over `.env` / `.env.example`
//! - [`configscan::ConfigScanner`] — misconfiguration checks over the
//!   framework's `config/*.php` whitelist
//! - [`dependency::DependencyScanner`] — resolved packages reconciled with
//!   the OSV.dev advisory database
//! - [`rules::RulesScanner`] — user-supplied declarative YAML rules
//!
//! plus the [`resolvers`] that populate the shared project context before any
//! scanner runs.

pub mod configscan;
pub mod dependency;
pub mod env;
pub mod envfile;
pub mod resolvers;
pub mod rules;

pub use configscan::ConfigScanner;
pub use dependency::DependencyScanner;
pub use env::EnvScanner;
pub use rules::RulesScanner;
