//! Context resolvers
//!
//! Resolvers run serially in priority order before any scanner, each filling
//! in a slice of the shared [`ProjectContext`]. Failures are isolated: a
//! resolver that cannot read its manifest leaves its fields unset.

pub mod framework;
pub mod packages;

pub use framework::FrameworkResolver;
pub use packages::PackageResolver;

use ward_core::domain::ContextResolver;

/// The default resolver set in execution order.
pub fn default_resolvers() -> Vec<Box<dyn ContextResolver>> {
    let mut resolvers: Vec<Box<dyn ContextResolver>> = vec![
        Box::new(FrameworkResolver::new()),
        Box::new(PackageResolver::new()),
    ];
    resolvers.sort_by_key(|r| r.priority());
    resolvers
}
