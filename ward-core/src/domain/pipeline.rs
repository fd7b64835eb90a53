//! Pipeline stage identifiers

use std::fmt;

use serde::{Deserialize, Serialize};

/// A stage in the scan pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    Provider,
    Resolvers,
    Scanners,
    PostProcess,
    Report,
}

impl PipelineStage {
    /// All stages in execution order.
    pub fn all() -> [PipelineStage; 5] {
        [
            Self::Provider,
            Self::Resolvers,
            Self::Scanners,
            Self::PostProcess,
            Self::Report,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provider => "Provider",
            Self::Resolvers => "Resolvers",
            Self::Scanners => "Scanners",
            Self::PostProcess => "Post-Process",
            Self::Report => "Report",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
