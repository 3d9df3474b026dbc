use monorelease_deps::DepsError;
use monorelease_version::VersionError;
use thiserror::Error;

use crate::hooks::{HookError, Phase};

/// Failure of one package's pipeline. Sibling pipelines are unaffected.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("package '{package}' failed during {phase}: {source}")]
    Hook {
        package: String,
        phase: Phase,
        #[source]
        source: HookError,
    },

    #[error("package '{package}' failed during {phase}: {source}")]
    Resolve {
        package: String,
        phase: Phase,
        #[source]
        source: DepsError,
    },

    #[error("package '{package}' failed during {phase}: {source}")]
    Version {
        package: String,
        phase: Phase,
        #[source]
        source: VersionError,
    },

    #[error("pipeline task aborted: {source}")]
    Task {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl PipelineError {
    /// Name of the package whose pipeline failed, when known.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        match self {
            Self::Hook { package, .. }
            | Self::Resolve { package, .. }
            | Self::Version { package, .. } => Some(package),
            Self::Task { .. } => None,
        }
    }

    /// Phase the failure surfaced in, when known.
    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Hook { phase, .. }
            | Self::Resolve { phase, .. }
            | Self::Version { phase, .. } => Some(*phase),
            Self::Task { .. } => None,
        }
    }
}
