use monorelease_core::ManifestError;
use monorelease_version::VersionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DepsError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("cannot release '{package}': dependency '{dependency}' has not been released")]
    UnresolvedDependency { package: String, dependency: String },
}
