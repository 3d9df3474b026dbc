use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("cannot resolve next version from '{version}'")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("package '{package}' has no prerelease channel configured")]
    MissingChannel { package: String },
}
