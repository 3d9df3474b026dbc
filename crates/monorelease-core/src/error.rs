use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("duplicate package name '{name}' in package set")]
    DuplicatePackage { name: String },
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to parse manifest JSON")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize manifest for '{package}'")]
    Render {
        package: String,
        #[source]
        source: serde_json::Error,
    },
}
