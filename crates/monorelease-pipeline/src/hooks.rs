use async_trait::async_trait;
use monorelease_core::{Package, ReleaseType};
use monorelease_deps::ManifestWrite;

/// Opaque error surfaced by a hook; the runner wraps it with package and
/// phase context.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// The five ordered phases of a package's release pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Verify,
    Analyze,
    GenerateNotes,
    Prepare,
    Publish,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Verify => "verify",
            Self::Analyze => "analyze",
            Self::GenerateNotes => "generate-notes",
            Self::Prepare => "prepare",
            Self::Publish => "publish",
        })
    }
}

/// Lifecycle surface the runner invokes for every package.
///
/// Each method receives a snapshot of the package taken right before the
/// phase, so implementations never observe a half-mutated graph. Hooks own
/// everything environment-specific: git, registries, changelog writing.
#[async_trait]
pub trait ReleaseHooks: Send + Sync + 'static {
    /// Preconditions for releasing this package (auth, tree state).
    async fn verify(&self, package: &Package) -> Result<(), HookError>;

    /// Analyzes the package's own commits and returns the release type
    /// they justify, if any. Cascaded dependency changes are handled by
    /// the runner afterwards.
    async fn analyze_commits(&self, package: &Package) -> Result<Option<ReleaseType>, HookError>;

    /// Generates the package's own release notes. The runner appends the
    /// dependency-upgrade section itself.
    async fn generate_notes(&self, package: &Package) -> Result<Option<String>, HookError>;

    /// Applies prepare-time work, including local tag creation. Runs
    /// inside the serialized tag window, so at most one package is in
    /// prepare at a time. `write` is the pending manifest rewrite when
    /// dependency ranges changed; the hook is responsible for putting it
    /// on disk.
    async fn prepare(
        &self,
        package: &Package,
        write: Option<&ManifestWrite>,
    ) -> Result<(), HookError>;

    /// Publishes the release (push tags, create remote releases).
    async fn publish(&self, package: &Package) -> Result<(), HookError>;
}
