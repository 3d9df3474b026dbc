use std::fmt;

use clap::ValueEnum;
use semver::Version;
use serde::{Deserialize, Serialize};

/// Severity classification of a version bump.
///
/// "No release" is not a variant; the propagation algorithm uses
/// `Option<ReleaseType>` with `None` as the bottom element, which sorts
/// below every real type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Patch,
    Minor,
    Major,
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        };
        write!(f, "{s}")
    }
}

/// Policy for rewriting a dependant's declared version range when its
/// dependency is bumped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BumpStrategy {
    /// Replace the declared range with the new version outright.
    #[default]
    Override,
    /// Keep the declared range when the new version already satisfies it.
    Satisfy,
    /// Keep satisfied ranges, otherwise substitute version segments into
    /// the range while preserving its operators and wildcards.
    Inherit,
}

/// Policy for the release type a dependant receives when only its
/// dependencies changed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStrategy {
    /// Always release as a patch when a dependency forces a release.
    #[default]
    Patch,
    Minor,
    Major,
    /// Apply the highest release type among the updated dependencies.
    Inherit,
}

impl ReleaseStrategy {
    /// Maps a cascaded dependency release type to the type the dependant
    /// should receive under this strategy.
    #[must_use]
    pub fn resolve(self, cascaded: ReleaseType) -> ReleaseType {
        match self {
            Self::Patch => ReleaseType::Patch,
            Self::Minor => ReleaseType::Minor,
            Self::Major => ReleaseType::Major,
            Self::Inherit => cascaded,
        }
    }
}

/// Dependency declaration scope within a package manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyScope {
    Runtime,
    Dev,
    Peer,
    Optional,
}

impl DependencyScope {
    /// All scopes, in manifest order.
    pub const ALL: [Self; 4] = [Self::Runtime, Self::Dev, Self::Peer, Self::Optional];

    /// The manifest key this scope is declared under.
    #[must_use]
    pub fn manifest_key(self) -> &'static str {
        match self {
            Self::Runtime => "dependencies",
            Self::Dev => "devDependencies",
            Self::Peer => "peerDependencies",
            Self::Optional => "optionalDependencies",
        }
    }
}

impl fmt::Display for DependencyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.manifest_key())
    }
}

/// A commit record from the externally filtered history snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    pub subject: String,
}

/// Descriptor of a package's last published release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastRelease {
    pub version: Version,
    pub git_ref: Option<String>,
}

/// Strategy configuration threaded through propagation and resolution.
///
/// Passed explicitly; there is no ambient configuration state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DepsConfig {
    pub bump: BumpStrategy,
    pub release: ReleaseStrategy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_type_ordering_patch_is_smallest() {
        assert!(ReleaseType::Patch < ReleaseType::Minor);
        assert!(ReleaseType::Patch < ReleaseType::Major);
    }

    #[test]
    fn release_type_ordering_major_is_largest() {
        assert!(ReleaseType::Major > ReleaseType::Minor);
        assert!(ReleaseType::Major > ReleaseType::Patch);
    }

    #[test]
    fn none_sorts_below_every_release_type() {
        let none: Option<ReleaseType> = None;
        assert!(none < Some(ReleaseType::Patch));
        assert!(Some(ReleaseType::Patch) < Some(ReleaseType::Major));
    }

    #[test]
    fn release_strategy_fixed_ignores_cascaded_type() {
        assert_eq!(
            ReleaseStrategy::Patch.resolve(ReleaseType::Major),
            ReleaseType::Patch
        );
        assert_eq!(
            ReleaseStrategy::Minor.resolve(ReleaseType::Major),
            ReleaseType::Minor
        );
    }

    #[test]
    fn release_strategy_inherit_keeps_cascaded_type() {
        assert_eq!(
            ReleaseStrategy::Inherit.resolve(ReleaseType::Major),
            ReleaseType::Major
        );
        assert_eq!(
            ReleaseStrategy::Inherit.resolve(ReleaseType::Patch),
            ReleaseType::Patch
        );
    }

    #[test]
    fn scope_manifest_keys_match_npm_names() {
        assert_eq!(DependencyScope::Runtime.manifest_key(), "dependencies");
        assert_eq!(DependencyScope::Dev.manifest_key(), "devDependencies");
        assert_eq!(DependencyScope::Peer.manifest_key(), "peerDependencies");
        assert_eq!(
            DependencyScope::Optional.manifest_key(),
            "optionalDependencies"
        );
    }
}
