use std::collections::HashMap;
use std::path::PathBuf;

use semver::Version;

use crate::error::GraphError;
use crate::manifest::Manifest;
use crate::types::{Commit, DependencyScope, LastRelease, ReleaseType};

/// Stable identifier of a package within a [`PackageSet`].
///
/// Dependency edges are stored as lists of these identifiers rather than
/// object references, so diamonds and cycles in the local graph need no
/// shared ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(pub usize);

/// Resolution state of a package's release type within the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseDecision {
    /// Not yet analyzed or propagated.
    #[default]
    Pending,
    /// Resolved: no release this run.
    Skip,
    /// Resolved to a concrete release type.
    Release(ReleaseType),
}

impl ReleaseDecision {
    #[must_use]
    pub fn release_type(self) -> Option<ReleaseType> {
        match self {
            Self::Release(release_type) => Some(release_type),
            Self::Pending | Self::Skip => None,
        }
    }

    #[must_use]
    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A package participating in a multirelease run.
///
/// The snapshot fields (`manifest`, `raw_manifest`, `commits`, `tags`,
/// `last_release`, `pre_release`) are populated by the environment when the
/// graph is built. The release-state fields start empty and are filled in
/// as the package's pipeline advances; they are discarded with the set at
/// the end of the run.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub path: PathBuf,
    pub manifest: Manifest,
    /// Original on-disk manifest text, kept for the format-preserving
    /// rewrite and the change audit.
    pub raw_manifest: String,
    /// Local dependencies in manifest declaration order.
    pub local_deps: Vec<PackageId>,
    /// Commit history already filtered to this package's subtree.
    pub commits: Vec<Commit>,
    /// Previously published tag names for this package's branch.
    pub tags: Vec<String>,
    /// Prerelease channel identifier, when releasing on one.
    pub pre_release: Option<String>,
    pub last_release: Option<LastRelease>,

    pub decision: ReleaseDecision,
    pub next_version: Option<Version>,
    /// Set once dependency propagation has run for this package, so the
    /// resolved decision is computed at most once per run.
    pub deps_resolved: bool,
}

impl Package {
    #[must_use]
    pub fn new(manifest: Manifest, raw_manifest: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: manifest.name.clone(),
            path: path.into(),
            manifest,
            raw_manifest: raw_manifest.into(),
            local_deps: Vec::new(),
            commits: Vec::new(),
            tags: Vec::new(),
            pre_release: None,
            last_release: None,
            decision: ReleaseDecision::default(),
            next_version: None,
            deps_resolved: false,
        }
    }

    #[must_use]
    pub fn last_version(&self) -> Option<&Version> {
        self.last_release.as_ref().map(|release| &release.version)
    }

    #[must_use]
    pub fn release_type(&self) -> Option<ReleaseType> {
        self.decision.release_type()
    }

    /// Records the version to publish this run. Once set, the value never
    /// regresses to a lower semantic value.
    pub fn set_next_version(&mut self, version: Version) {
        match &self.next_version {
            Some(current) if *current >= version => {}
            _ => self.next_version = Some(version),
        }
    }
}

/// Arena of package records addressed by [`PackageId`].
#[derive(Debug, Default)]
pub struct PackageSet {
    packages: Vec<Package>,
    by_name: HashMap<String, PackageId>,
}

impl PackageSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `GraphError::DuplicatePackage` if a package with the same
    /// name is already present.
    pub fn insert(&mut self, package: Package) -> Result<PackageId, GraphError> {
        if self.by_name.contains_key(&package.name) {
            return Err(GraphError::DuplicatePackage { name: package.name });
        }

        let id = PackageId(self.packages.len());
        self.by_name.insert(package.name.clone(), id);
        self.packages.push(package);
        Ok(id)
    }

    /// Derives each package's local-dependency list from its manifest:
    /// dependency names that match another package in the set, across all
    /// four scopes, in declaration order and without duplicates.
    pub fn link_local_deps(&mut self) {
        for index in 0..self.packages.len() {
            let mut deps: Vec<PackageId> = Vec::new();
            for scope in DependencyScope::ALL {
                for dep_name in self.packages[index].manifest.scope(scope).keys() {
                    if let Some(&dep_id) = self.by_name.get(dep_name) {
                        if dep_id.0 != index && !deps.contains(&dep_id) {
                            deps.push(dep_id);
                        }
                    }
                }
            }
            self.packages[index].local_deps = deps;
        }
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this set.
    #[must_use]
    pub fn get(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this set.
    pub fn get_mut(&mut self, id: PackageId) -> &mut Package {
        &mut self.packages[id.0]
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<PackageId> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<PackageId> {
        (0..self.packages.len()).map(PackageId).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(name: &str, runtime_deps: &[(&str, &str)]) -> Package {
        let mut manifest = Manifest::new(name);
        for (dep, range) in runtime_deps {
            manifest
                .dependencies
                .insert((*dep).to_string(), (*range).to_string());
        }
        Package::new(manifest, "{}", format!("packages/{name}"))
    }

    #[test]
    fn insert_rejects_duplicate_names() {
        let mut set = PackageSet::new();
        set.insert(package("a", &[])).expect("insert a");

        let err = set.insert(package("a", &[])).expect_err("duplicate");
        assert!(matches!(err, GraphError::DuplicatePackage { name } if name == "a"));
    }

    #[test]
    fn link_local_deps_resolves_only_in_repo_packages() {
        let mut set = PackageSet::new();
        let a = set
            .insert(package("a", &[("b", "1.0.0"), ("lodash", "^4.0.0")]))
            .expect("insert a");
        let b = set.insert(package("b", &[])).expect("insert b");

        set.link_local_deps();

        assert_eq!(set.get(a).local_deps, vec![b]);
        assert!(set.get(b).local_deps.is_empty());
    }

    #[test]
    fn link_local_deps_dedups_across_scopes_and_skips_self() {
        let mut set = PackageSet::new();
        let mut manifest = Manifest::new("a");
        manifest.dependencies.insert("b".into(), "1.0.0".into());
        manifest.dev_dependencies.insert("b".into(), "1.0.0".into());
        manifest.peer_dependencies.insert("a".into(), "*".into());
        let a = set
            .insert(Package::new(manifest, "{}", "packages/a"))
            .expect("insert a");
        let b = set.insert(package("b", &[])).expect("insert b");

        set.link_local_deps();

        assert_eq!(set.get(a).local_deps, vec![b]);
    }

    #[test]
    fn set_next_version_never_regresses() {
        let mut pkg = package("a", &[]);

        pkg.set_next_version(Version::new(1, 2, 0));
        pkg.set_next_version(Version::new(1, 0, 0));
        assert_eq!(pkg.next_version, Some(Version::new(1, 2, 0)));

        pkg.set_next_version(Version::new(2, 0, 0));
        assert_eq!(pkg.next_version, Some(Version::new(2, 0, 0)));
    }

    #[test]
    fn release_decision_resolution_states() {
        assert!(!ReleaseDecision::Pending.is_resolved());
        assert!(ReleaseDecision::Skip.is_resolved());
        assert!(ReleaseDecision::Release(ReleaseType::Minor).is_resolved());
        assert_eq!(
            ReleaseDecision::Release(ReleaseType::Minor).release_type(),
            Some(ReleaseType::Minor)
        );
        assert_eq!(ReleaseDecision::Skip.release_type(), None);
    }
}
