use std::collections::HashSet;

use monorelease_core::{DependencyScope, DepsConfig, PackageId, PackageSet, ReleaseDecision, ReleaseType};
use monorelease_version::{next_pre_version, next_version, resolve_next_version};
use semver::Version;
use tracing::debug;

use crate::error::DepsError;

/// Resolves a package's release type, taking cascading local-dependency
/// updates into account.
///
/// The dependency walk always runs first: it rewrites the package's
/// manifest entries for bumped dependencies as a side effect, so manifests
/// stay consistent even when the package's own commits already dictate the
/// release type. The resolved decision (including "no release") is
/// memoized on the package; sibling calls are cheap and each package is
/// computed at most once per run.
///
/// # Errors
///
/// Returns `DepsError::Version` if a dependency's next version cannot be
/// resolved.
pub fn resolve_release_type(
    set: &mut PackageSet,
    id: PackageId,
    config: &DepsConfig,
) -> Result<Option<ReleaseType>, DepsError> {
    resolve_with_visited(set, id, config, &HashSet::new())
}

fn resolve_with_visited(
    set: &mut PackageSet,
    id: PackageId,
    config: &DepsConfig,
    visited: &HashSet<PackageId>,
) -> Result<Option<ReleaseType>, DepsError> {
    if set.get(id).deps_resolved {
        return Ok(set.get(id).release_type());
    }

    let cascaded = dependent_release(set, id, config, visited)?;

    let package = set.get_mut(id);
    package.deps_resolved = true;

    // A release type found by the package's own commit analysis wins.
    if let Some(own) = package.release_type() {
        debug!(package = %package.name, release_type = %own, "release type from own commits");
        return Ok(Some(own));
    }

    match cascaded {
        Some(dependency_type) => {
            let resolved = config.release.resolve(dependency_type);
            package.decision = ReleaseDecision::Release(resolved);
            debug!(
                package = %package.name,
                release_type = %resolved,
                cascaded = %dependency_type,
                "release type cascaded from dependencies"
            );
            Ok(Some(resolved))
        }
        None => {
            package.decision = ReleaseDecision::Skip;
            debug!(package = %package.name, "no release required");
            Ok(None)
        }
    }
}

/// Walks the package's local dependencies, resolving each one's release
/// type recursively and bumping the current package's manifest entries for
/// it. Returns the highest release type among the dependencies that forced
/// a release, or `None` when nothing cascades.
fn dependent_release(
    set: &mut PackageSet,
    id: PackageId,
    config: &DepsConfig,
    visited: &HashSet<PackageId>,
) -> Result<Option<ReleaseType>, DepsError> {
    let local_deps = set.get(id).local_deps.clone();
    let has_last_release = set.get(id).last_release.is_some();

    // The walk must never revisit a package already being resolved
    // anywhere in the current ancestry: descend with this package's whole
    // dependency list added to the visited set.
    let mut child_visited = visited.clone();
    child_visited.extend(local_deps.iter().copied());

    let mut cascaded: Option<ReleaseType> = None;

    for dep_id in local_deps {
        if visited.contains(&dep_id) {
            // Circular local dependency: contributes no further cascade.
            continue;
        }

        let dep_type = resolve_with_visited(set, dep_id, config, &child_visited)?;

        let next: Option<Version> = {
            let dep = set.get(dep_id);
            if dep_type.is_some() {
                Some(if dep.pre_release.is_some() {
                    next_pre_version(dep, None)?
                } else {
                    next_version(dep)
                })
            } else {
                // Fall back to the dependency's last released version so
                // stale ranges still get reconciled.
                dep.last_version().cloned()
            }
        };
        let dep_name = set.get(dep_id).name.clone();

        let mut changed = false;
        if let Some(next) = &next {
            changed = bump_dependency(set, id, &dep_name, next, config);
        }

        // A release is required when a manifest entry actually changed, or
        // when this package has local deps but was never released at all.
        let requires_release = changed || !has_last_release;
        if requires_release && dep_type > cascaded {
            cascaded = dep_type;
        }
    }

    Ok(cascaded)
}

/// Rewrites every scope's entry for `dep_name` in the package's in-memory
/// manifest. Returns whether any value changed.
fn bump_dependency(
    set: &mut PackageSet,
    id: PackageId,
    dep_name: &str,
    next: &Version,
    config: &DepsConfig,
) -> bool {
    let package = set.get_mut(id);
    let package_name = package.name.clone();
    let mut changed = false;

    for scope in DependencyScope::ALL {
        let Some(range) = package.manifest.scope_mut(scope).get_mut(dep_name) else {
            continue;
        };

        let resolved = resolve_next_version(range, next, config.bump);
        if *range != resolved {
            debug!(
                package = %package_name,
                dependency = %dep_name,
                scope = %scope,
                old = %range,
                new = %resolved,
                "bumped dependency range"
            );
            *range = resolved;
            changed = true;
        }
    }

    changed
}
