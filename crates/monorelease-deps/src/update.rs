use std::path::PathBuf;

use monorelease_core::{DependencyScope, Manifest, ManifestFormat, PackageId, PackageSet};
use tracing::debug;

use crate::error::DepsError;

/// A single rewritten dependency range, recorded for diagnostics and
/// release notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyChange {
    pub name: String,
    pub scope: DependencyScope,
    pub old: String,
    pub new: String,
}

/// A pending manifest write: the serialized contents to put on disk and
/// the scope changes that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestWrite {
    pub path: PathBuf,
    pub contents: String,
    pub changes: Vec<DependencyChange>,
}

/// Compares a package's in-memory manifest against its original raw text
/// and plans the write needed to bring the file up to date.
///
/// Returns `Ok(None)` when no dependency scope value differs; the caller
/// must not touch the file in that case. The rendered contents keep the
/// original text's key order plus its detected indentation and trailing
/// whitespace; only dependency range values change.
///
/// # Errors
///
/// Returns `DepsError::UnresolvedDependency` if a local dependency has
/// neither a pending next version nor a prior release, and
/// `DepsError::Manifest` if the original text cannot be re-parsed or the
/// updated manifest cannot be serialized.
pub fn plan_manifest_update(
    set: &PackageSet,
    id: PackageId,
) -> Result<Option<ManifestWrite>, DepsError> {
    let package = set.get(id);

    // A dependant must never be written while it references a dependency
    // with no concrete version at all.
    for dep_id in &package.local_deps {
        let dep = set.get(*dep_id);
        if dep.next_version.is_none() && dep.last_release.is_none() {
            return Err(DepsError::UnresolvedDependency {
                package: package.name.clone(),
                dependency: dep.name.clone(),
            });
        }
    }

    let original = Manifest::parse(&package.raw_manifest)?;
    let changes = diff_scopes(&original, &package.manifest);
    if changes.is_empty() {
        return Ok(None);
    }

    for change in &changes {
        debug!(
            package = %package.name,
            dependency = %change.name,
            scope = %change.scope,
            old = %change.old,
            new = %change.new,
            "manifest dependency updated"
        );
    }

    let format = ManifestFormat::detect(&package.raw_manifest);
    let contents = package
        .manifest
        .render_updated(&package.raw_manifest, &format)?;

    Ok(Some(ManifestWrite {
        path: package.path.clone(),
        contents,
        changes,
    }))
}

fn diff_scopes(original: &Manifest, updated: &Manifest) -> Vec<DependencyChange> {
    let mut changes = Vec::new();

    for scope in DependencyScope::ALL {
        let old_scope = original.scope(scope);
        for (name, new) in updated.scope(scope) {
            let old = old_scope.get(name);
            if old != Some(new) {
                changes.push(DependencyChange {
                    name: name.clone(),
                    scope,
                    old: old.cloned().unwrap_or_default(),
                    new: new.clone(),
                });
            }
        }
    }

    changes
}
