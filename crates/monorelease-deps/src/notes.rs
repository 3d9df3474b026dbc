use std::fmt::Write as _;

use monorelease_core::{PackageId, PackageSet};

/// Renders the release-note section listing this package's upgraded local
/// dependencies, in manifest order.
///
/// Returns `None` when no local dependency has a next version this run,
/// so the caller can append the section only when there is something to
/// say.
#[must_use]
pub fn upgrade_notes(set: &PackageSet, id: PackageId) -> Option<String> {
    let package = set.get(id);

    let upgrades: Vec<_> = package
        .local_deps
        .iter()
        .map(|dep_id| set.get(*dep_id))
        .filter_map(|dep| dep.next_version.as_ref().map(|next| (&dep.name, next)))
        .collect();

    if upgrades.is_empty() {
        return None;
    }

    let mut section = String::from("### Dependencies\n");
    for (name, next) in upgrades {
        let _ = write!(section, "\n* **{name}:** upgraded to {next}");
    }

    Some(section)
}
