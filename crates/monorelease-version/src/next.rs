use monorelease_core::{Package, ReleaseType};
use semver::{BuildMetadata, Prerelease, Version};

use crate::error::VersionError;
use crate::tags::{prerelease_channel, version_from_tag};

/// Increments a version by the given release type, resetting the lower
/// components to zero and stripping prerelease and build identifiers.
#[must_use]
pub fn increment(version: &Version, release_type: ReleaseType) -> Version {
    let mut next = Version::new(version.major, version.minor, version.patch);

    match release_type {
        ReleaseType::Major => {
            next.major += 1;
            next.minor = 0;
            next.patch = 0;
        }
        ReleaseType::Minor => {
            next.minor += 1;
            next.patch = 0;
        }
        ReleaseType::Patch => {
            next.patch += 1;
        }
    }

    next
}

/// Resolves the full-release version a package would publish this run.
///
/// A package without a last release, or without a resolved release type,
/// keeps its last version (`1.0.0` if it was never released).
#[must_use]
pub fn next_version(package: &Package) -> Version {
    match (package.last_version(), package.release_type()) {
        (Some(last), Some(release_type)) => increment(last, release_type),
        (Some(last), None) => last.clone(),
        (None, _) => Version::new(1, 0, 0),
    }
}

/// Increments a version as a prerelease on the given channel.
///
/// A same-channel prerelease bumps its numeric tail (`1.0.0-beta.3` →
/// `1.0.0-beta.4`); a stable version starts a new lineage one patch up
/// (`1.0.0` → `1.0.1-beta.1`); any other prerelease is moved onto the
/// channel keeping its core version.
///
/// # Errors
///
/// Returns `VersionError::InvalidVersion` if the channel does not form a
/// valid prerelease identifier.
pub fn increment_prerelease(version: &Version, channel: &str) -> Result<Version, VersionError> {
    if prerelease_channel(version) == Some(channel) {
        let tail = version
            .pre
            .as_str()
            .rsplit('.')
            .next()
            .and_then(|part| part.parse::<u64>().ok())
            .unwrap_or(0);
        return with_channel(version, channel, tail + 1);
    }

    if version.pre.is_empty() {
        let bumped = increment(version, ReleaseType::Patch);
        return with_channel(&bumped, channel, 1);
    }

    with_channel(version, channel, 1)
}

/// Resolves the next prerelease version for a package on its configured
/// channel, comparing bumped published tags against the last version.
///
/// # Errors
///
/// Returns `VersionError::MissingChannel` if the package has no prerelease
/// channel, or `VersionError::InvalidVersion` if a prerelease identifier
/// cannot be formed.
pub fn next_pre_version(
    package: &Package,
    tags_override: Option<&[String]>,
) -> Result<Version, VersionError> {
    let channel = package
        .pre_release
        .as_deref()
        .ok_or_else(|| VersionError::MissingChannel {
            package: package.name.clone(),
        })?;

    let Some(last) = package.last_version() else {
        // Never released: the prerelease lineage starts fresh.
        return with_channel(&Version::new(1, 0, 0), channel, 1);
    };

    match prerelease_channel(last) {
        // Channel switch: the old lineage does not carry over.
        Some(label) if label != channel => with_channel(&Version::new(1, 0, 0), channel, 1),

        // A full release is being turned into a prerelease lineage:
        // increment the core by the resolved release type.
        None => {
            let release_type = package.release_type().unwrap_or(ReleaseType::Patch);
            let base = Version::new(last.major, last.minor, last.patch);
            with_channel(&increment(&base, release_type), channel, 1)
        }

        // Same channel: bump the published tags and the last version,
        // keep whichever lands higher.
        Some(_) => {
            let tags = tags_override.unwrap_or(&package.tags);
            // A tag belongs to this package only with a delimited
            // `name@` prefix; tags without a name part count too. The
            // channel is checked on the parsed version, never by
            // substring.
            let prefix = format!("{}@", package.name);
            let latest_tag = tags
                .iter()
                .filter(|tag| tag.starts_with(&prefix) || !tag.contains('@'))
                .filter_map(|tag| version_from_tag(tag))
                .filter(|version| prerelease_channel(version) == Some(channel))
                .max();

            let bump_from_last = increment_prerelease(last, channel)?;
            match latest_tag {
                Some(tag_version) => {
                    let bump_from_tags = increment_prerelease(&tag_version, channel)?;
                    Ok(bump_from_tags.max(bump_from_last))
                }
                None => Ok(bump_from_last),
            }
        }
    }
}

fn with_channel(version: &Version, channel: &str, number: u64) -> Result<Version, VersionError> {
    let pre = format!("{channel}.{number}");
    let pre = Prerelease::new(&pre).map_err(|source| VersionError::InvalidVersion {
        version: format!("{}.{}.{}-{pre}", version.major, version.minor, version.patch),
        source,
    })?;

    Ok(Version {
        major: version.major,
        minor: version.minor,
        patch: version.patch,
        pre,
        build: BuildMetadata::EMPTY,
    })
}
