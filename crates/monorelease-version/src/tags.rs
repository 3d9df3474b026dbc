use semver::Version;

/// Extracts the first valid semver version embedded in a tag name.
///
/// Tags come in shapes like `pkg-name@1.2.3`, `v1.2.3` or
/// `pkg@1.2.3-beta.4`; the version is whatever parses starting at a digit.
#[must_use]
pub fn version_from_tag(tag: &str) -> Option<Version> {
    tag.char_indices()
        .filter(|(_, c)| c.is_ascii_digit())
        .find_map(|(index, _)| Version::parse(&tag[index..]).ok())
}

/// The prerelease channel of a version: its first prerelease identifier,
/// e.g. `beta` for `1.0.0-beta.3`.
#[must_use]
pub fn prerelease_channel(version: &Version) -> Option<&str> {
    if version.pre.is_empty() {
        None
    } else {
        version.pre.as_str().split('.').next()
    }
}
