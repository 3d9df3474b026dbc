use monorelease_core::BumpStrategy;
use semver::{Version, VersionReq};

/// Resolves how a dependency's bumped version is written into a
/// dependant's declared range.
///
/// `Override` replaces the range outright. `Satisfy` keeps a range the new
/// version already satisfies (`*` satisfies everything, `1.5.0` satisfies
/// `^1.0.0`, and so on) and otherwise overrides. `Inherit` keeps satisfied
/// ranges too, and otherwise follows the declared shape: `~1.0.0` bumped
/// by a minor change becomes `~1.1.0`, `1.2.x` bumped to `1.3.0` becomes
/// `1.3.x`.
#[must_use]
pub fn resolve_next_version(
    current_range: &str,
    next_version: &Version,
    strategy: BumpStrategy,
) -> String {
    match strategy {
        BumpStrategy::Override => next_version.to_string(),
        BumpStrategy::Satisfy => {
            if satisfies(current_range, next_version) {
                current_range.to_string()
            } else {
                next_version.to_string()
            }
        }
        BumpStrategy::Inherit => {
            if satisfies(current_range, next_version) {
                current_range.to_string()
            } else {
                inherit_range(current_range, &next_version.to_string())
            }
        }
    }
}

/// Standard range satisfaction. A range that does not parse satisfies
/// nothing, so unparseable declarations fall through to an override.
fn satisfies(range: &str, version: &Version) -> bool {
    VersionReq::parse(range).is_ok_and(|req| req.matches(version))
}

/// Substitutes, dot-segment by dot-segment, the digit run of each range
/// segment with the corresponding next-version segment. Non-digit prefix
/// and operator characters are preserved; segments without digits
/// (wildcards) and segments with no next-version counterpart pass through
/// unchanged.
fn inherit_range(current_range: &str, next_version: &str) -> String {
    let next_segments: Vec<&str> = next_version.split('.').collect();

    current_range
        .split('.')
        .enumerate()
        .map(|(index, segment)| match next_segments.get(index) {
            Some(next_segment) => replace_digit_run(segment, next_segment),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Replaces the first contiguous digit run in `segment` with
/// `replacement`, keeping everything around it.
fn replace_digit_run(segment: &str, replacement: &str) -> String {
    let Some(start) = segment.find(|c: char| c.is_ascii_digit()) else {
        return segment.to_string();
    };
    let end = segment[start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(segment.len(), |offset| start + offset);

    format!("{}{}{}", &segment[..start], replacement, &segment[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(s: &str) -> Version {
        Version::parse(s).expect("valid version")
    }

    #[test]
    fn override_replaces_any_range_verbatim() {
        let next = version("1.5.0");
        assert_eq!(
            resolve_next_version("^1.0.0", &next, BumpStrategy::Override),
            "1.5.0"
        );
        assert_eq!(
            resolve_next_version("*", &next, BumpStrategy::Override),
            "1.5.0"
        );
    }

    #[test]
    fn satisfy_keeps_range_when_version_matches() {
        assert_eq!(
            resolve_next_version("^1.0.0", &version("1.5.0"), BumpStrategy::Satisfy),
            "^1.0.0"
        );
        assert_eq!(
            resolve_next_version("*", &version("9.9.9"), BumpStrategy::Satisfy),
            "*"
        );
        assert_eq!(
            resolve_next_version("1.x", &version("1.2.1"), BumpStrategy::Satisfy),
            "1.x"
        );
    }

    #[test]
    fn satisfy_overrides_when_version_escapes_range() {
        assert_eq!(
            resolve_next_version("^1.0.0", &version("2.0.0"), BumpStrategy::Satisfy),
            "2.0.0"
        );
        assert_eq!(
            resolve_next_version("~1.0.0", &version("1.1.0"), BumpStrategy::Satisfy),
            "1.1.0"
        );
    }

    #[test]
    fn inherit_keeps_satisfied_ranges_unchanged() {
        assert_eq!(
            resolve_next_version("^1.0.0", &version("1.5.0"), BumpStrategy::Inherit),
            "^1.0.0"
        );
        assert_eq!(
            resolve_next_version("1.x", &version("1.2.1"), BumpStrategy::Inherit),
            "1.x"
        );
        assert_eq!(
            resolve_next_version("1.x", &version("1.3.0"), BumpStrategy::Inherit),
            "1.x"
        );
    }

    #[test]
    fn inherit_substitutes_segment_wise_preserving_operators() {
        assert_eq!(
            resolve_next_version("~1.0.0", &version("1.1.0"), BumpStrategy::Inherit),
            "~1.1.0"
        );
        assert_eq!(
            resolve_next_version("^1.0.0", &version("2.0.0"), BumpStrategy::Inherit),
            "^2.0.0"
        );
    }

    #[test]
    fn inherit_passes_wildcard_segments_through() {
        assert_eq!(
            resolve_next_version("1.2.x", &version("1.3.0"), BumpStrategy::Inherit),
            "1.3.x"
        );
        assert_eq!(
            resolve_next_version("1.x", &version("2.0.0"), BumpStrategy::Inherit),
            "2.x"
        );
    }

    #[test]
    fn inherit_keeps_range_segment_count_on_mismatch() {
        // Extra next-version segments are ignored, extra range segments
        // pass through unchanged.
        assert_eq!(
            resolve_next_version("2.x", &version("3.1.0"), BumpStrategy::Inherit),
            "3.x"
        );
    }

    #[test]
    fn inherit_overrides_unparseable_ranges_segment_wise() {
        // "workspace:*"-style declarations have no digits at all and pass
        // through; plain garbage with digits gets its digit runs replaced.
        assert_eq!(
            resolve_next_version("workspace:*", &version("1.2.3"), BumpStrategy::Inherit),
            "workspace:*"
        );
    }

    #[test]
    fn replace_digit_run_keeps_surrounding_characters() {
        assert_eq!(replace_digit_run("~1", "2"), "~2");
        assert_eq!(replace_digit_run(">=10", "11"), ">=11");
        assert_eq!(replace_digit_run("x", "3"), "x");
        assert_eq!(replace_digit_run("1-beta", "2"), "2-beta");
    }
}
