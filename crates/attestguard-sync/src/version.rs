// crates/attestguard-sync/src/version.rs
// ============================================================================
// Module: Dstack Version Parsing
// Description: Parses and compares `major.minor.patch[.build]` base-image
//              version strings (spec.md §4.9).
// Purpose: Drive contract-address/domain derivation and the version allow-list.
// Dependencies: regex
// ============================================================================

use std::sync::OnceLock;

use regex::Regex;

/// A parsed `major.minor.patch[.build]` dstack version, with unspecified
/// `build` treated as `0` for comparison (spec.md §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DstackVersion {
    /// Major component.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
    /// Build component, defaulting to `0` when absent from the source string.
    pub build: u64,
}

/// Lazily-built matcher for `(\d+)\.(\d+)\.(\d+)(?:\.(\d+))?$`.
fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::unwrap_used, reason = "pattern is a fixed literal, infallible to compile")]
    let compiled = PATTERN.get_or_init(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)(?:\.(\d+))?$").unwrap());
    compiled
}

impl DstackVersion {
    /// Parses the trailing `major.minor.patch[.build]` substring out of a
    /// base-image string such as `"dstack-dev-0.5.3"`. Returns `None` when
    /// no such substring is present.
    #[must_use]
    pub fn parse(base_image: &str) -> Option<Self> {
        let captures = pattern().captures(base_image)?;
        let component = |index: usize| captures.get(index).map(|m| m.as_str()).unwrap_or("0");
        Some(Self {
            major: component(1).parse().ok()?,
            minor: component(2).parse().ok()?,
            patch: component(3).parse().ok()?,
            build: component(4).parse().unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::DstackVersion;

    #[test]
    fn parses_three_component_version() {
        let version = DstackVersion::parse("dstack-dev-0.5.3").expect("parses");
        assert_eq!(version, DstackVersion { major: 0, minor: 5, patch: 3, build: 0 });
    }

    #[test]
    fn parses_four_component_version() {
        let version = DstackVersion::parse("dstack-dev-0.5.1.2").expect("parses");
        assert_eq!(version, DstackVersion { major: 0, minor: 5, patch: 1, build: 2 });
    }

    #[test]
    fn compares_lexicographically_by_tuple() {
        let lower = DstackVersion::parse("0.5.1").expect("parses");
        let higher = DstackVersion::parse("0.5.3").expect("parses");
        assert!(lower < higher);
    }

    #[test]
    fn missing_version_returns_none() {
        assert!(DstackVersion::parse("no-version-here").is_none());
    }
}
