//! Loose version algebra over action tag strings
//!
//! Tags such as `v4`, `v4.1` and `v4.1.7` are treated as dotted numeric
//! sequences. Components that are missing or not numeric count as `0`, so
//! the ordering is only meaningful between numeric dotted strings: `"abc"`
//! compares equal to `"0"` and below `"1.0.0"`. Pre-release and build
//! metadata are not understood.

use std::cmp::Ordering;

/// Length of a full Git commit SHA
const COMMIT_HASH_LEN: usize = 40;

/// Trim whitespace and strip one leading `v`/`V`
pub fn normalize(version: &str) -> &str {
    let trimmed = version.trim();
    trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
}

/// Parse a single dotted component, falling back to 0
fn component(part: Option<&str>) -> u64 {
    part.and_then(|p| p.parse().ok()).unwrap_or(0)
}

/// Extract the major number (`"v1.2.3"` -> 1)
pub fn extract_major(version: &str) -> u64 {
    component(normalize(version).split('.').next())
}

/// Extract the major and minor numbers (`"v1.2.3"` -> (1, 2))
pub fn extract_major_minor(version: &str) -> (u64, u64) {
    let mut parts = normalize(version).split('.');
    let major = component(parts.next());
    let minor = component(parts.next());
    (major, minor)
}

/// Compare two version strings component by component
///
/// Missing trailing components are treated as `0`, so `v1.0` equals `1.0.0`.
pub fn compare(v1: &str, v2: &str) -> Ordering {
    let left: Vec<&str> = normalize(v1).split('.').collect();
    let right: Vec<&str> = normalize(v2).split('.').collect();

    for i in 0..left.len().max(right.len()) {
        let a = component(left.get(i).copied());
        let b = component(right.get(i).copied());
        match a.cmp(&b) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

/// Returns true for a 40 character hexadecimal commit SHA
pub fn is_commit_hash(reference: &str) -> bool {
    reference.len() == COMMIT_HASH_LEN && reference.chars().all(|c| c.is_ascii_hexdigit())
}

/// Returns true for a major-only reference such as `v3` or `3`
pub fn is_major_version_only(reference: &str) -> bool {
    let normalized = normalize(reference);
    !normalized.is_empty() && normalized.chars().all(|c| c.is_ascii_digit())
}

/// Check a tag against a `^X.Y.Z` / `~X.Y.Z` constraint
///
/// - empty constraint: always matches
/// - `^1.x.y`: any tag with major >= 1
/// - `^N.x.y`: tags with major N
/// - `~N.M.x`: tags with major N and minor M
/// - anything else: never matches
pub fn matches_constraint(tag_version: &str, constraint: &str) -> bool {
    if constraint.is_empty() {
        return true;
    }

    if let Some(rest) = constraint.strip_prefix('^') {
        let constraint_major = extract_major(rest);
        let tag_major = extract_major(tag_version);
        if constraint_major == 1 {
            return tag_major >= 1;
        }
        return tag_major == constraint_major;
    }

    if let Some(rest) = constraint.strip_prefix('~') {
        return extract_major_minor(rest) == extract_major_minor(tag_version);
    }

    false
}

/// Reduce a version to its `v`-prefixed major tag (`"5.2.0"` -> `"v5"`)
pub fn to_major_tag(version: &str) -> String {
    format!("v{}", extract_major(version))
}

/// Decide whether `latest` is an upgrade over `current` under a constraint
///
/// With no constraint only a strictly greater version counts. With a
/// constraint any differing tag that satisfies it counts, which lets a
/// constraint move a reference across majors in either direction.
pub fn should_update(current: &str, latest: &str, constraint: &str) -> bool {
    if latest.is_empty() || current == latest {
        return false;
    }

    if constraint.is_empty() {
        return compare(latest, current) == Ordering::Greater;
    }

    matches_constraint(latest, constraint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("v1.2.3"), "1.2.3");
        assert_eq!(normalize("V1.2.3"), "1.2.3");
        assert_eq!(normalize("  v4 "), "4");
        assert_eq!(normalize("1.0"), "1.0");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_strips_only_one_prefix() {
        assert_eq!(normalize("vv1"), "v1");
    }

    #[test]
    fn test_normalize_idempotent() {
        for input in ["v1.2.3", " V2 ", "3.0", "main", ""] {
            let once = normalize(input);
            assert_eq!(normalize(once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_extract_major() {
        assert_eq!(extract_major("v1.2.3"), 1);
        assert_eq!(extract_major("12"), 12);
        assert_eq!(extract_major("main"), 0);
        assert_eq!(extract_major(""), 0);
    }

    #[test]
    fn test_extract_major_minor() {
        assert_eq!(extract_major_minor("v1.2.3"), (1, 2));
        assert_eq!(extract_major_minor("v4"), (4, 0));
        assert_eq!(extract_major_minor("v2.x"), (2, 0));
        assert_eq!(extract_major_minor("release"), (0, 0));
    }

    #[test]
    fn test_compare_basic() {
        assert_eq!(compare("1.0.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare("v1.0.0", "v2.0.0"), Ordering::Less);
        assert_eq!(compare("v2.0.0", "v1.9.9"), Ordering::Greater);
    }

    #[test]
    fn test_compare_multi_digit() {
        assert_eq!(compare("v1.9.0", "v1.10.0"), Ordering::Less);
        assert_eq!(compare("10.0.0", "9.0.0"), Ordering::Greater);
    }

    #[test]
    fn test_compare_missing_components_are_zero() {
        assert_eq!(compare("v1", "v1.0.0"), Ordering::Equal);
        assert_eq!(compare("1.0", "1.0.1"), Ordering::Less);
    }

    #[test]
    fn test_compare_non_numeric_components_are_zero() {
        assert_eq!(compare("abc", "0"), Ordering::Equal);
        assert_eq!(compare("abc", "1.0.0"), Ordering::Less);
        assert_eq!(compare("v1.0.0-beta", "v1.0.0"), Ordering::Equal);
    }

    #[test]
    fn test_compare_antisymmetric_and_transitive() {
        let versions = ["0.9", "1", "1.0.1", "1.2", "1.10.0", "2.0.0", "v3"];
        for a in versions {
            assert_eq!(compare(a, a), Ordering::Equal);
            for b in versions {
                assert_eq!(compare(a, b), compare(b, a).reverse(), "{} vs {}", a, b);
                for c in versions {
                    if compare(a, b) == Ordering::Less && compare(b, c) == Ordering::Less {
                        assert_eq!(compare(a, c), Ordering::Less, "{} < {} < {}", a, b, c);
                    }
                }
            }
        }
    }

    #[test]
    fn test_is_commit_hash() {
        assert!(is_commit_hash("8e5e7e5ab8b370d6c329ec480221332ada57f0ab"));
        assert!(is_commit_hash("8E5E7E5AB8B370D6C329EC480221332ADA57F0AB"));
        assert!(!is_commit_hash("8e5e7e5ab8b370d6c329ec480221332ada57f0a"));
        assert!(!is_commit_hash("8e5e7e5ab8b370d6c329ec480221332ada57f0abc"));
        assert!(!is_commit_hash("8e5e7e5ab8b370d6c329ec480221332ada57f0ag"));
        assert!(!is_commit_hash("v4"));
    }

    #[test]
    fn test_is_major_version_only() {
        assert!(is_major_version_only("v3"));
        assert!(is_major_version_only("3"));
        assert!(is_major_version_only("V12"));
        assert!(!is_major_version_only("v3.1"));
        assert!(!is_major_version_only("v"));
        assert!(!is_major_version_only(""));
        assert!(!is_major_version_only("main"));
    }

    #[test]
    fn test_matches_constraint_table() {
        assert!(matches_constraint("v2.5.0", "^1.0.0"));
        assert!(!matches_constraint("v3.0.0", "^2.0.0"));
        assert!(matches_constraint("v2.5.1", "~2.5.0"));
        assert!(!matches_constraint("v2.6.0", "~2.5.0"));
    }

    #[test]
    fn test_matches_constraint_caret() {
        assert!(matches_constraint("v1.5.0", "^1.0.0"));
        assert!(matches_constraint("v3.5.0", "^1.0.0"));
        assert!(!matches_constraint("v0.9.0", "^1.0.0"));
        assert!(matches_constraint("v2.0.0", "^2.0.0"));
        assert!(!matches_constraint("v1.9.0", "^2.0.0"));
    }

    #[test]
    fn test_matches_constraint_tilde() {
        assert!(!matches_constraint("v2.4.9", "~2.5.0"));
        assert!(!matches_constraint("v3.5.0", "~2.5.0"));
    }

    #[test]
    fn test_matches_constraint_empty_and_unknown() {
        for tag in ["v1.0.0", "main", "", "v99"] {
            assert!(matches_constraint(tag, ""));
        }
        assert!(!matches_constraint("2.0.0", "invalid"));
        assert!(!matches_constraint("2.0.0", ">=2.0.0"));
    }

    #[test]
    fn test_to_major_tag() {
        assert_eq!(to_major_tag("v5.2.0"), "v5");
        assert_eq!(to_major_tag("5.2.0"), "v5");
        assert_eq!(to_major_tag("V7"), "v7");
    }

    #[test]
    fn test_should_update_unconstrained() {
        assert!(should_update("v3", "v4.0.0", ""));
        assert!(!should_update("v4.0.0", "v4.0.0", ""));
        assert!(!should_update("v5.0.0", "v4.0.0", ""));
        assert!(!should_update("v3", "", ""));
    }

    #[test]
    fn test_should_update_constrained() {
        assert!(should_update("v3", "v1.9.0", "^1.0.0"));
        assert!(should_update("v2.5.0", "v2.5.3", "~2.5.0"));
        assert!(!should_update("v2.5.0", "v2.6.0", "~2.5.0"));
        assert!(!should_update("v2.5.0", "v2.5.0", "~2.5.0"));
    }
}
