//! Version compatibility negotiation
//!
//! Two versions are compatible when they are textually equal or share the
//! same parseable leading major integer. An expected version that is absent,
//! empty, or unparseable imposes no constraint.

/// Parse the leading major-version integer of a semantic version string.
pub fn parse_major(version: &str) -> Option<u64> {
    version.split('.').next()?.trim().parse().ok()
}

/// Check whether a served version satisfies an (optional) expected version.
pub fn is_compatible(expected: Option<&str>, actual: &str) -> bool {
    let expected = match expected {
        Some(e) if !e.is_empty() => e,
        _ => return true,
    };
    if actual.is_empty() || expected == actual {
        return true;
    }
    match (parse_major(expected), parse_major(actual)) {
        (Some(e), Some(a)) => e == a,
        // An unparseable expected version cannot constrain anything.
        (None, _) => true,
        (Some(_), None) => false,
    }
}
