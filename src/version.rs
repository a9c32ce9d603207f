//! Version ordering for discovered artifact names
//!
//! Mirror file names embed their version as plain digit runs
//! (`VMware-workstation-17.0.0-20800274.exe.tar`), not as strict semver, so
//! ordering works on the full sequence of numeric components rather than a
//! parsed version struct.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

static DIGIT_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// The ordered numeric components of an artifact name.
///
/// Built from every maximal digit run in the name, left to right. Extraction
/// is total: a name without digits yields an empty key, which orders before
/// any non-empty key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct VersionKey(Vec<u64>);

impl VersionKey {
    /// Extract the version key from an artifact name.
    ///
    /// Digit runs too long for `u64` saturate to `u64::MAX` rather than
    /// failing, so every input has a key.
    pub fn of(name: &str) -> Self {
        let components = DIGIT_RUNS
            .find_iter(name)
            .map(|m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
            .collect();
        Self(components)
    }

    pub fn components(&self) -> &[u64] {
        &self.0
    }
}

/// Compare two artifact names by their version keys.
///
/// Keys compare component-wise; when one key is a prefix of the other, the
/// longer key is the greater. Names with identical keys compare equal here,
/// so callers that need a deterministic order must use a stable sort.
pub fn compare(a: &str, b: &str) -> Ordering {
    VersionKey::of(a).cmp(&VersionKey::of(b))
}

/// Sort artifact names ascending by version key, preserving the incoming
/// order between names whose keys are identical.
pub fn sort_by_version(names: &mut [String]) {
    names.sort_by(|a, b| compare(a, b));
}

/// The `n` newest names, ascending, ties kept in discovery order.
///
/// Returns the whole input (sorted) when `n` is at least the input length.
pub fn latest_n(names: &[String], n: usize) -> Vec<String> {
    let mut sorted = names.to_vec();
    sort_by_version(&mut sorted);
    let skip = sorted.len().saturating_sub(n);
    sorted.split_off(skip)
}
