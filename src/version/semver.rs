//! Cleaning and validation of version strings captured from project files

use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

/// Prefixes stripped from a captured version; only the first match is removed
const VERSION_PREFIXES: &[&str] = &["version=", "Version=", "VERSION=", "v", "V"];

/// Python-style release with a trailing alphabetic segment: `1.2.3.dev0`, `1.0.0.post1`
static PYTHON_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+\.[A-Za-z]+[0-9]*$").unwrap());

/// Numbers and dots, at most four components
static SIMPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+){0,3}$").unwrap());

/// Calendar versions: `2024`, `2024.01`, `2024.01.15`
static CALVER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}(\.[0-9]{2})*$").unwrap());

/// Normalize a raw regex capture into a bare version string.
///
/// Examples:
/// - `"v1.2.3"` -> `1.2.3`
/// - `version=1.2.3;` -> `1.2.3`
/// - `1.2.3,` -> `1.2.3`
pub fn clean_version(raw: &str) -> String {
    let version = raw.trim().trim_matches(['"', '\'']);

    let version = VERSION_PREFIXES
        .iter()
        .find_map(|prefix| version.strip_prefix(*prefix))
        .unwrap_or(version);

    version
        .trim_end_matches([';', ','])
        .trim()
        .to_string()
}

/// Check whether a cleaned string looks like a version.
///
/// Accepts strict semver (optionally `v`-prefixed), Python-style releases,
/// plain dotted numbers with up to four components and CalVer.
pub fn is_valid_version(version: &str) -> bool {
    if version.is_empty() {
        return false;
    }

    let unprefixed = version.strip_prefix('v').unwrap_or(version);
    Version::parse(unprefixed).is_ok()
        || PYTHON_STYLE.is_match(version)
        || SIMPLE.is_match(version)
        || CALVER.is_match(version)
}
