//! Version matching abstraction for project files
//!
//! Most project files are read by applying the descriptor's regex patterns
//! ([`PatternMatcher`]). `pyproject.toml` needs to know which TOML section a
//! line belongs to, so it gets a dedicated strategy ([`PyprojectMatcher`]) that
//! never consults the generic patterns.

use std::path::Path;
use std::sync::Arc;

use regex::Regex;

use crate::fs::FileReader;
use crate::version::cache::PatternCache;
use crate::version::error::ExtractError;
use crate::version::matchers::{PatternMatcher, PyprojectMatcher};
use crate::version::semver::{clean_version, is_valid_version};

const PYPROJECT_FILE_NAME: &str = "pyproject.toml";

/// A version found in a file, with the identifier of what matched it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMatch {
    /// Cleaned and validated version
    pub version: String,
    /// Pattern source, or a marker such as `__version__.py`
    pub matched_by: String,
}

impl VersionMatch {
    pub fn new(version: impl Into<String>, matched_by: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            matched_by: matched_by.into(),
        }
    }
}

/// Strategy for reading a version out of one file
pub trait VersionMatcher: Send + Sync {
    /// Returns `Ok(None)` when no pattern yields a valid version.
    ///
    /// Invalid patterns are skipped; read failures (missing file, oversized
    /// file) are returned as errors.
    fn extract(&self, path: &Path, patterns: &[String])
    -> Result<Option<VersionMatch>, ExtractError>;
}

/// Both matching strategies over one shared cache and reader
pub struct Matchers {
    pattern: PatternMatcher,
    pyproject: PyprojectMatcher,
}

impl Matchers {
    pub fn new(cache: Arc<PatternCache>, reader: FileReader) -> Self {
        Self {
            pattern: PatternMatcher::new(Arc::clone(&cache), reader),
            pyproject: PyprojectMatcher::new(cache, reader),
        }
    }

    /// Pick the strategy for `path` by its file name
    pub fn select_matcher(&self, path: &Path) -> &dyn VersionMatcher {
        let is_pyproject = path
            .file_name()
            .is_some_and(|name| name == PYPROJECT_FILE_NAME);

        if is_pyproject {
            &self.pyproject
        } else {
            &self.pattern
        }
    }

    pub fn extract(
        &self,
        path: &Path,
        patterns: &[String],
    ) -> Result<Option<VersionMatch>, ExtractError> {
        self.select_matcher(path).extract(path, patterns)
    }
}

/// Group 1 of the first match in `text`, trimmed, cleaned and validated
pub(crate) fn capture_version(re: &Regex, text: &str) -> Option<String> {
    let captured = re.captures(text)?.get(1)?.as_str().trim();
    if captured.is_empty() {
        return None;
    }

    let version = clean_version(captured);
    is_valid_version(&version).then_some(version)
}
