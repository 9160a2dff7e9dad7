//! Section-aware `pyproject.toml` matcher
//!
//! Only `version` keys directly inside the top-level `[project]` table count;
//! `[tool.poetry]`, `[project.optional-dependencies]` and other tables often
//! carry unrelated `version` entries. When `[project]` has no static version the
//! package's `__version__.py` is consulted instead.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};

use crate::config::{MAX_VERSION_FILES, VERSION_FILE_MARKER};
use crate::fs::FileReader;
use crate::version::cache::PatternCache;
use crate::version::error::ExtractError;
use crate::version::matcher::{VersionMatch, VersionMatcher, capture_version};

const PROJECT_SECTION: &str = "[project]";

/// Exact `version` key with a single- or double-quoted value
const PROJECT_VERSION_PATTERN: &str = r#"^\s*version\s*=\s*["']([^"']+)["']"#;

const VERSION_FILE_PATTERN: &str = r#"__version__\s*=\s*["']([^"']+)["']"#;

pub struct PyprojectMatcher {
    cache: Arc<PatternCache>,
    reader: FileReader,
}

impl PyprojectMatcher {
    pub fn new(cache: Arc<PatternCache>, reader: FileReader) -> Self {
        Self { cache, reader }
    }

    fn project_section_version(&self, path: &Path) -> Result<Option<String>, ExtractError> {
        let re = self.cache.get(PROJECT_VERSION_PATTERN)?;
        let mut in_project = false;

        self.reader.process_lines(path, |line| {
            let trimmed = line.trim();
            if trimmed == PROJECT_SECTION {
                in_project = true;
                return None;
            }
            if trimmed.starts_with('[') {
                in_project = false;
                return None;
            }
            if !in_project || trimmed.starts_with('#') {
                return None;
            }

            capture_version(&re, line)
        })
    }

    /// Candidate `__version__.py` files, in lookup order, at most `MAX_VERSION_FILES`
    fn version_files(&self, root: &Path) -> Vec<PathBuf> {
        let direct = [
            root.join(VERSION_FILE_MARKER),
            root.join("src").join(VERSION_FILE_MARKER),
        ];
        let escaped = Pattern::escape(&root.to_string_lossy());
        let escaped = escaped.trim_end_matches('/');
        let globbed = [
            format!("{escaped}/src/*/{VERSION_FILE_MARKER}"),
            format!("{escaped}/*/{VERSION_FILE_MARKER}"),
        ];
        let options = MatchOptions {
            require_literal_leading_dot: true,
            ..MatchOptions::new()
        };

        let mut seen = HashSet::new();
        let mut files = Vec::new();

        let candidates = direct.into_iter().chain(globbed.iter().flat_map(|pattern| {
            glob::glob_with(pattern, options)
                .inspect_err(|e| warn!("Invalid version file pattern {}: {}", pattern, e))
                .into_iter()
                .flatten()
                .filter_map(Result::ok)
        }));

        for candidate in candidates {
            if files.len() >= MAX_VERSION_FILES {
                break;
            }
            if candidate.is_file() && seen.insert(candidate.clone()) {
                files.push(candidate);
            }
        }

        files
    }

    fn version_file_version(&self, pyproject: &Path) -> Result<Option<String>, ExtractError> {
        let root = match pyproject.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let re = self.cache.get(VERSION_FILE_PATTERN)?;

        for file in self.version_files(root) {
            let found = self
                .reader
                .process_lines(&file, |line| capture_version(&re, line))
                .inspect_err(|e| warn!("Skipping {}: {}", file.display(), e));

            if let Ok(Some(version)) = found {
                debug!("Found version {} in {}", version, file.display());
                return Ok(Some(version));
            }
        }

        Ok(None)
    }
}

impl VersionMatcher for PyprojectMatcher {
    /// `patterns` are ignored for `pyproject.toml`
    fn extract(
        &self,
        path: &Path,
        _patterns: &[String],
    ) -> Result<Option<VersionMatch>, ExtractError> {
        if let Some(version) = self.project_section_version(path)? {
            return Ok(Some(VersionMatch::new(version, PROJECT_VERSION_PATTERN)));
        }

        Ok(self
            .version_file_version(path)?
            .map(|version| VersionMatch::new(version, VERSION_FILE_MARKER)))
    }
}
