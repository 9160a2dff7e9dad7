//! Generic regex matcher
//!
//! Patterns are applied one line at a time unless one of them looks like it
//! spans lines (XML elements, `{ ... version ... }` objects, `[\s\S]` classes),
//! in which case the whole file is matched at once.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, warn};

use crate::fs::FileReader;
use crate::version::cache::PatternCache;
use crate::version::error::ExtractError;
use crate::version::matcher::{VersionMatch, VersionMatcher, capture_version};

/// Syntax in a pattern's source that suggests it needs more than one line
static MULTI_LINE_INDICATORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\.package\(.*version",
        r"<[^>]*>.*<[^>]*>",
        r"\([^)]*version[^)]*\)",
        r"\{[^}]*version[^}]*\}",
    ]
    .iter()
    .map(|indicator| Regex::new(indicator).unwrap())
    .collect()
});

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Whether a pattern source needs whole-content matching
pub fn is_multi_line_pattern(source: &str) -> bool {
    source.contains(r"[\s\S]") || MULTI_LINE_INDICATORS.iter().any(|re| re.is_match(source))
}

pub struct PatternMatcher {
    cache: Arc<PatternCache>,
    reader: FileReader,
}

impl PatternMatcher {
    pub fn new(cache: Arc<PatternCache>, reader: FileReader) -> Self {
        Self { cache, reader }
    }

    fn compiled(&self, source: &str) -> Option<Regex> {
        self.cache
            .get(source)
            .inspect_err(|e| warn!("Skipping pattern: {}", e))
            .ok()
    }

    /// Each pattern is tried against whitespace-collapsed content first, then the
    /// content as read
    fn extract_whole_content(
        &self,
        path: &Path,
        patterns: &[String],
    ) -> Result<Option<VersionMatch>, ExtractError> {
        let content = self.reader.read_content(path, true)?;
        let collapsed = WHITESPACE_RUN.replace_all(&content, " ");

        for source in patterns {
            let Some(re) = self.compiled(source) else {
                continue;
            };

            let version = capture_version(&re, &collapsed).or_else(|| capture_version(&re, &content));
            if let Some(version) = version {
                return Ok(Some(VersionMatch::new(version, source.as_str())));
            }
        }

        Ok(None)
    }

    fn extract_line_by_line(
        &self,
        path: &Path,
        patterns: &[String],
    ) -> Result<Option<VersionMatch>, ExtractError> {
        for source in patterns {
            let Some(re) = self.compiled(source) else {
                continue;
            };

            if let Some(version) = self
                .reader
                .process_lines(path, |line| capture_version(&re, line))?
            {
                return Ok(Some(VersionMatch::new(version, source.as_str())));
            }
        }

        Ok(None)
    }
}

impl VersionMatcher for PatternMatcher {
    fn extract(
        &self,
        path: &Path,
        patterns: &[String],
    ) -> Result<Option<VersionMatch>, ExtractError> {
        if patterns.iter().any(|source| is_multi_line_pattern(source)) {
            debug!("Matching {} against whole content", path.display());
            self.extract_whole_content(path, patterns)
        } else {
            self.extract_line_by_line(path, patterns)
        }
    }
}
