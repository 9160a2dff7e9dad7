//! Locating project files under a search root

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::config::DEFAULT_SKIP_DIRECTORIES;
use crate::version::error::ExtractError;

/// A descriptor's `file` entry: an exact file name or a glob such as `*.csproj`
#[derive(Debug, Clone)]
pub enum FilePattern {
    Exact(String),
    Glob(Pattern),
}

impl FilePattern {
    pub fn parse(pattern: &str) -> Result<Self, ExtractError> {
        if !pattern.contains('*') {
            return Ok(Self::Exact(pattern.to_string()));
        }

        Pattern::new(pattern)
            .map(Self::Glob)
            .map_err(|source| ExtractError::InvalidGlob {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            Self::Exact(name) => name == file_name,
            Self::Glob(pattern) => pattern.matches(file_name),
        }
    }
}

/// Recursive search that never descends into hidden or skip-listed directories
#[derive(Debug, Clone)]
pub struct ProjectFileFinder {
    skip_directories: Vec<String>,
}

impl Default for ProjectFileFinder {
    fn default() -> Self {
        Self::new(DEFAULT_SKIP_DIRECTORIES.iter().map(|dir| dir.to_string()).collect())
    }
}

impl ProjectFileFinder {
    pub fn new(skip_directories: Vec<String>) -> Self {
        Self { skip_directories }
    }

    pub fn skip_directories(&self) -> &[String] {
        &self.skip_directories
    }

    /// Find files under `root` whose name matches `pattern`.
    ///
    /// A match directly in `root` comes first; the rest follow in walk order
    /// (entries sorted by file name). Each path appears once.
    pub fn find(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>, ExtractError> {
        let file_pattern = FilePattern::parse(pattern)?;
        let mut files = self.direct_matches(root, pattern, &file_pattern)?;

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded_dir(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let matched = entry
                .file_name()
                .to_str()
                .is_some_and(|name| file_pattern.matches(name));
            if matched {
                files.push(entry.into_path());
            }
        }

        let mut seen = HashSet::new();
        files.retain(|path| seen.insert(path.clone()));

        debug!("Found {} file(s) matching {} under {}", files.len(), pattern, root.display());
        Ok(files)
    }

    fn direct_matches(
        &self,
        root: &Path,
        pattern: &str,
        file_pattern: &FilePattern,
    ) -> Result<Vec<PathBuf>, ExtractError> {
        match file_pattern {
            FilePattern::Exact(name) => {
                let path = root.join(name);
                Ok(if path.is_file() { vec![path] } else { Vec::new() })
            }
            FilePattern::Glob(_) => {
                let root = Pattern::escape(&root.to_string_lossy());
                let full = format!("{}/{}", root.trim_end_matches('/'), pattern);
                let paths = glob::glob(&full).map_err(|source| ExtractError::InvalidGlob {
                    pattern: pattern.to_string(),
                    source,
                })?;

                Ok(paths.filter_map(Result::ok).filter(|path| path.is_file()).collect())
            }
        }
    }

    /// The search root itself is never excluded, even when its name starts with a dot
    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }

        let Some(name) = entry.file_name().to_str() else {
            return false;
        };

        name.starts_with('.') || self.skip_directories.iter().any(|skip| skip == name)
    }
}
