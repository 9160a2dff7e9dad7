use std::path::PathBuf;

use thiserror::Error;

use crate::git::GitError;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("File size {size} exceeds limit of {limit} bytes: {}", path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("File '{0}' is of an unsupported type")]
    UnsupportedFileType(String),

    #[error("No valid version found in file: {}", .0.display())]
    NoValidVersion(PathBuf),

    #[error("No version found in any supported project files")]
    NoVersionFound,

    #[error("Path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Git(#[from] GitError),
}

impl ExtractError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
