//! Size-bounded file access
//!
//! Every read is checked against a hard size ceiling first so that a stray
//! multi-gigabyte file in a project tree cannot exhaust memory. Content is
//! decoded lossily: version metadata is ASCII in practice and a stray invalid
//! byte should not hide an otherwise readable version line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::MAX_FILE_SIZE;
use crate::version::error::ExtractError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileReader {
    max_size: u64,
}

impl Default for FileReader {
    fn default() -> Self {
        Self::new(MAX_FILE_SIZE)
    }
}

impl FileReader {
    pub fn new(max_size: u64) -> Self {
        Self { max_size }
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    pub fn file_size(&self, path: &Path) -> Result<u64, ExtractError> {
        std::fs::metadata(path)
            .map(|metadata| metadata.len())
            .map_err(|e| ExtractError::io(path, e))
    }

    /// Check the ceiling without reading the file; unreadable files are not within it
    pub fn is_within_size_limit(&self, path: &Path) -> bool {
        self.file_size(path)
            .is_ok_and(|size| size <= self.max_size)
    }

    pub fn validate_size(&self, path: &Path) -> Result<(), ExtractError> {
        let size = self.file_size(path)?;
        if size > self.max_size {
            return Err(ExtractError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.max_size,
            });
        }
        Ok(())
    }

    /// Read the whole file.
    ///
    /// With `normalize_line_endings`, `\r\n` and lone `\r` become `\n` so that
    /// whole-content patterns behave the same for every platform's files.
    pub fn read_content(
        &self,
        path: &Path,
        normalize_line_endings: bool,
    ) -> Result<String, ExtractError> {
        self.validate_size(path)?;

        let bytes = std::fs::read(path).map_err(|e| ExtractError::io(path, e))?;
        let content = String::from_utf8_lossy(&bytes);

        if normalize_line_endings {
            Ok(content.replace("\r\n", "\n").replace('\r', "\n"))
        } else {
            Ok(content.into_owned())
        }
    }

    /// Stream the file line by line until `on_line` returns `Some`.
    ///
    /// Returns `Ok(None)` when no line produced a value. Line terminators
    /// (`\n` or `\r\n`) are not passed to `on_line`.
    pub fn process_lines<T, F>(&self, path: &Path, mut on_line: F) -> Result<Option<T>, ExtractError>
    where
        F: FnMut(&str) -> Option<T>,
    {
        self.validate_size(path)?;

        let file = File::open(path).map_err(|e| ExtractError::io(path, e))?;
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| ExtractError::io(path, e))?;
            if read == 0 {
                return Ok(None);
            }

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches('\n').trim_end_matches('\r');
            if let Some(value) = on_line(line) {
                return Ok(Some(value));
            }
        }
    }
}
