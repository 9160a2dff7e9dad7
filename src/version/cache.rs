//! Compiled regex cache shared by the matchers and the dynamic versioning detector
//!
//! Patterns come from configuration and are few and static, so entries are never
//! evicted. Lookups take the read lock; the write lock is held only to insert a
//! freshly compiled pattern.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use regex::Regex;
use tracing::debug;

use crate::version::error::ExtractError;

#[derive(Debug, Default)]
pub struct PatternCache {
    patterns: RwLock<HashMap<String, Regex>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the compiled form of `source`, compiling and storing it on first use
    pub fn get(&self, source: &str) -> Result<Regex, ExtractError> {
        {
            let patterns = self.patterns.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(regex) = patterns.get(source) {
                return Ok(regex.clone());
            }
        }

        let regex = Regex::new(source).map_err(|e| ExtractError::InvalidPattern {
            pattern: source.to_string(),
            source: e,
        })?;

        let mut patterns = self
            .patterns
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Another thread may have compiled the same source in the meantime
        let regex = patterns
            .entry(source.to_string())
            .or_insert_with(|| {
                debug!("Compiled pattern: {}", source);
                regex
            })
            .clone();

        Ok(regex)
    }

    /// Number of distinct patterns compiled so far
    pub fn len(&self) -> usize {
        self.patterns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn get_compiles_and_caches_pattern() {
        let cache = PatternCache::new();

        let first = cache.get(r#""version":\s*"([^"]+)""#).unwrap();
        let second = cache.get(r#""version":\s*"([^"]+)""#).unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(first.as_str(), second.as_str());
        assert!(second.is_match(r#""version": "1.0.0""#));
    }

    #[test]
    fn get_returns_invalid_pattern_error_without_caching() {
        let cache = PatternCache::new();

        let result = cache.get("version([");

        assert!(matches!(
            result,
            Err(ExtractError::InvalidPattern { ref pattern, .. }) if pattern == "version(["
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn get_is_safe_across_threads() {
        let cache = Arc::new(PatternCache::new());
        let sources = ["a+", "b+", "c+", "a+"];

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                let source = sources[i % sources.len()];
                thread::spawn(move || cache.get(source).map(|re| re.as_str().to_string()))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
        assert_eq!(cache.len(), 3);
    }
}
