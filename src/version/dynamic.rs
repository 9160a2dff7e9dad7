//! Detection of build-time computed versions
//!
//! Projects using semantic-release, setuptools_scm, Maven CI-friendly versions
//! and similar tools keep a placeholder (or nothing) in their metadata file.
//! Indicators from the project descriptor describe what such a file looks like;
//! a file matching any of them is reported as dynamically versioned.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::DynamicVersionIndicator;
use crate::fs::FileReader;
use crate::version::cache::PatternCache;
use crate::version::error::ExtractError;

const FIELD: &str = "{field}";
const VALUE: &str = "{value}";

/// One way a field can hold a value
struct ValueShape {
    name: &'static str,
    template: &'static str,
    /// Shape applies only to this exact field name
    field: Option<&'static str>,
}

/// Tried in order for every `(field, value)` pair; `{field}` and `{value}` are
/// substituted regex-escaped
const VALUE_SHAPES: &[ValueShape] = &[
    // dynamic = ["version"]
    ValueShape {
        name: "array-membership",
        template: r#"(?m){field}\s*=\s*\[.*?["']{value}["'].*?\]"#,
        field: None,
    },
    // "version": "0.0.0-development"
    ValueShape {
        name: "json-string",
        template: r#"(?m)["']{field}["']\s*:\s*["']{value}["']"#,
        field: None,
    },
    // "scripts": { "release": "semantic-release" }
    ValueShape {
        name: "json-object",
        template: r#"(?m)["']{field}["']\s*:\s*\{[^}]*["']{value}["']"#,
        field: None,
    },
    // version = "0.0.0"
    ValueShape {
        name: "toml-string",
        template: r#"(?m){field}\s*=\s*["']{value}["']"#,
        field: None,
    },
    // build = "scripts/build.rs"
    ValueShape {
        name: "quoted-path",
        template: r#"(?m){field}\s*=\s*["'][^"']*{value}[^"']*["']"#,
        field: None,
    },
    // <version>${revision}</version>
    ValueShape {
        name: "xml-tag",
        template: r"(?m)<{field}[^>]*>.*?{value}.*?</{field}>",
        field: None,
    },
    // module github.com/org/repo
    ValueShape {
        name: "go-module",
        template: r"(?m){field}\s+[^\s]*{value}[^\s]*",
        field: Some("module"),
    },
    // Field and value anywhere on the same line
    ValueShape {
        name: "same-line",
        template: r"(?m)^.*(?:\b{field}\b.*{value}|{value}.*\b{field}\b).*$",
        field: None,
    },
];

impl ValueShape {
    fn applies_to(&self, field: &str) -> bool {
        self.field.is_none_or(|only| only == field)
    }

    fn render(&self, field: &str, value: &str) -> String {
        self.template
            .replace(FIELD, &regex::escape(field))
            .replace(VALUE, &regex::escape(value))
    }
}

pub struct DynamicVersionDetector {
    cache: Arc<PatternCache>,
    reader: FileReader,
}

impl DynamicVersionDetector {
    pub fn new(cache: Arc<PatternCache>, reader: FileReader) -> Self {
        Self { cache, reader }
    }

    /// Whether the file at `path` matches any of `indicators`
    pub fn detect(
        &self,
        path: &Path,
        indicators: &[DynamicVersionIndicator],
    ) -> Result<bool, ExtractError> {
        let content = self.reader.read_content(path, true)?;

        for indicator in indicators {
            if self.section_exists(indicator, &content)? || self.field_contains(indicator, &content)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn section_exists(
        &self,
        indicator: &DynamicVersionIndicator,
        content: &str,
    ) -> Result<bool, ExtractError> {
        let Some(section) = indicator.path.as_deref().filter(|_| indicator.exists) else {
            return Ok(false);
        };
        if section.is_empty() {
            return Ok(false);
        }

        let re = self
            .cache
            .get(&format!(r"(?m)^\s*{}\s*$", regex::escape(section)))?;
        let found = re.is_match(content);
        if found {
            debug!("Dynamic versioning section {} present", section);
        }
        Ok(found)
    }

    fn field_contains(
        &self,
        indicator: &DynamicVersionIndicator,
        content: &str,
    ) -> Result<bool, ExtractError> {
        let Some(field) = indicator.field.as_deref().filter(|field| !field.is_empty()) else {
            return Ok(false);
        };

        for value in &indicator.contains {
            for shape in VALUE_SHAPES.iter().filter(|shape| shape.applies_to(field)) {
                let re = self.cache.get(&shape.render(field, value))?;
                if re.is_match(content) {
                    debug!("Dynamic versioning: {} contains {} ({})", field, value, shape.name);
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }
}
