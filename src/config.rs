use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

// =============================================================================
// Extraction limits
// =============================================================================

/// Maximum size of any file read during extraction (10 MiB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum number of `__version__.py` files inspected for a pyproject.toml
pub const MAX_VERSION_FILES: usize = 10;

/// Directory names never descended into while searching for project files
pub const DEFAULT_SKIP_DIRECTORIES: &[&str] = &["node_modules", "vendor", "target", "build", "dist"];

/// `matched_by` value for descriptors without patterns that resolve through Git tags
pub const GIT_FALLBACK_MARKER: &str = "git-fallback";

/// `matched_by` value for pyproject.toml versions found in a `__version__.py` file
pub const VERSION_FILE_MARKER: &str = "__version__.py";

/// Bundled project type definitions
const DEFAULT_PATTERNS: &str = include_str!("../configs/default-patterns.yaml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("No projects defined in configuration")]
    NoProjects,

    #[error("No valid projects after validation")]
    NoValidProjects,
}

/// A rule deciding whether a file uses dynamic versioning.
///
/// Either "this section exists" (`path` + `exists`) or "this field holds a value
/// containing one of these substrings" (`field` + `contains`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DynamicVersionIndicator {
    /// Section token such as `[tool.setuptools_scm]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Field name such as `dynamic` or `scripts`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub exists: bool,
}

/// One project type: which file to look for and how to read its version
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectDescriptor {
    #[serde(rename = "type")]
    pub project_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// File name or glob (`*.csproj`)
    pub file: String,
    /// Version patterns; group 1 of the first match holds the version
    pub regex: Vec<String>,
    pub samples: Vec<String>,
    /// Lower is searched first
    pub priority: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub supports_dynamic_versioning: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dynamic_version_indicators: Vec<DynamicVersionIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_strategy: Option<String>,
}

impl ProjectDescriptor {
    /// `Type (Subtype)` label used in listings
    pub fn label(&self) -> String {
        match &self.subtype {
            Some(subtype) if !subtype.is_empty() => format!("{} ({})", self.project_type, subtype),
            _ => self.project_type.clone(),
        }
    }
}

/// Validated project descriptors, sorted by ascending priority
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    pub projects: Vec<ProjectDescriptor>,
}

impl Config {
    /// Load and validate a YAML configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// The project types bundled with the binary
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml_str(DEFAULT_PATTERNS)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: Config = serde_yaml::from_str(content)?;
        Self::from_projects(raw.projects)
    }

    /// Validate descriptors and order them by priority.
    ///
    /// Incomplete and duplicate descriptors are dropped with a warning.
    pub fn from_projects(projects: Vec<ProjectDescriptor>) -> Result<Self, ConfigError> {
        if projects.is_empty() {
            return Err(ConfigError::NoProjects);
        }

        let mut seen = HashSet::new();
        let mut valid = Vec::with_capacity(projects.len());

        for (index, mut project) in projects.into_iter().enumerate() {
            if project.project_type.is_empty() {
                warn!("Project at index {} missing type, skipping", index);
                continue;
            }
            if project.file.is_empty() {
                warn!("Project {} missing file pattern, skipping", project.project_type);
                continue;
            }
            if project.regex.is_empty() && !project.supports_dynamic_versioning {
                warn!("Project {} missing regex patterns, skipping", project.project_type);
                continue;
            }
            if project.samples.is_empty() {
                warn!("Project {} missing sample URLs, skipping", project.project_type);
                continue;
            }

            let key = (
                project.project_type.clone(),
                project.subtype.clone().unwrap_or_default(),
                project.file.clone(),
            );
            if !seen.insert(key) {
                warn!(
                    "Duplicate project config for {} ({}), skipping",
                    project.label(),
                    project.file
                );
                continue;
            }

            if project.priority == 0 {
                project.priority = index as u32 + 1;
            }

            valid.push(project);
        }

        if valid.is_empty() {
            return Err(ConfigError::NoValidProjects);
        }

        // Stable: equal priorities keep their file order
        valid.sort_by_key(|project| project.priority);
        debug!("Loaded {} project configurations", valid.len());

        Ok(Self { projects: valid })
    }

    /// Find a descriptor by type, optionally narrowed by subtype
    pub fn project_by_type(&self, project_type: &str, subtype: Option<&str>) -> Option<&ProjectDescriptor> {
        self.projects.iter().find(|project| {
            project.project_type == project_type
                && subtype.is_none_or(|wanted| project.subtype.as_deref() == Some(wanted))
        })
    }

    /// Sorted, deduplicated `Type (Subtype)` labels
    pub fn supported_types(&self) -> Vec<String> {
        self.projects
            .iter()
            .map(ProjectDescriptor::label)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
