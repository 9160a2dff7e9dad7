//! Extraction orchestration
//!
//! Walks project descriptors in order and returns the first version found.
//! For each candidate file the static version is matched first; when the
//! descriptor supports dynamic versioning and the file carries one of its
//! indicators, the latest Git tag takes precedence over the static value.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{Config, GIT_FALLBACK_MARKER, ProjectDescriptor};
use crate::fs::{FilePattern, FileReader, ProjectFileFinder};
use crate::git::{GitRunner, GitTagResolver, GitTagResult, SystemGit};
use crate::version::cache::PatternCache;
use crate::version::dynamic::DynamicVersionDetector;
use crate::version::error::ExtractError;
use crate::version::matcher::{Matchers, VersionMatch};

/// Where an extracted version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionSource {
    /// Read from the project file
    Static,
    /// Latest Git tag, used because the project file only holds a placeholder
    DynamicGitTag,
}

impl VersionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionSource::Static => "static",
            VersionSource::DynamicGitTag => "dynamic-git-tag",
        }
    }
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub version: String,
    pub project_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    pub file: PathBuf,
    /// Pattern source or marker that produced the version
    pub matched_by: String,
    pub success: bool,
    pub version_source: VersionSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_tag: Option<String>,
}

impl ExtractionResult {
    fn from_match(project: &ProjectDescriptor, file: PathBuf, found: VersionMatch) -> Self {
        Self {
            version: found.version,
            project_type: project.project_type.clone(),
            subtype: project.subtype.clone(),
            file,
            matched_by: found.matched_by,
            success: true,
            version_source: VersionSource::Static,
            git_tag: None,
        }
    }

    fn from_git_tag(
        project: &ProjectDescriptor,
        file: PathBuf,
        tag: GitTagResult,
        matched_by: &str,
    ) -> Self {
        Self {
            version: tag.version,
            project_type: project.project_type.clone(),
            subtype: project.subtype.clone(),
            file,
            matched_by: matched_by.to_string(),
            success: true,
            version_source: VersionSource::DynamicGitTag,
            git_tag: Some(tag.tag),
        }
    }
}

pub struct VersionExtractor {
    projects: Vec<ProjectDescriptor>,
    dynamic_fallback: bool,
    finder: ProjectFileFinder,
    cache: Arc<PatternCache>,
    reader: FileReader,
    git: Arc<dyn GitRunner>,
}

impl VersionExtractor {
    /// Extractor over `projects`, searched in the given order
    pub fn new(projects: Vec<ProjectDescriptor>) -> Self {
        Self {
            projects,
            dynamic_fallback: true,
            finder: ProjectFileFinder::default(),
            cache: Arc::new(PatternCache::new()),
            reader: FileReader::default(),
            git: Arc::new(SystemGit),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.projects.clone())
    }

    pub fn with_dynamic_fallback(mut self, enabled: bool) -> Self {
        self.dynamic_fallback = enabled;
        self
    }

    pub fn with_skip_directories(mut self, directories: Vec<String>) -> Self {
        self.finder = ProjectFileFinder::new(directories);
        self
    }

    pub fn with_pattern_cache(mut self, cache: Arc<PatternCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_git_runner(mut self, git: Arc<dyn GitRunner>) -> Self {
        self.git = git;
        self
    }

    pub fn with_file_reader(mut self, reader: FileReader) -> Self {
        self.reader = reader;
        self
    }

    pub fn skip_directories(&self) -> &[String] {
        self.finder.skip_directories()
    }

    pub fn dynamic_fallback(&self) -> bool {
        self.dynamic_fallback
    }

    /// Extract a version from a project directory or a single project file
    pub fn extract(&self, path: &Path) -> Result<ExtractionResult, ExtractError> {
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExtractError::PathNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(ExtractError::io(path, e)),
        };

        if metadata.is_dir() {
            self.extract_from_directory(path)
        } else {
            self.extract_from_file(path)
        }
    }

    /// Uses the first descriptor whose file pattern matches the file name.
    /// Dynamic versioning is not considered.
    fn extract_from_file(&self, path: &Path) -> Result<ExtractionResult, ExtractError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let project = self
            .projects
            .iter()
            .find(|project| {
                FilePattern::parse(&project.file)
                    .inspect_err(|e| warn!("Skipping {}: {}", project.label(), e))
                    .is_ok_and(|pattern| pattern.matches(&file_name))
            })
            .ok_or_else(|| ExtractError::UnsupportedFileType(file_name.clone()))?;

        debug!("Extracting {} as {}", path.display(), project.label());

        let matchers = self.matchers();
        match matchers.extract(path, &project.regex)? {
            Some(found) => Ok(ExtractionResult::from_match(project, path.to_path_buf(), found)),
            None => Err(ExtractError::NoValidVersion(path.to_path_buf())),
        }
    }

    fn extract_from_directory(&self, root: &Path) -> Result<ExtractionResult, ExtractError> {
        let matchers = self.matchers();
        let detector = DynamicVersionDetector::new(Arc::clone(&self.cache), self.reader);

        for project in &self.projects {
            match self.try_project(root, project, &matchers, &detector) {
                Ok(Some(result)) => return Ok(result),
                Ok(None) => {}
                Err(e) => warn!("Failed to extract from {}: {}", project.label(), e),
            }
        }

        Err(ExtractError::NoVersionFound)
    }

    fn try_project(
        &self,
        root: &Path,
        project: &ProjectDescriptor,
        matchers: &Matchers,
        detector: &DynamicVersionDetector,
    ) -> Result<Option<ExtractionResult>, ExtractError> {
        let uses_dynamic = self.dynamic_fallback && project.supports_dynamic_versioning;

        if project.regex.is_empty() {
            if !uses_dynamic {
                debug!("Skipping {}: no patterns and no Git fallback", project.label());
                return Ok(None);
            }

            let Some(file) = self.finder.find(root, &project.file)?.into_iter().next() else {
                return Ok(None);
            };
            return Ok(self
                .git_fallback(root)
                .inspect_err(|e| debug!("Git fallback failed in {}: {}", root.display(), e))
                .ok()
                .map(|tag| ExtractionResult::from_git_tag(project, file, tag, GIT_FALLBACK_MARKER)));
        }

        for file in self.finder.find(root, &project.file)? {
            let found = match matchers.extract(&file, &project.regex) {
                Ok(found) => found,
                Err(e) => {
                    warn!("Error processing {}: {}", file.display(), e);
                    continue;
                }
            };

            if uses_dynamic && !project.dynamic_version_indicators.is_empty() {
                let is_dynamic = detector
                    .detect(&file, &project.dynamic_version_indicators)
                    .inspect_err(|e| debug!("Dynamic versioning check failed for {}: {}", file.display(), e))
                    .unwrap_or(false);

                if is_dynamic {
                    debug!("{} uses dynamic versioning", file.display());
                    match self.git_fallback(root) {
                        Ok(tag) => {
                            let marker = VersionSource::DynamicGitTag.as_str();
                            return Ok(Some(ExtractionResult::from_git_tag(project, file, tag, marker)));
                        }
                        Err(e) => debug!("Git fallback failed in {}: {}", root.display(), e),
                    }
                }
            }

            if let Some(found) = found {
                return Ok(Some(ExtractionResult::from_match(project, file, found)));
            }
        }

        Ok(None)
    }

    /// Fetch tags, then resolve the latest version tag in `root`
    fn git_fallback(&self, root: &Path) -> Result<GitTagResult, ExtractError> {
        let resolver = GitTagResolver::new(Arc::clone(&self.git));
        resolver.fetch_tags(root);

        Ok(resolver.resolve_latest_version_tag(root)?)
    }

    fn matchers(&self) -> Matchers {
        Matchers::new(Arc::clone(&self.cache), self.reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DynamicVersionIndicator;
    use crate::git::GitError;
    use crate::git::runner::MockGitRunner;
    use std::fs;
    use tempfile::TempDir;

    fn project(project_type: &str, file: &str, regex: &[&str]) -> ProjectDescriptor {
        ProjectDescriptor {
            project_type: project_type.to_string(),
            file: file.to_string(),
            regex: regex.iter().map(|r| r.to_string()).collect(),
            samples: vec!["https://github.com/example/repo".to_string()],
            ..Default::default()
        }
    }

    fn npm() -> ProjectDescriptor {
        ProjectDescriptor {
            supports_dynamic_versioning: true,
            dynamic_version_indicators: vec![DynamicVersionIndicator {
                field: Some("version".to_string()),
                contains: vec!["0.0.0-development".to_string()],
                ..Default::default()
            }],
            ..project("JavaScript", "package.json", &[r#""version":\s*"([^"]+)""#])
        }
    }

    /// Git answering every command as a repository tagged `tag`
    fn tagged_git(tag: &'static str) -> Arc<dyn GitRunner> {
        let mut runner = MockGitRunner::new();
        runner.expect_run().returning(move |_, args| match args {
            ["describe", ..] => Ok(format!("{tag}\n")),
            _ => Ok(String::new()),
        });
        Arc::new(runner)
    }

    /// Git that must never be invoked
    fn unused_git() -> Arc<dyn GitRunner> {
        let mut runner = MockGitRunner::new();
        runner.expect_run().times(0);
        Arc::new(runner)
    }

    /// Git for a directory that is not a repository
    fn no_repo_git() -> Arc<dyn GitRunner> {
        let mut runner = MockGitRunner::new();
        runner.expect_run().returning(|_, args| {
            Err(GitError::CommandFailed {
                args: args.join(" "),
                stderr: "fatal: not a git repository".to_string(),
            })
        });
        Arc::new(runner)
    }

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn extract_returns_static_version() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "package.json", "{\n  \"version\": \"1.2.3\"\n}\n");

        let result = VersionExtractor::new(vec![npm()])
            .with_git_runner(unused_git())
            .extract(dir.path())
            .unwrap();

        assert_eq!(
            result,
            ExtractionResult {
                version: "1.2.3".to_string(),
                project_type: "JavaScript".to_string(),
                subtype: None,
                file,
                matched_by: r#""version":\s*"([^"]+)""#.to_string(),
                success: true,
                version_source: VersionSource::Static,
                git_tag: None,
            }
        );
    }

    #[test]
    fn extract_prefers_git_tag_for_dynamic_version() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", "{\n  \"version\": \"0.0.0-development\"\n}\n");

        let result = VersionExtractor::new(vec![npm()])
            .with_git_runner(tagged_git("v2.1.4"))
            .extract(dir.path())
            .unwrap();

        assert_eq!(result.version, "2.1.4");
        assert_eq!(result.version_source, VersionSource::DynamicGitTag);
        assert_eq!(result.matched_by, "dynamic-git-tag");
        assert_eq!(result.git_tag.as_deref(), Some("v2.1.4"));
    }

    #[test]
    fn extract_keeps_static_placeholder_when_fallback_disabled() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", "{\n  \"version\": \"0.0.0-development\"\n}\n");

        let result = VersionExtractor::new(vec![npm()])
            .with_dynamic_fallback(false)
            .with_git_runner(unused_git())
            .extract(dir.path())
            .unwrap();

        assert_eq!(result.version, "0.0.0-development");
        assert_eq!(result.version_source, VersionSource::Static);
    }

    #[test]
    fn extract_keeps_static_placeholder_outside_git_repository() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", "{\n  \"version\": \"0.0.0-development\"\n}\n");

        let result = VersionExtractor::new(vec![npm()])
            .with_git_runner(no_repo_git())
            .extract(dir.path())
            .unwrap();

        assert_eq!(result.version, "0.0.0-development");
        assert_eq!(result.version_source, VersionSource::Static);
    }

    #[test]
    fn git_fallback_surfaces_resolver_error() {
        let dir = TempDir::new().unwrap();
        let extractor = VersionExtractor::new(vec![npm()]).with_git_runner(no_repo_git());

        let result = extractor.git_fallback(dir.path());

        assert!(matches!(
            result,
            Err(ExtractError::Git(GitError::NotAGitRepository(ref path))) if path == dir.path()
        ));
    }

    #[test]
    fn extract_uses_git_for_descriptor_without_patterns() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "go.mod", "module github.com/example/tool\n");
        let go = ProjectDescriptor {
            supports_dynamic_versioning: true,
            ..project("Go", "go.mod", &[])
        };

        let result = VersionExtractor::new(vec![go])
            .with_git_runner(tagged_git("v0.9.0"))
            .extract(dir.path())
            .unwrap();

        assert_eq!(result.version, "0.9.0");
        assert_eq!(result.file, file);
        assert_eq!(result.matched_by, GIT_FALLBACK_MARKER);
        assert_eq!(result.version_source, VersionSource::DynamicGitTag);
    }

    #[test]
    fn extract_skips_descriptor_without_patterns_or_dynamic_support() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "go.mod", "module github.com/example/tool\n");

        let result = VersionExtractor::new(vec![project("Go", "go.mod", &[])])
            .with_git_runner(unused_git())
            .extract(dir.path());

        assert!(matches!(result, Err(ExtractError::NoVersionFound)));
    }

    #[test]
    fn extract_follows_descriptor_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", "{\"version\": \"1.0.0\"}\n");
        write(dir.path(), "Cargo.toml", "[package]\nversion = \"2.0.0\"\n");
        let cargo = project("Rust", "Cargo.toml", &[r#"^version\s*=\s*"([^"]+)""#]);

        let result = VersionExtractor::new(vec![cargo, npm()])
            .with_git_runner(unused_git())
            .extract(dir.path())
            .unwrap();

        assert_eq!(result.project_type, "Rust");
        assert_eq!(result.version, "2.0.0");
    }

    #[test]
    fn extract_continues_after_unreadable_descriptor() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", "{\"version\": \"1.0.0\"}\n");
        let broken = project("Broken", "[*.toml", &["(.*)"]);

        let result = VersionExtractor::new(vec![broken, npm()])
            .with_git_runner(unused_git())
            .extract(dir.path())
            .unwrap();

        assert_eq!(result.project_type, "JavaScript");
    }

    #[test]
    fn extract_single_file_uses_matching_descriptor_only() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "package.json", "{\"version\": \"0.0.0-development\"}\n");

        let result = VersionExtractor::new(vec![npm()])
            .with_git_runner(unused_git())
            .extract(&file)
            .unwrap();

        assert_eq!(result.version, "0.0.0-development");
        assert_eq!(result.version_source, VersionSource::Static);
        assert_eq!(result.file, file);
    }

    #[test]
    fn extract_single_file_rejects_unsupported_type() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "README.md", "# demo\n");

        let result = VersionExtractor::new(vec![npm()]).extract(&file);

        assert!(matches!(
            result,
            Err(ExtractError::UnsupportedFileType(ref name)) if name == "README.md"
        ));
    }

    #[test]
    fn extract_single_file_without_version_returns_no_valid_version() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "package.json", "{\"name\": \"demo\"}\n");

        let result = VersionExtractor::new(vec![npm()]).extract(&file);

        assert!(matches!(result, Err(ExtractError::NoValidVersion(_))));
    }

    #[test]
    fn extract_returns_path_not_found() {
        let result = VersionExtractor::new(vec![npm()]).extract(Path::new("/nonexistent/project"));

        assert!(matches!(result, Err(ExtractError::PathNotFound(_))));
    }

    #[test]
    fn skip_directories_defaults_and_overrides() {
        let extractor = VersionExtractor::new(vec![npm()]);
        assert_eq!(
            extractor.skip_directories(),
            ["node_modules", "vendor", "target", "build", "dist"]
        );

        let extractor = extractor.with_skip_directories(vec!["out".to_string()]);
        assert_eq!(extractor.skip_directories(), ["out"]);
    }

    #[test]
    fn extractors_share_injected_pattern_cache() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", "{\"version\": \"1.0.0\"}\n");
        let cache = Arc::new(PatternCache::new());

        for _ in 0..2 {
            VersionExtractor::new(vec![npm()])
                .with_dynamic_fallback(false)
                .with_pattern_cache(Arc::clone(&cache))
                .extract(dir.path())
                .unwrap();
        }

        assert_eq!(cache.len(), 1);
    }
}
