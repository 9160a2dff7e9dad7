mod helper;

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use helper::{git, git_available, init_repo, write_file};
use version_extract::config::{Config, GIT_FALLBACK_MARKER};
use version_extract::extractor::{VersionExtractor, VersionSource};
use version_extract::git::{GitTagResolver, SystemGit};

const SEMANTIC_RELEASE_PACKAGE: &str = r#"{
  "name": "demo",
  "version": "0.0.0-development",
  "scripts": {
    "release": "semantic-release"
  }
}
"#;

fn extractor() -> VersionExtractor {
    VersionExtractor::from_config(&Config::builtin().unwrap())
}

fn skip_without_git() -> bool {
    if git_available() {
        return false;
    }
    eprintln!("Skipping test: git is not available");
    true
}

#[test]
fn semantic_release_project_resolves_latest_tag() {
    if skip_without_git() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let file = write_file(dir.path(), "package.json", SEMANTIC_RELEASE_PACKAGE);
    init_repo(dir.path(), &["v2.1.4"]);

    let result = extractor().extract(dir.path()).unwrap();

    assert_eq!(result.version, "2.1.4");
    assert_eq!(result.version_source, VersionSource::DynamicGitTag);
    assert_eq!(result.matched_by, "dynamic-git-tag");
    assert_eq!(result.git_tag.as_deref(), Some("v2.1.4"));
    assert_eq!(result.file, file);
}

#[test]
fn semantic_release_project_keeps_placeholder_when_fallback_disabled() {
    if skip_without_git() {
        return;
    }
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "package.json", SEMANTIC_RELEASE_PACKAGE);
    init_repo(dir.path(), &["v2.1.4"]);

    let result = extractor()
        .with_dynamic_fallback(false)
        .extract(dir.path())
        .unwrap();

    assert_eq!(result.version, "0.0.0-development");
    assert_eq!(result.version_source, VersionSource::Static);
}

#[test]
fn go_module_resolves_through_git_fallback() {
    if skip_without_git() {
        return;
    }
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "go.mod", "module github.com/example/tool\n\ngo 1.22\n");
    init_repo(dir.path(), &["release-1.5.0"]);

    let result = extractor().extract(dir.path()).unwrap();

    assert_eq!(result.project_type, "Go");
    assert_eq!(result.version, "1.5.0");
    assert_eq!(result.matched_by, GIT_FALLBACK_MARKER);
    assert_eq!(result.git_tag.as_deref(), Some("release-1.5.0"));
}

#[test]
fn resolver_picks_most_recent_v_tag() {
    if skip_without_git() {
        return;
    }
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "README.md", "demo\n");
    init_repo(dir.path(), &["v1.0.0", "v1.2.0"]);
    git(dir.path(), &["tag", "nightly"]);

    let resolver = GitTagResolver::new(Arc::new(SystemGit));
    let result = resolver.resolve_latest_version_tag(dir.path()).unwrap();

    assert_eq!(result.version, "1.2.0");
    assert_eq!(result.tag, "v1.2.0");
    assert!(result.success);
    assert!(result.is_git_repo);
}

#[test]
fn resolver_fails_in_repository_without_tags() {
    if skip_without_git() {
        return;
    }
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "README.md", "demo\n");
    init_repo(dir.path(), &[]);
    git(dir.path(), &["commit", "--quiet", "--allow-empty", "-m", "initial"]);

    let resolver = GitTagResolver::default();

    assert!(resolver.is_git_repository(dir.path()));
    assert!(resolver.resolve_latest_version_tag(dir.path()).is_err());
    assert!(!resolver.is_git_repository(Path::new("/nonexistent/repo")));
}
