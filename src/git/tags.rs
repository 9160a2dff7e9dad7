//! Latest version tag lookup
//!
//! Strategies are tried in order until one yields a tag whose cleaned form is a
//! valid version:
//!
//! 1. `git describe --tags --abbrev=0 --match=v*`
//! 2. `git describe --tags --abbrev=0 --match=*.*.*`
//! 3. `git describe --tags --abbrev=0 --match=release-*`
//! 4. `git describe --tags --abbrev=0`
//! 5. `git tag --list --sort=-version:refname`, first valid entry

use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use crate::git::{GitError, GitRunner, GitTagResult, SystemGit};

const TAG_PREFIXES: &[&str] = &["release-", "rel-", "release/", "rel/", "version-", "ver-", "v-"];

const DESCRIBE_STRATEGIES: &[&[&str]] = &[
    &["describe", "--tags", "--abbrev=0", "--match=v*"],
    &["describe", "--tags", "--abbrev=0", "--match=*.*.*"],
    &["describe", "--tags", "--abbrev=0", "--match=release-*"],
    &["describe", "--tags", "--abbrev=0"],
];

static TAG_VERSION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^[0-9]+\.[0-9]+\.[0-9]+(?:[-+][0-9A-Za-z\-\.]+)?$",
        r"^[0-9]+\.[0-9]+(?:\.[0-9]+)?(?:[-+][0-9A-Za-z\-\.]+)?$",
        r"^[0-9]{4}\.[0-9]{2}(?:\.[0-9]{2})?$",
        r"^[0-9]+\.[0-9]+(?:\.[0-9]+)?-SNAPSHOT$",
        r"^[0-9]+\.[0-9]+(?:\.[0-9]+)?-beta\.[0-9]+$",
        r"^[0-9]+\.[0-9]+(?:\.[0-9]+)?-alpha\.[0-9]+$",
        r"^[0-9]+\.[0-9]+(?:\.[0-9]+)?-rc\.[0-9]+$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Strip the decorations commonly found on release tags.
///
/// One leading `v`/`V` goes first, then the first matching release prefix
/// (case-insensitive). `version-1.2.3` therefore loses its `v` before the
/// prefix check and comes out as `ersion-1.2.3`, which then fails validation.
pub fn clean_tag(tag: &str) -> String {
    let tag = tag.trim();
    let tag = tag
        .strip_prefix('v')
        .or_else(|| tag.strip_prefix('V'))
        .unwrap_or(tag);

    let tag = TAG_PREFIXES
        .iter()
        .find(|prefix| {
            tag.get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
        .map_or(tag, |prefix| &tag[prefix.len()..]);

    tag.trim().to_string()
}

/// Whether a cleaned tag looks like a release version
pub fn is_valid_tag_version(version: &str) -> bool {
    !version.is_empty() && TAG_VERSION_PATTERNS.iter().any(|re| re.is_match(version))
}

pub struct GitTagResolver {
    runner: Arc<dyn GitRunner>,
}

impl Default for GitTagResolver {
    fn default() -> Self {
        Self::new(Arc::new(SystemGit))
    }
}

impl GitTagResolver {
    pub fn new(runner: Arc<dyn GitRunner>) -> Self {
        Self { runner }
    }

    /// A `.git` entry exists in `dir`, or git itself recognizes it as a work tree
    pub fn is_git_repository(&self, dir: &Path) -> bool {
        dir.join(".git").exists() || self.runner.run(dir, &["rev-parse", "--git-dir"]).is_ok()
    }

    /// Refresh tags from the default remote. Shallow CI checkouts often lack them;
    /// offline or remote-less repositories just keep the tags they have.
    pub fn fetch_tags(&self, dir: &Path) {
        if !self.is_git_repository(dir) {
            return;
        }

        if let Err(e) = self.runner.run(dir, &["fetch", "--tags", "--quiet"]) {
            debug!("Ignoring tag fetch failure in {}: {}", dir.display(), e);
        }
    }

    pub fn resolve_latest_version_tag(&self, dir: &Path) -> Result<GitTagResult, GitError> {
        if !self.is_git_repository(dir) {
            return Err(GitError::NotAGitRepository(dir.to_path_buf()));
        }

        let (version, tag) = DESCRIBE_STRATEGIES
            .iter()
            .find_map(|args| self.describe(dir, args))
            .or_else(|| self.latest_listed(dir))
            .ok_or(GitError::NoVersionTagsFound)?;

        debug!("Resolved tag {} as version {}", tag, version);

        Ok(GitTagResult {
            version,
            tag,
            success: true,
            is_git_repo: true,
        })
    }

    fn describe(&self, dir: &Path, args: &[&'static str]) -> Option<(String, String)> {
        let output = self
            .runner
            .run(dir, args)
            .inspect_err(|e| debug!("git {} failed: {}", args.join(" "), e))
            .ok()?;

        let tag = output.trim();
        let version = clean_tag(tag);
        is_valid_tag_version(&version).then(|| (version, tag.to_string()))
    }

    fn latest_listed(&self, dir: &Path) -> Option<(String, String)> {
        let output = self
            .runner
            .run(dir, &["tag", "--list", "--sort=-version:refname"])
            .inspect_err(|e| debug!("Tag listing failed: {}", e))
            .ok()?;

        output
            .lines()
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .find_map(|tag| {
                let version = clean_tag(tag);
                is_valid_tag_version(&version).then(|| (version, tag.to_string()))
            })
    }
}
