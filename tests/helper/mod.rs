//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use version_extract::config::ProjectDescriptor;

/// Write `content` to `root/relative`, creating parent directories
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

pub fn descriptor(project_type: &str, file: &str, regex: &[&str]) -> ProjectDescriptor {
    ProjectDescriptor {
        project_type: project_type.to_string(),
        file: file.to_string(),
        regex: regex.iter().map(|r| r.to_string()).collect(),
        samples: vec!["https://github.com/example/repo".to_string()],
        ..Default::default()
    }
}

pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

/// Run git in `dir` with a fixed identity and signing disabled
pub fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args([
            "-c",
            "user.email=test@example.com",
            "-c",
            "user.name=Test",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "tag.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap();
    assert!(status.success(), "git {} failed", args.join(" "));
}

/// Initialize a repository with one commit per tag, tagged in order
pub fn init_repo(dir: &Path, tags: &[&str]) {
    git(dir, &["init", "--quiet"]);
    git(dir, &["add", "--all"]);
    for tag in tags {
        git(dir, &["commit", "--quiet", "--allow-empty", "-m", tag]);
        git(dir, &["tag", tag]);
    }
}
