//! Shared test utilities for CLI end-to-end tests.
//!
//! This module provides a fixture that lays out a project directory, a glide
//! home with a source cache, a stand-in `glide` executable and local bare
//! repositories acting as mirror projects.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_cached_clone("github.com-x-y");
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::documents;
    pub use super::TestFixture;
}

/// Canned documents the fake glide writes.
#[allow(dead_code)]
pub mod documents {
    /// Manifest produced by `glide init`.
    pub const GENERATED: &str = r#"package: github.com/org/self-project
description: Example service
import:
- package: github.com/x/y
  subpackages:
  - sub
- package: github.com/org/self-project/utils
- package: github.com/gone/away
"#;

    /// Lock produced by `glide install`.
    pub const LOCK: &str = r#"hash: 9c2d
updated: 2017-03-14T10:22:01.123456789+01:00
imports:
- name: github.com/x/y
  version: v1.0
  subpackages:
  - sub
- name: github.com/gone/away
  version: v2.0
testImports: []
"#;
}

/// Run git in `dir`, panicking with its output on failure.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Refs present in a repository, e.g. `refs/tags/v1.0.0`.
#[allow(dead_code)]
pub fn refs(repo: &Path) -> Vec<String> {
    let output = Command::new("git")
        .args(["for-each-ref", "--format=%(refname)"])
        .current_dir(repo)
        .output()
        .expect("Failed to run git");
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

/// A temporary workspace for one CLI run.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a fixture with an empty project directory and glide home.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("project")
            .create_dir_all()
            .expect("Failed to create project directory");
        temp_dir
            .child("glide/cache/src")
            .create_dir_all()
            .expect("Failed to create glide cache");
        Self { temp_dir }
    }

    pub fn project_dir(&self) -> PathBuf {
        self.temp_dir.path().join("project")
    }

    pub fn glide_home(&self) -> PathBuf {
        self.temp_dir.path().join("glide")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_dir().join("glide.yaml")
    }

    /// Put a cached clone with a `main` branch, a `feature` branch and a
    /// `v1.0.0` tag where glide would have fetched `cache_name`.
    #[allow(dead_code)]
    pub fn with_cached_clone(self, cache_name: &str) -> Self {
        let dir = self
            .glide_home()
            .join("cache/src")
            .join(format!("https-{}", cache_name));
        fs::create_dir_all(&dir).expect("Failed to create clone directory");
        git(&dir, &["init", "--quiet"]);
        git(&dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(
            &dir,
            &[
                "-c",
                "user.name=Mirror Test",
                "-c",
                "user.email=mirror@example.com",
                "commit",
                "--quiet",
                "--allow-empty",
                "-m",
                "initial",
            ],
        );
        git(&dir, &["branch", "feature"]);
        git(&dir, &["tag", "v1.0.0"]);
        self
    }

    /// Create an empty bare repository standing in for a mirror project.
    #[allow(dead_code)]
    pub fn bare_mirror(&self, name: &str) -> PathBuf {
        let dir = self.temp_dir.path().join("mirrors").join(format!("{}.git", name));
        fs::create_dir_all(&dir).expect("Failed to create mirror directory");
        git(&dir, &["init", "--quiet", "--bare"]);
        dir
    }

    /// Install a stand-in `glide` that writes the canned documents.
    #[cfg(unix)]
    #[allow(dead_code)]
    pub fn fake_glide(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let docs = self.temp_dir.path().join("docs");
        fs::create_dir_all(&docs).expect("Failed to create docs directory");
        fs::write(docs.join("glide.new"), documents::GENERATED).expect("Failed to write manifest");
        fs::write(docs.join("glide.lock"), documents::LOCK).expect("Failed to write lock");

        let script = format!(
            r#"#!/bin/sh
echo "$@" >> glide-calls.log
case "$*" in
  *init*) cp "{docs}/glide.new" glide.new ;;
  *install*) cp "{docs}/glide.lock" glide.lock ;;
esac
"#,
            docs = docs.display()
        );
        let path = self.temp_dir.path().join("fake-glide");
        fs::write(&path, script).expect("Failed to write fake glide");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("Failed to make fake glide executable");
        path
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
