//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files. The E2E tests drive the compiled binary
//! against real throwaway git repositories: each database fixture is a
//! bare "remote" plus a working clone whose origin points at it, so push
//! and remote-tag operations work entirely offline.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new();
//!     let db = fixture.init_database("test-db");
//!     // ... test code
//! }
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git, DatabaseFixture, TestFixture};
}

/// Run a git command in `dir`, panicking on failure. Returns stdout.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("failed to spawn git");
    assert!(
        output.status.success(),
        "git {:?} in {} failed: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// A test fixture rooted in a temporary directory that acts as the
/// working directory for CLI invocations.
#[allow(dead_code)]
pub struct TestFixture {
    temp: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp: assert_fs::TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Create a database repository: a bare "remote" plus a working clone
    /// with an initial commit pushed to `main`.
    pub fn init_database(&self, name: &str) -> DatabaseFixture {
        let bare = self.path().join(format!("remotes/{}.git", name));
        std::fs::create_dir_all(&bare).unwrap();

        let output = Command::new("git")
            .args(["init", "--bare"])
            .arg(&bare)
            .output()
            .unwrap();
        assert!(output.status.success());
        git(&bare, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        let clone = self.path().join(format!("dbs/{}", name));
        std::fs::create_dir_all(clone.parent().unwrap()).unwrap();
        let output = Command::new("git")
            .arg("clone")
            .arg(&bare)
            .arg(&clone)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "clone failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        git(&clone, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(&clone, &["config", "user.email", "test@example.com"]);
        git(&clone, &["config", "user.name", "Test User"]);
        git(&clone, &["config", "commit.gpgsign", "false"]);
        git(&clone, &["config", "tag.gpgsign", "false"]);

        std::fs::write(clone.join("README.md"), format!("# {}\n", name)).unwrap();
        git(&clone, &["add", "-A"]);
        git(&clone, &["commit", "-m", "initial"]);
        git(&clone, &["push", "origin", "main"]);

        DatabaseFixture {
            url: format!("https://github.com/testuser/{}", name),
            name: name.to_string(),
            bare,
            clone,
        }
    }

    /// Write a `.gitpkg/gitdbs.json` in the fixture root mapping the given
    /// databases to their clones.
    pub fn write_gitdbs(&self, databases: &[&DatabaseFixture]) {
        let entries: Vec<serde_json::Value> = databases
            .iter()
            .map(|db| {
                serde_json::json!({
                    "name": db.name,
                    "description": format!("Local copy of {}", db.url),
                    "db-repo": db.url,
                    "local_path": db.clone.display().to_string(),
                })
            })
            .collect();

        let path = self.path().join(".gitpkg/gitdbs.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, serde_json::to_string_pretty(&entries).unwrap()).unwrap();
    }

    /// Create a local package directory with a `pkg.json` and sample files.
    pub fn create_package(
        &self,
        dir_name: &str,
        name: &str,
        version: &str,
        db_repo: &str,
        root_dir: &str,
    ) -> PathBuf {
        let pkg_dir = self.path().join(dir_name);
        std::fs::create_dir_all(&pkg_dir).unwrap();

        let meta = serde_json::json!({
            "name": name,
            "version": version,
            "description": format!("Test package {}", name),
            "db-repo": db_repo,
            "root-dir": root_dir,
            "branch": "main",
        });
        std::fs::write(
            pkg_dir.join("pkg.json"),
            serde_json::to_string_pretty(&meta).unwrap(),
        )
        .unwrap();
        std::fs::write(
            pkg_dir.join("main.py"),
            format!("print(\"Hello from {}!\")\n", name),
        )
        .unwrap();

        pkg_dir
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A bare "remote" repository plus its configured working clone.
#[allow(dead_code)]
pub struct DatabaseFixture {
    /// Repository identifier used in gitdbs.json and pkg.json.
    pub url: String,
    pub name: String,
    /// The bare repository acting as the remote.
    pub bare: PathBuf,
    /// The working clone recorded as local_path.
    pub clone: PathBuf,
}

#[allow(dead_code)]
impl DatabaseFixture {
    /// Commit files under `root_dir` in the clone and push to main.
    pub fn commit_package(&self, root_dir: &str, files: &[(&str, &str)], message: &str) {
        git(&self.clone, &["checkout", "main"]);
        let package_root = self.clone.join(root_dir);
        for (path, content) in files {
            let full = package_root.join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }
        git(&self.clone, &["add", "-A"]);
        git(&self.clone, &["commit", "-m", message]);
        git(&self.clone, &["push", "origin", "main"]);
    }

    /// Create an annotated tag at the clone's HEAD and push it.
    pub fn tag(&self, name: &str) {
        git(&self.clone, &["tag", "-a", name, "-m", name]);
        git(&self.clone, &["push", "origin", name]);
    }

    /// Tag names present in the bare "remote".
    pub fn remote_tags(&self) -> Vec<String> {
        git(&self.bare, &["tag", "-l"])
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Read a file's content from the remote's `main` branch.
    pub fn remote_file(&self, path: &str) -> String {
        git(&self.bare, &["cat-file", "-p", &format!("main:{}", path)])
    }
}
