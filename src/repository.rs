//! # Repository Sources
//!
//! A package is loaded out of its database repository through one
//! capability, [RepositorySource], with two implementations:
//!
//! - **[LocalRepoSource]**: the repository has an entry in `gitdbs.json`
//!   pointing at a local clone. Tags are listed from the clone and content
//!   is materialized by checking out the requested ref and reading the
//!   package subfolder.
//!
//! - **[RemoteExtractSource]**: no local clone is configured. Tags are
//!   listed with `git ls-remote` and content is materialized by running the
//!   subfolder-extraction tool into a scoped scratch directory.
//!
//! The implementation is selected by configuration in [source_for]. Both
//! yield a [MemoryFS] staging tree, so callers never care which path was
//! taken.
//!
//! Scratch directories used by the remote path are exclusively owned by the
//! in-flight operation and removed on every exit path, success or failure
//! (`tempfile::TempDir` RAII).

use std::path::PathBuf;

use log::info;
use tempfile::TempDir;

use crate::config::GitDbs;
use crate::error::{Error, Result};
use crate::extract::{DegitCli, Extraction, RepoRef};
use crate::filesystem::MemoryFS;
use crate::git::{GitCli, VersionControl};

/// One place a package's content and tags can come from.
pub trait RepositorySource: Send + Sync {
    /// All tag names visible in the repository.
    fn tags(&self) -> Result<Vec<String>>;

    /// Materialize `subdir` at `refname` into a staged filesystem.
    ///
    /// An empty `subdir` materializes the repository root.
    fn materialize(&self, refname: &str, subdir: &str) -> Result<MemoryFS>;

    /// Human-readable description of where content comes from.
    fn location(&self) -> String;
}

/// A database repository with a configured local clone.
pub struct LocalRepoSource {
    repo_path: PathBuf,
    git: Box<dyn VersionControl>,
}

impl LocalRepoSource {
    pub fn new(repo_path: PathBuf) -> Self {
        Self {
            repo_path,
            git: Box::new(GitCli::new()),
        }
    }

    /// Inject a custom git implementation. Used by tests.
    pub fn with_git(repo_path: PathBuf, git: Box<dyn VersionControl>) -> Self {
        Self { repo_path, git }
    }
}

impl RepositorySource for LocalRepoSource {
    fn tags(&self) -> Result<Vec<String>> {
        self.git.list_tags(&self.repo_path)
    }

    fn materialize(&self, refname: &str, subdir: &str) -> Result<MemoryFS> {
        self.git.checkout(&self.repo_path, refname)?;

        let source_root = if subdir.is_empty() {
            self.repo_path.clone()
        } else {
            self.repo_path.join(subdir)
        };

        if !source_root.is_dir() {
            return Err(Error::PathMissing {
                path: source_root.display().to_string(),
            });
        }

        MemoryFS::from_dir(&source_root)
    }

    fn location(&self) -> String {
        format!("local clone {}", self.repo_path.display())
    }
}

/// A database repository fetched through the extraction tool.
pub struct RemoteExtractSource {
    repo: RepoRef,
    git: Box<dyn VersionControl>,
    extractor: Box<dyn Extraction>,
}

impl RemoteExtractSource {
    pub fn new(repo: RepoRef) -> Self {
        Self {
            repo,
            git: Box::new(GitCli::new()),
            extractor: Box::new(DegitCli::from_env()),
        }
    }

    /// Inject custom git and extraction implementations. Used by tests.
    pub fn with_tools(
        repo: RepoRef,
        git: Box<dyn VersionControl>,
        extractor: Box<dyn Extraction>,
    ) -> Self {
        Self {
            repo,
            git,
            extractor,
        }
    }
}

impl RepositorySource for RemoteExtractSource {
    fn tags(&self) -> Result<Vec<String>> {
        self.git.list_remote_tags(&self.repo.clone_url())
    }

    fn materialize(&self, refname: &str, subdir: &str) -> Result<MemoryFS> {
        // Scratch dir lives exactly as long as this call
        let scratch = TempDir::new()?;
        let pinned = self.repo.with_ref(refname);

        info!("extracting {} into scratch directory", pinned);
        self.extractor.extract(&pinned, scratch.path())?;

        let source_root = if subdir.is_empty() {
            scratch.path().to_path_buf()
        } else {
            scratch.path().join(subdir)
        };

        if !source_root.is_dir() {
            return Err(Error::PathMissing {
                path: format!("{} (in {})", subdir, self.repo),
            });
        }

        MemoryFS::from_dir(&source_root)
    }

    fn location(&self) -> String {
        format!("remote {}", self.repo)
    }
}

/// Select the source for a repository: local when `gitdbs.json` maps it to
/// an existing clone, remote extraction otherwise.
pub fn source_for(repo: &str, gitdbs: &GitDbs) -> Result<Box<dyn RepositorySource>> {
    if let Some(entry) = gitdbs.find(repo) {
        let path = entry.resolved_path();
        if !path.is_dir() {
            return Err(Error::PathMissing {
                path: path.display().to_string(),
            });
        }
        return Ok(Box::new(LocalRepoSource::new(path)));
    }

    Ok(Box::new(RemoteExtractSource::new(RepoRef::parse(repo)?)))
}
