//! External `git` invocation behind the [VersionControl] capability trait.
//!
//! This uses the system git command, which automatically handles:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig
//!
//! The only information consumed from git is the list of tag name strings
//! and process success/failure; failures carry the tool's stderr text
//! verbatim inside [Error::GitCommand] and are never retried here.

use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// Git operations needed by load, publish, and tag flows.
///
/// Implementors must be `Send + Sync`. The default implementation is
/// [GitCli]; tests substitute recording mocks so orchestration can be
/// exercised without touching real version-control state.
pub trait VersionControl: Send + Sync {
    /// Clone a repository into `target`.
    fn clone_repo(&self, url: &str, target: &Path) -> Result<()>;

    /// Check out a branch or tag in a local clone.
    fn checkout(&self, repo: &Path, refname: &str) -> Result<()>;

    /// List all tag names in a local clone.
    fn list_tags(&self, repo: &Path) -> Result<Vec<String>>;

    /// List all tag names visible on a remote without cloning.
    fn list_remote_tags(&self, url: &str) -> Result<Vec<String>>;

    /// Create an annotated tag at the current HEAD of a local clone.
    fn create_tag(&self, repo: &Path, name: &str, message: &str) -> Result<()>;

    /// Delete a local tag.
    fn delete_tag(&self, repo: &Path, name: &str) -> Result<()>;

    /// Push a tag to a remote.
    fn push_tag(&self, repo: &Path, remote: &str, name: &str) -> Result<()>;

    /// Delete a tag from a remote (`git push <remote> :refs/tags/<name>`).
    fn delete_remote_tag(&self, repo: &Path, remote: &str, name: &str) -> Result<()>;

    /// Stage and commit everything in the working tree.
    ///
    /// Returns `false` when there was nothing to commit.
    fn commit_all(&self, repo: &Path, message: &str) -> Result<bool>;

    /// Push a branch to a remote.
    fn push_branch(&self, repo: &Path, remote: &str, branch: &str) -> Result<()>;
}

/// The default [VersionControl] implementation shelling out to system git.
#[derive(Debug, Default, Clone)]
pub struct GitCli;

impl GitCli {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, repo: Option<&Path>, args: &[&str], context: &str) -> Result<String> {
        let mut command = Command::new("git");
        if let Some(repo) = repo {
            command.arg("-C").arg(repo);
        }
        command.args(args);

        debug!("running git {} ({})", args.join(" "), context);

        let output = command.output().map_err(|e| Error::GitCommand {
            command: args.join(" "),
            context: context.to_string(),
            stderr: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::GitCommand {
                command: args.join(" "),
                context: context.to_string(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl VersionControl for GitCli {
    fn clone_repo(&self, url: &str, target: &Path) -> Result<()> {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let target_str = target.display().to_string();
        match self.run(None, &["clone", url, &target_str], url) {
            Ok(_) => Ok(()),
            Err(Error::GitCommand {
                command,
                context,
                stderr,
            }) => {
                // Surface a friendlier message for common auth failures
                let stderr = if stderr.contains("Authentication failed")
                    || stderr.contains("Permission denied")
                    || stderr.contains("Could not read from remote repository")
                {
                    format!(
                        "Authentication failed. Make sure you have access to the repository.\n\
                        For private repos, ensure you have:\n\
                        - SSH key added to ssh-agent\n\
                        - Git credentials configured\n\
                        - Personal access token set up\n\
                        Error: {}",
                        stderr
                    )
                } else {
                    stderr
                };
                Err(Error::GitCommand {
                    command,
                    context,
                    stderr,
                })
            }
            Err(e) => Err(e),
        }
    }

    fn checkout(&self, repo: &Path, refname: &str) -> Result<()> {
        self.run(Some(repo), &["checkout", refname], &repo.display().to_string())?;
        Ok(())
    }

    fn list_tags(&self, repo: &Path) -> Result<Vec<String>> {
        let stdout = self.run(Some(repo), &["tag", "-l"], &repo.display().to_string())?;
        Ok(stdout
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }

    fn list_remote_tags(&self, url: &str) -> Result<Vec<String>> {
        let stdout = self.run(None, &["ls-remote", "--tags", url], url)?;
        Ok(parse_ls_remote_tags(&stdout))
    }

    fn create_tag(&self, repo: &Path, name: &str, message: &str) -> Result<()> {
        self.run(
            Some(repo),
            &["tag", "-a", name, "-m", message],
            &repo.display().to_string(),
        )?;
        Ok(())
    }

    fn delete_tag(&self, repo: &Path, name: &str) -> Result<()> {
        self.run(Some(repo), &["tag", "-d", name], &repo.display().to_string())?;
        Ok(())
    }

    fn push_tag(&self, repo: &Path, remote: &str, name: &str) -> Result<()> {
        self.run(
            Some(repo),
            &["push", remote, name],
            &repo.display().to_string(),
        )?;
        Ok(())
    }

    fn delete_remote_tag(&self, repo: &Path, remote: &str, name: &str) -> Result<()> {
        let refspec = format!(":refs/tags/{}", name);
        self.run(
            Some(repo),
            &["push", remote, &refspec],
            &repo.display().to_string(),
        )?;
        Ok(())
    }

    fn commit_all(&self, repo: &Path, message: &str) -> Result<bool> {
        let context = repo.display().to_string();
        self.run(Some(repo), &["add", "-A"], &context)?;

        let status = self.run(Some(repo), &["status", "--porcelain"], &context)?;
        if status.trim().is_empty() {
            return Ok(false);
        }

        self.run(Some(repo), &["commit", "-m", message], &context)?;
        Ok(true)
    }

    fn push_branch(&self, repo: &Path, remote: &str, branch: &str) -> Result<()> {
        self.run(
            Some(repo),
            &["push", remote, branch],
            &repo.display().to_string(),
        )?;
        Ok(())
    }
}

/// Parse `git ls-remote --tags` output into plain tag names.
///
/// Output lines look like `<hash>\trefs/tags/v1.0.0`; annotated tags appear
/// a second time with a `^{}` peel marker, which is dropped.
fn parse_ls_remote_tags(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() != 2 {
                return None;
            }
            let tag = parts[1].strip_prefix("refs/tags/")?;
            if tag.ends_with("^{}") {
                return None;
            }
            Some(tag.to_string())
        })
        .collect()
}
