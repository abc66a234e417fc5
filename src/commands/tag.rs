//! # Tag Command Implementation
//!
//! This module implements the `tag` subcommand, which manipulates tags in a
//! configured database repository directly, without going through a full
//! publish.
//!
//! ## Subcommands
//!
//! - **`create`**: Create (and by default push) a tag, honoring the same
//!   conflict rules as publish
//! - **`delete`**: Delete a tag locally and optionally from a remote
//! - **`list`**: List tags, optionally filtered to a package prefix

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use log::warn;
use std::path::{Path, PathBuf};

use gitpkg::config::GitDbs;
use gitpkg::defaults::{DEFAULT_GITDBS_PATH, DEFAULT_REMOTE};
use gitpkg::error::Error;
use gitpkg::git::{GitCli, VersionControl};
use gitpkg::output::{emoji, OutputConfig};
use gitpkg::version::{check_conflict, ConflictDecision};

/// Manage tags in a configured database repository
#[derive(Args, Debug)]
pub struct TagArgs {
    /// Path to the gitdbs configuration file
    #[arg(long, value_name = "FILE", env = "GITPKG_GITDBS", default_value = DEFAULT_GITDBS_PATH)]
    pub gitdbs: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: TagSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TagSubcommand {
    /// Create a tag and push it to the remote
    Create(CreateArgs),
    /// Delete a tag locally and optionally from the remote
    Delete(DeleteArgs),
    /// List tags in the repository
    List(ListArgs),
}

/// Arguments for the tag create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Repository URL the tag belongs to
    #[arg(value_name = "REPO")]
    pub repo: String,

    /// Tag name to create, e.g. "packages/example_pkg/v0.1.0"
    #[arg(value_name = "TAG")]
    pub tag: String,

    /// Tag message (defaults to the tag name)
    #[arg(short, long, value_name = "MSG")]
    pub message: Option<String>,

    /// Overwrite an existing tag (delete locally and remotely, recreate)
    #[arg(short, long)]
    pub force: bool,

    /// Create the tag locally without pushing
    #[arg(long)]
    pub no_push: bool,

    /// Remote to push to
    #[arg(long, value_name = "REMOTE", default_value = DEFAULT_REMOTE)]
    pub remote: String,
}

/// Arguments for the tag delete command
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Repository URL the tag belongs to
    #[arg(value_name = "REPO")]
    pub repo: String,

    /// Tag name to delete
    #[arg(value_name = "TAG")]
    pub tag: String,

    /// Also delete the tag from this remote
    #[arg(long, value_name = "REMOTE")]
    pub remote: Option<String>,
}

/// Arguments for the tag list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Repository URL to list tags for
    #[arg(value_name = "REPO")]
    pub repo: String,

    /// Only list tags under this package prefix
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,
}

/// Execute the tag command
pub fn execute(args: TagArgs, output: &OutputConfig) -> Result<()> {
    let gitdbs = GitDbs::load(&args.gitdbs)?;
    let git = GitCli::new();

    match args.command {
        TagSubcommand::Create(create) => {
            let repo_path = local_repo_path(&create.repo, &gitdbs, &args.gitdbs)?;
            execute_create(&git, &create, &repo_path, output)
        }
        TagSubcommand::Delete(delete) => {
            let repo_path = local_repo_path(&delete.repo, &gitdbs, &args.gitdbs)?;
            execute_delete(&git, &delete, &repo_path, output)
        }
        TagSubcommand::List(list) => {
            let repo_path = local_repo_path(&list.repo, &gitdbs, &args.gitdbs)?;
            execute_list(&git, &list, &repo_path)
        }
    }
}

/// Resolve a repository URL to its configured local clone.
fn local_repo_path(repo: &str, gitdbs: &GitDbs, gitdbs_path: &Path) -> Result<PathBuf> {
    let entry = gitdbs.find(repo).ok_or_else(|| Error::RepoNotConfigured {
        repo: repo.to_string(),
        config_path: gitdbs_path.display().to_string(),
    })?;

    let path = entry.resolved_path();
    if !path.is_dir() {
        return Err(Error::PathMissing {
            path: path.display().to_string(),
        }
        .into());
    }
    Ok(path)
}

fn execute_create(
    git: &dyn VersionControl,
    args: &CreateArgs,
    repo_path: &Path,
    output: &OutputConfig,
) -> Result<()> {
    let existing_tags = git.list_tags(repo_path)?;

    let mut overrode = false;
    match check_conflict(&args.tag, &existing_tags, args.force) {
        ConflictDecision::Proceed => {}
        ConflictDecision::Rejected => {
            return Err(Error::TagAlreadyExists {
                tag: args.tag.clone(),
            }
            .into());
        }
        ConflictDecision::Override(plan) => {
            git.delete_tag(repo_path, &plan.delete)?;
            if !args.no_push {
                git.delete_remote_tag(repo_path, &args.remote, &plan.delete)?;
            }
            overrode = true;
        }
    }

    let message = args.message.clone().unwrap_or_else(|| args.tag.clone());
    git.create_tag(repo_path, &args.tag, &message)?;

    if !args.no_push {
        git.push_tag(repo_path, &args.remote, &args.tag).with_context(|| {
            if overrode {
                format!(
                    "tag '{}' was deleted from '{}' and the replacement could not be pushed; \
                     the remote tag is now absent",
                    args.tag, args.remote
                )
            } else {
                format!("tag '{}' was created locally but could not be pushed", args.tag)
            }
        })?;
    }

    let action = match (overrode, args.no_push) {
        (true, _) => "overwritten",
        (false, true) => "created",
        (false, false) => "pushed",
    };
    println!(
        "{} Tag '{}' {}",
        emoji(output, "🏷️", "[TAG]"),
        args.tag,
        action
    );
    Ok(())
}

fn execute_delete(
    git: &dyn VersionControl,
    args: &DeleteArgs,
    repo_path: &Path,
    output: &OutputConfig,
) -> Result<()> {
    // Deleting an already-absent tag is a no-op, not an error
    match git.delete_tag(repo_path, &args.tag) {
        Ok(()) => println!(
            "{} Deleted local tag '{}'",
            emoji(output, "🗑️", "[DEL]"),
            args.tag
        ),
        Err(e) => {
            warn!("local tag '{}' not deleted: {}", args.tag, e);
            println!("Local tag '{}' did not exist", args.tag);
        }
    }

    if let Some(remote) = &args.remote {
        match git.delete_remote_tag(repo_path, remote, &args.tag) {
            Ok(()) => println!(
                "{} Deleted remote tag '{}' from {}",
                emoji(output, "🗑️", "[DEL]"),
                args.tag,
                remote
            ),
            Err(e) => {
                warn!("remote tag '{}' not deleted: {}", args.tag, e);
                println!(
                    "Remote tag '{}' did not exist or could not be deleted",
                    args.tag
                );
            }
        }
    }

    Ok(())
}

fn execute_list(git: &dyn VersionControl, args: &ListArgs, repo_path: &Path) -> Result<()> {
    let mut tags = git.list_tags(repo_path)?;

    if let Some(prefix) = &args.prefix {
        let needle = format!("{}/", prefix.trim_end_matches('/'));
        tags.retain(|tag| tag.starts_with(&needle));
    }

    tags.sort();
    for tag in tags {
        println!("{}", tag);
    }
    Ok(())
}
