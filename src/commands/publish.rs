//! Publish command implementation
//!
//! Publishes a local package folder into its database repository:
//! 1. Read and validate the package metadata (`pkg.json`).
//! 2. Locate the configured local clone of the database repository.
//! 3. Copy the package folder into the clone at `root-dir`, commit, and
//!    push the branch.
//! 4. Compute the canonical publish tag, run the conflict check, then
//!    create and push the tag.
//!
//! The tag sequence follows check -> (override) -> create -> push. A forced
//! override deletes the previous tag locally and remotely before creating
//! the new one; if the final push then fails, the error states explicitly
//! that the remote tag is now absent; no restoration is attempted.

use anyhow::{Context, Result};
use clap::Args;
use log::info;
use std::path::PathBuf;

use gitpkg::config::{GitDbs, PackageMeta};
use gitpkg::defaults::{DEFAULT_GITDBS_PATH, DEFAULT_META_FILE, DEFAULT_REMOTE};
use gitpkg::error::Error;
use gitpkg::filesystem::MemoryFS;
use gitpkg::git::{GitCli, VersionControl};
use gitpkg::output::{emoji, OutputConfig};
use gitpkg::version::{check_conflict, compute_publish_tag, ConflictDecision};
use gitpkg::write;

/// Arguments for the publish command
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Directory containing the package to publish
    #[arg(value_name = "PKG_DIR", default_value = ".")]
    pub pkg_dir: PathBuf,

    /// Name of the metadata file inside the package directory
    #[arg(long, value_name = "FILE", default_value = DEFAULT_META_FILE)]
    pub meta_file: String,

    /// Commit message (defaults to "Update {name}")
    #[arg(short, long, value_name = "MSG")]
    pub message: Option<String>,

    /// Remote to push the branch and tag to
    #[arg(long, value_name = "REMOTE", default_value = DEFAULT_REMOTE)]
    pub remote: String,

    /// Commit and tag locally without pushing
    #[arg(long)]
    pub no_push: bool,

    /// Push the package content without creating a tag
    #[arg(long)]
    pub no_tag: bool,

    /// Overwrite an existing tag (delete locally and remotely, recreate)
    #[arg(short, long)]
    pub force: bool,

    /// Path to the gitdbs configuration file
    #[arg(long, value_name = "FILE", env = "GITPKG_GITDBS", default_value = DEFAULT_GITDBS_PATH)]
    pub gitdbs: PathBuf,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// What a publish run actually did, for reporting.
#[derive(Debug, PartialEq, Eq)]
struct PublishOutcome {
    committed: bool,
    pushed: bool,
    tag: Option<String>,
    overrode: bool,
}

/// Execute the publish command
pub fn execute(args: PublishArgs, output: &OutputConfig) -> Result<()> {
    let meta = PackageMeta::from_dir(&args.pkg_dir, &args.meta_file)?;
    let db_repo = meta.require_db_repo()?.to_string();

    let gitdbs = GitDbs::load(&args.gitdbs)?;
    let entry = gitdbs
        .find(&db_repo)
        .ok_or_else(|| Error::RepoNotConfigured {
            repo: db_repo.clone(),
            config_path: args.gitdbs.display().to_string(),
        })?;

    let repo_path = entry.resolved_path();
    if !repo_path.is_dir() {
        return Err(Error::PathMissing {
            path: repo_path.display().to_string(),
        }
        .into());
    }

    let git = GitCli::new();
    let outcome = run_publish(&git, &args, &meta, &repo_path)?;

    if !args.quiet {
        let name = meta.display_name();
        if outcome.committed {
            println!("{} Committed {} content", emoji(output, "📦", "[PKG]"), name);
        } else {
            println!(
                "{} No content changes for {}",
                emoji(output, "📦", "[PKG]"),
                name
            );
        }
        if let Some(tag) = &outcome.tag {
            let verb = if outcome.overrode { "Overwrote" } else { "Created" };
            println!("{} {} tag {}", emoji(output, "🏷️", "[TAG]"), verb, tag);
        }
        if outcome.pushed {
            println!(
                "{} Pushed to {} ({})",
                emoji(output, "✅", "[OK]"),
                args.remote,
                db_repo
            );
        } else {
            println!(
                "{} Local only; push manually with: git push {} {} {}",
                emoji(output, "✅", "[OK]"),
                args.remote,
                meta.branch(),
                outcome.tag.as_deref().unwrap_or("")
            );
        }
    }

    Ok(())
}

/// The publish flow against an injected [VersionControl] implementation.
fn run_publish(
    git: &dyn VersionControl,
    args: &PublishArgs,
    meta: &PackageMeta,
    repo_path: &std::path::Path,
) -> Result<PublishOutcome> {
    let branch = meta.branch();
    git.checkout(repo_path, branch)?;

    // Stage the package folder into the clone at root-dir
    let staged = MemoryFS::from_dir(&args.pkg_dir)?;
    let destination = if meta.root_dir.is_empty() {
        repo_path.to_path_buf()
    } else {
        repo_path.join(&meta.root_dir)
    };
    write::to_disk(&staged, &destination)?;

    let message = args
        .message
        .clone()
        .unwrap_or_else(|| format!("Update {}", meta.display_name()));

    let committed = git.commit_all(repo_path, &message)?;
    if !committed {
        info!("nothing to commit for {}", meta.display_name());
    }

    let mut pushed = false;
    if !args.no_push {
        git.push_branch(repo_path, &args.remote, branch)?;
        pushed = true;
    }

    if args.no_tag {
        return Ok(PublishOutcome {
            committed,
            pushed,
            tag: None,
            overrode: false,
        });
    }

    let tag = compute_publish_tag(meta.prefix(), &meta.version, meta.tag_style)?;
    let existing_tags = git.list_tags(repo_path)?;

    let mut overrode = false;
    match check_conflict(&tag, &existing_tags, args.force) {
        ConflictDecision::Proceed => {}
        ConflictDecision::Rejected => {
            return Err(Error::TagAlreadyExists { tag }.into());
        }
        ConflictDecision::Override(plan) => {
            info!("overwriting existing tag {}", plan.delete);
            git.delete_tag(repo_path, &plan.delete)?;
            if !args.no_push {
                git.delete_remote_tag(repo_path, &args.remote, &plan.delete)?;
            }
            overrode = true;
        }
    }

    git.create_tag(repo_path, &tag, &format!("Release {}", tag))?;

    if !args.no_push {
        git.push_tag(repo_path, &args.remote, &tag).with_context(|| {
            if overrode {
                format!(
                    "tag '{}' was deleted from '{}' and the replacement could not be pushed; \
                     the remote tag is now absent",
                    tag, args.remote
                )
            } else {
                format!("tag '{}' was created locally but could not be pushed", tag)
            }
        })?;
    }

    Ok(PublishOutcome {
        committed,
        pushed,
        tag: Some(tag),
        overrode,
    })
}
