//! # Repos Command Implementation
//!
//! This module implements the `repos` subcommand, which inspects and edits
//! the gitdbs configuration: the mapping from database repository URLs to
//! local clone paths.
//!
//! ## Subcommands
//!
//! - **`list`**: Show all configured repositories and whether their clones
//!   exist on disk
//! - **`add`**: Clone a repository (if needed) and record it
//! - **`remove`**: Drop a repository entry from the configuration

use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;
use log::info;
use std::path::PathBuf;

use gitpkg::config::{GitDbEntry, GitDbs};
use gitpkg::defaults::DEFAULT_GITDBS_PATH;
use gitpkg::git::{GitCli, VersionControl};
use gitpkg::output::{emoji, OutputConfig};

/// Manage the gitdbs repository configuration
#[derive(Args, Debug)]
pub struct ReposArgs {
    /// Path to the gitdbs configuration file
    #[arg(long, value_name = "FILE", env = "GITPKG_GITDBS", default_value = DEFAULT_GITDBS_PATH)]
    pub gitdbs: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: ReposSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ReposSubcommand {
    /// List configured repositories
    List,
    /// Clone a repository if needed and record it in the configuration
    Add(AddArgs),
    /// Remove a repository entry from the configuration
    Remove(RemoveArgs),
}

/// Arguments for the repos add command
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Repository URL to register
    #[arg(value_name = "URL")]
    pub url: String,

    /// Local path for the clone; a leading `~` expands to the home
    /// directory
    #[arg(value_name = "LOCAL_PATH")]
    pub local_path: String,

    /// Record the entry without cloning
    #[arg(long)]
    pub no_clone: bool,
}

/// Arguments for the repos remove command
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Repository URL to remove
    #[arg(value_name = "URL")]
    pub url: String,
}

/// Execute the repos command
pub fn execute(args: ReposArgs, output: &OutputConfig) -> Result<()> {
    let mut gitdbs = GitDbs::load(&args.gitdbs)?;

    match args.command {
        ReposSubcommand::List => {
            if gitdbs.is_empty() {
                println!("No repositories configured in {}", args.gitdbs.display());
                return Ok(());
            }

            for entry in gitdbs.entries() {
                let cloned = entry.resolved_path().is_dir();
                let status = if cloned {
                    style("cloned").green()
                } else {
                    style("missing").red()
                };
                println!(
                    "{}  {}  [{}]",
                    style(&entry.name).bold(),
                    entry.db_repo,
                    status
                );
                println!("    {}", entry.local_path);
            }
            Ok(())
        }
        ReposSubcommand::Add(add) => {
            let entry = GitDbEntry::for_clone(&add.url, &add.local_path)?;
            let clone_path = entry.resolved_path();

            if clone_path.is_dir() {
                info!("repository already exists at {}", clone_path.display());
            } else if !add.no_clone {
                let git = GitCli::new();
                git.clone_repo(&add.url, &clone_path)?;
            }

            gitdbs.upsert(entry);
            gitdbs.save(&args.gitdbs)?;

            println!(
                "{} Registered {} at {}",
                emoji(output, "✅", "[OK]"),
                add.url,
                add.local_path
            );
            Ok(())
        }
        ReposSubcommand::Remove(remove) => {
            if !gitdbs.remove(&remove.url) {
                anyhow::bail!("no entry for {} in {}", remove.url, args.gitdbs.display());
            }
            gitdbs.save(&args.gitdbs)?;

            println!(
                "{} Removed {}",
                emoji(output, "🗑️", "[DEL]"),
                remove.url
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_without_clone_then_remove() {
        let temp = TempDir::new().unwrap();
        let gitdbs_path = temp.path().join(".gitpkg/gitdbs.json");
        let output = OutputConfig::without_color();

        let args = ReposArgs {
            gitdbs: gitdbs_path.clone(),
            command: ReposSubcommand::Add(AddArgs {
                url: "https://github.com/user/test-db".to_string(),
                local_path: temp.path().join("clones/test-db").display().to_string(),
                no_clone: true,
            }),
        };
        execute(args, &output).unwrap();

        let dbs = GitDbs::load(&gitdbs_path).unwrap();
        let entry = dbs.find("https://github.com/user/test-db").unwrap();
        assert_eq!(entry.name, "test-db");

        let args = ReposArgs {
            gitdbs: gitdbs_path.clone(),
            command: ReposSubcommand::Remove(RemoveArgs {
                url: "https://github.com/user/test-db".to_string(),
            }),
        };
        execute(args, &output).unwrap();

        let dbs = GitDbs::load(&gitdbs_path).unwrap();
        assert!(dbs.is_empty());
    }

    #[test]
    fn test_remove_unknown_entry_fails() {
        let temp = TempDir::new().unwrap();
        let args = ReposArgs {
            gitdbs: temp.path().join("gitdbs.json"),
            command: ReposSubcommand::Remove(RemoveArgs {
                url: "https://github.com/user/unknown".to_string(),
            }),
        };

        let result = execute(args, &OutputConfig::without_color());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("no entry"));
    }
}
