//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// gitpkg - Load and publish package subfolders stored in git repositories
#[derive(Parser, Debug)]
#[command(name = "gitpkg")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a package subfolder from a database repository
    Load(commands::load::LoadArgs),

    /// Publish a package folder into its database repository with a version tag
    Publish(commands::publish::PublishArgs),

    /// Create, delete, or list tags in a configured repository
    Tag(commands::tag::TagArgs),

    /// Inspect and edit the gitdbs repository configuration
    Repos(commands::repos::ReposArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .format_timestamp(None)
        .init();

        let output = gitpkg::output::OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Load(args) => commands::load::execute(args, &output),
            Commands::Publish(args) => commands::publish::execute(args, &output),
            Commands::Tag(args) => commands::tag::execute(args, &output),
            Commands::Repos(args) => commands::repos::execute(args, &output),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
