//! Load command implementation
//!
//! Loads a package subfolder out of a database repository at a requested
//! version:
//! 1. Select the repository source (configured local clone, or remote
//!    extraction when no clone is configured).
//! 2. Resolve the version specifier against the repository's tags; with no
//!    specifier the configured branch is used directly.
//! 3. Materialize the package subfolder at the resolved ref.
//! 4. Write it under the target directory (optionally cleaning first).
//!
//! With `--manifest`, the same flow runs once per entry of a
//! `load.pkg.json` file; one failing entry does not abort the others.

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::path::{Path, PathBuf};

use gitpkg::config::{GitDbs, LoadManifest};
use gitpkg::defaults::{DEFAULT_BRANCH, DEFAULT_GITDBS_PATH, DEFAULT_MANIFEST_PATH};
use gitpkg::output::{emoji, OutputConfig};
use gitpkg::repository::source_for;
use gitpkg::version::{resolve_for_load, VersionSpecifier};
use gitpkg::write;

/// Arguments for the load command
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Database repository URL or owner/repo shorthand
    #[arg(value_name = "REPO", required_unless_present = "manifest")]
    pub repo: Option<String>,

    /// Directory to write the package into (defaults to the package path)
    #[arg(value_name = "TARGET_DIR")]
    pub target_dir: Option<PathBuf>,

    /// Path of the package inside the repository
    #[arg(short, long, value_name = "DIR", default_value = "")]
    pub path: String,

    /// Version to load: exact version, tag name, "latest", or a range
    /// (e.g. ">=0.3.2"). Without this the branch is used.
    #[arg(long, value_name = "SPEC")]
    pub version: Option<String>,

    /// Branch used when no version is given
    #[arg(short, long, value_name = "BRANCH", default_value = DEFAULT_BRANCH)]
    pub branch: String,

    /// Remove an existing target directory before writing
    #[arg(long, visible_alias = "force")]
    pub clean: bool,

    /// Path to the gitdbs configuration file
    #[arg(long, value_name = "FILE", env = "GITPKG_GITDBS", default_value = DEFAULT_GITDBS_PATH)]
    pub gitdbs: PathBuf,

    /// Load packages from a load.pkg.json manifest instead
    #[arg(
        short,
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_MANIFEST_PATH,
        conflicts_with_all = ["repo", "target_dir", "version"]
    )]
    pub manifest: Option<PathBuf>,

    /// Load only the named manifest packages (repeatable)
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the load command
pub fn execute(args: LoadArgs, output: &OutputConfig) -> Result<()> {
    let gitdbs = GitDbs::load(&args.gitdbs)?;

    if let Some(manifest_path) = &args.manifest {
        return execute_manifest(&args, manifest_path, &gitdbs, output);
    }

    let repo = args.repo.as_deref().expect("clap enforces REPO");
    let target = default_target(args.target_dir.clone(), &args.path, repo);

    let refname = load_one(
        repo,
        &args.path,
        args.version.as_deref(),
        &args.branch,
        &target,
        args.clean,
        &gitdbs,
    )?;

    if !args.quiet {
        println!(
            "{} Loaded {} at {} into {}",
            emoji(output, "✅", "[OK]"),
            package_label(repo, &args.path),
            refname,
            target.display()
        );
    }

    Ok(())
}

/// Load every requested manifest entry, reporting per-package outcomes.
fn execute_manifest(
    args: &LoadArgs,
    manifest_path: &Path,
    gitdbs: &GitDbs,
    output: &OutputConfig,
) -> Result<()> {
    let manifest = LoadManifest::from_file(manifest_path)?;

    let names: Vec<String> = if args.only.is_empty() {
        manifest.packages.keys().cloned().collect()
    } else {
        args.only.clone()
    };

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(names.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                .expect("static progress template"),
        );
        bar
    };

    let mut failures: Vec<(String, String)> = Vec::new();

    for name in &names {
        progress.set_message(name.clone());

        let result = match manifest.packages.get(name) {
            Some(request) => {
                let target = request
                    .target_dir
                    .as_ref()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(&request.root_dir));
                load_one(
                    &request.db_repo,
                    &request.root_dir,
                    request.version.as_deref(),
                    request.branch(),
                    &target,
                    args.clean,
                    gitdbs,
                )
                .map(|_| ())
            }
            None => Err(gitpkg::error::Error::ConfigParse {
                message: format!("package '{}' not found in manifest", name),
                hint: None,
            }),
        };

        if let Err(e) = result {
            failures.push((name.clone(), e.to_string()));
        }
        progress.inc(1);
    }

    progress.finish_and_clear();

    let loaded = names.len() - failures.len();
    if !args.quiet {
        println!(
            "{} Loaded {}/{} packages",
            emoji(output, "📦", "[PKG]"),
            loaded,
            names.len()
        );
    }

    if !failures.is_empty() {
        for (name, message) in &failures {
            eprintln!("  {} {}: {}", emoji(output, "❌", "[FAIL]"), name, message);
        }
        anyhow::bail!("{} of {} packages failed to load", failures.len(), names.len());
    }

    Ok(())
}

/// Resolve, materialize, and write one package. Returns the ref that was
/// checked out.
fn load_one(
    repo: &str,
    path: &str,
    version: Option<&str>,
    branch: &str,
    target: &Path,
    clean: bool,
    gitdbs: &GitDbs,
) -> gitpkg::error::Result<String> {
    let source = source_for(repo, gitdbs)?;
    info!("loading {} from {}", package_label(repo, path), source.location());

    let refname = match version {
        Some(raw) => {
            let specifier = VersionSpecifier::parse(raw)?;
            let tags = source.tags()?;
            resolve_for_load(&specifier, &tags, path)?
        }
        None => branch.to_string(),
    };

    let staged = source.materialize(&refname, path)?;

    if clean {
        write::clean_target(target)?;
    }
    write::to_disk(&staged, target)?;

    Ok(refname)
}

/// Default target directory: explicit argument, else the package path, else
/// the repository name.
fn default_target(explicit: Option<PathBuf>, path: &str, repo: &str) -> PathBuf {
    if let Some(target) = explicit {
        return target;
    }
    if !path.is_empty() {
        return PathBuf::from(path);
    }
    let name = repo
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(repo)
        .trim_end_matches(".git");
    PathBuf::from(name)
}

fn package_label(repo: &str, path: &str) -> String {
    if path.is_empty() {
        repo.to_string()
    } else {
        format!("{}/{}", repo, path)
    }
}
