//! # Configuration and Metadata Models
//!
//! Typed models for the three JSON files gitpkg reads:
//!
//! - **`gitdbs.json`** ([GitDbs]): an array of records mapping a database
//!   repository URL to its local clone path. Consulted by every operation
//!   that needs a working clone; rewritten only by `repos add`/`remove`.
//! - **`pkg.json`** ([PackageMeta]): a package's own declared identity:
//!   name, version, target repository, root directory, branch. Immutable
//!   input to publish.
//! - **`load.pkg.json`** ([LoadManifest]): a set of packages to load in one
//!   run.
//!
//! All files are validated once at load time; a missing required field is a
//! [Error::ConfigParse] with a fix-it hint, not a runtime surprise further
//! down the flow.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::defaults::DEFAULT_BRANCH;
use crate::error::{Error, Result};
use crate::version::TagStyle;

/// One entry of `gitdbs.json`: a database repository known locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitDbEntry {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Repository URL this entry maps, e.g. `https://github.com/user/repo`.
    #[serde(rename = "db-repo")]
    pub db_repo: String,

    /// Local clone path; a leading `~` expands to the home directory.
    pub local_path: String,
}

impl GitDbEntry {
    /// Build an entry for a freshly cloned repository, deriving the name
    /// from the URL's last path segment.
    pub fn for_clone(url: &str, local_path: &str) -> Result<Self> {
        let name = derive_repo_name(url)?;
        Ok(Self {
            description: format!("Local copy of {}", url),
            name,
            db_repo: url.to_string(),
            local_path: local_path.to_string(),
        })
    }

    /// The clone path with `~` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        expand_home(&self.local_path)
    }
}

/// The repository configuration: all known database repositories.
#[derive(Debug, Clone, Default)]
pub struct GitDbs {
    entries: Vec<GitDbEntry>,
}

impl GitDbs {
    /// Load from a `gitdbs.json` file. A missing file is an empty
    /// configuration, not an error; operations then fall back to remote
    /// extraction where that is supported.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let entries: Vec<GitDbEntry> =
            serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
                message: format!("invalid gitdbs file '{}': {}", path.display(), e),
                hint: Some(
                    "expected a JSON array of {name, description, db-repo, local_path} records"
                        .to_string(),
                ),
            })?;

        Ok(Self { entries })
    }

    /// Write back to disk, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Look up the entry for a repository URL.
    pub fn find(&self, db_repo: &str) -> Option<&GitDbEntry> {
        self.entries.iter().find(|entry| entry.db_repo == db_repo)
    }

    /// Insert or replace the entry for the repository URL.
    pub fn upsert(&mut self, entry: GitDbEntry) {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.db_repo == entry.db_repo)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Remove the entry for a repository URL. Returns whether one existed.
    pub fn remove(&mut self, db_repo: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.db_repo != db_repo);
        self.entries.len() != before
    }

    pub fn entries(&self) -> &[GitDbEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A package's `pkg.json` metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageMeta {
    /// Declared semantic version. Required.
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Target database repository URL. Required for publish.
    #[serde(rename = "db-repo", default, skip_serializing_if = "Option::is_none")]
    pub db_repo: Option<String>,

    /// Path of the package inside the database repository.
    #[serde(rename = "root-dir", default)]
    pub root_dir: String,

    /// Branch the package content is pushed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// How versions serialize into tag names.
    #[serde(rename = "tag-style", default)]
    pub tag_style: TagStyle,
}

impl PackageMeta {
    /// Read and validate a metadata file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigParse {
                message: format!("meta file not found: {}", path.display()),
                hint: Some("publish expects a pkg.json in the package directory".to_string()),
            });
        }

        let content = fs::read_to_string(path)?;
        let meta: PackageMeta = serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
            message: format!("invalid meta file '{}': {}", path.display(), e),
            hint: Some("\"version\" is required; see also \"db-repo\" and \"root-dir\"".to_string()),
        })?;

        if meta.version.trim().is_empty() {
            return Err(Error::ConfigParse {
                message: format!("empty \"version\" in {}", path.display()),
                hint: Some("declare a semantic version, e.g. \"0.1.0\"".to_string()),
            });
        }

        Ok(meta)
    }

    /// Read `<pkg_dir>/<meta_file>`.
    pub fn from_dir(pkg_dir: &Path, meta_file: &str) -> Result<Self> {
        Self::from_file(&pkg_dir.join(meta_file))
    }

    /// The tag prefix for this package: `root-dir`, falling back to `name`.
    pub fn prefix(&self) -> &str {
        if !self.root_dir.is_empty() {
            &self.root_dir
        } else {
            self.name.as_deref().unwrap_or("")
        }
    }

    /// The branch to push to, defaulting to `main`.
    pub fn branch(&self) -> &str {
        self.branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }

    /// Human-readable package name for messages.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| {
                self.root_dir
                    .rsplit('/')
                    .next()
                    .filter(|segment| !segment.is_empty())
                    .unwrap_or("package")
            })
    }

    /// The target repository URL, required for publish.
    pub fn require_db_repo(&self) -> Result<&str> {
        self.db_repo
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::ConfigParse {
                message: "no \"db-repo\" declared for this package".to_string(),
                hint: Some("add \"db-repo\": \"<repository url>\" to pkg.json".to_string()),
            })
    }
}

/// One entry in the load manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRequest {
    #[serde(rename = "db-repo")]
    pub db_repo: String,

    #[serde(rename = "root-dir", default)]
    pub root_dir: String,

    /// Version specifier; absent means the branch is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(rename = "target-dir", default, skip_serializing_if = "Option::is_none")]
    pub target_dir: Option<String>,
}

impl PackageRequest {
    pub fn branch(&self) -> &str {
        self.branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }
}

/// The load manifest: named packages to load in one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadManifest {
    pub packages: BTreeMap<String, PackageRequest>,
}

impl LoadManifest {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigParse {
                message: format!("manifest not found: {}", path.display()),
                hint: None,
            });
        }

        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
            message: format!("invalid manifest '{}': {}", path.display(), e),
            hint: Some(
                "expected {\"packages\": {<name>: {\"db-repo\": ..., \"root-dir\": ...}}}"
                    .to_string(),
            ),
        })
    }
}

/// Expand a leading `~` to the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            let rest = rest.strip_prefix('/').unwrap_or(rest);
            if rest.is_empty() {
                return home;
            }
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Derive a repository name from its URL's last path segment, trimming a
/// `.git` suffix.
fn derive_repo_name(url: &str) -> Result<String> {
    let segment = if url.contains("://") {
        let parsed = Url::parse(url)?;
        parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
            .map(|s| s.to_string())
    } else {
        url.rsplit('/').find(|s| !s.is_empty()).map(|s| s.to_string())
    };

    segment
        .map(|name| name.trim_end_matches(".git").to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::ConfigParse {
            message: format!("cannot derive a repository name from '{}'", url),
            hint: None,
        })
}
