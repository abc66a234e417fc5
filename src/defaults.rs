//! Default values for gitpkg configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

/// Default location of the repository configuration file, relative to the
/// working directory.
pub const DEFAULT_GITDBS_PATH: &str = ".gitpkg/gitdbs.json";

/// Default package metadata file name inside a package directory.
pub const DEFAULT_META_FILE: &str = "pkg.json";

/// Default load manifest location.
pub const DEFAULT_MANIFEST_PATH: &str = ".gitpkg/load.pkg.json";

/// Branch used when a package declares none.
pub const DEFAULT_BRANCH: &str = "main";

/// Remote used for pushes and remote tag deletion.
pub const DEFAULT_REMOTE: &str = "origin";
