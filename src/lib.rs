//! # gitpkg Library
//!
//! This library provides the core functionality for loading and publishing
//! package subfolders stored in shared git "database" repositories. It is
//! designed to be used by the `gitpkg` command-line tool but can also be
//! integrated into other applications that manage versioned package
//! content across repositories.
//!
//! ## Quick Example
//!
//! ```
//! use gitpkg::version::{resolve_for_load, VersionSpecifier};
//!
//! let tags = vec![
//!     "pkg/v1.0.0".to_string(),
//!     "pkg/v1.2.0".to_string(),
//!     "pkg/v1.1.0".to_string(),
//! ];
//!
//! let spec = VersionSpecifier::parse("latest").unwrap();
//! let resolved = resolve_for_load(&spec, &tags, "pkg").unwrap();
//! assert_eq!(resolved, "pkg/v1.2.0");
//! ```
//!
//! ## Core Concepts
//!
//! - **Version resolution (`version`)**: The pure core, translating a
//!   version specifier plus a tag list into the tag to check out (load) or
//!   the tag to create (publish), and deciding tag-conflict outcomes.
//! - **Configuration (`config`)**: Typed models for `gitdbs.json` (repository
//!   URL to local clone mapping), `pkg.json` (package metadata), and the
//!   load manifest.
//! - **Repository sources (`repository`, `git`, `extract`)**: One capability
//!   with two implementations: a configured local clone driven through the
//!   external `git` binary, or a remote fetch through a subfolder-extraction
//!   tool.
//! - **Staging filesystem (`filesystem`, `write`)**: An in-memory tree
//!   carrying a materialized package subfolder to its target directory.
//!
//! ## Execution Flow
//!
//! A `load` resolves the requested version against the repository's tags,
//! materializes the package subfolder at that ref, and writes it to the
//! target directory. A `publish` copies a local package folder into the
//! database clone, commits and pushes it, then computes the canonical tag
//! name, checks for conflicts, and creates and pushes the tag.

pub mod config;
pub mod defaults;
pub mod error;
pub mod extract;
pub mod filesystem;
pub mod git;
pub mod output;
pub mod repository;
pub mod version;
pub mod write;

#[cfg(test)]
mod version_proptest;
