//! # Version Resolution and Tag Naming
//!
//! This module is the core of `gitpkg`: it translates a user-supplied
//! version specifier plus a list of existing tag strings into either the
//! single tag to check out (load) or the canonical tag name to create
//! (publish), and decides what to do when a publish collides with an
//! existing tag.
//!
//! ## Tag layout
//!
//! Packages share one database repository, so each package's tags are
//! namespaced by a slash-separated prefix (its `root-dir` or `name`):
//!
//! ```text
//! packages/example_pkg/v0.1.0
//! packages/example_pkg/v0.2.0
//! packages/utils_pkg/v1.0.0
//! ```
//!
//! Resolution is always scoped to one prefix: a package's `latest` never
//! selects another package's tag. The version suffix may carry an optional
//! `v`/`V` prefix depending on the configured [TagStyle].
//!
//! ## Purity
//!
//! Every function here is a pure function of its inputs. No network or
//! filesystem access happens in this module, so resolution behavior can be
//! unit-tested against fixed tag lists.

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How a package serializes its version component into a tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagStyle {
    /// `{prefix}/v{version}`, the default.
    #[default]
    VPrefixed,
    /// `{prefix}/{version}` without the `v` marker.
    Bare,
}

/// A parsed user-supplied version specifier.
#[derive(Debug, Clone, PartialEq)]
pub enum VersionSpecifier {
    /// The literal token `latest`: highest version under the prefix.
    Latest,
    /// An exact version such as `1.0.0` or `v1.0.0`.
    Exact(Version),
    /// A comparator expression such as `>=1.0.0`, `~1.2`, or `^2.0`.
    Range(VersionReq),
    /// Any other string, used verbatim as a tag name.
    Literal(String),
}

impl VersionSpecifier {
    /// Parse a raw specifier string.
    ///
    /// Slash-containing inputs are always literal tag names. Inputs that
    /// look like a comparator expression but do not parse are rejected as
    /// `InvalidVersion` rather than silently demoted to a literal tag.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidVersion {
                version: input.to_string(),
                message: "empty version specifier".to_string(),
            });
        }

        if trimmed.eq_ignore_ascii_case("latest") {
            return Ok(VersionSpecifier::Latest);
        }

        // Full tag names carry the package prefix, e.g. "pkg/v0.1.1".
        if trimmed.contains('/') {
            return Ok(VersionSpecifier::Literal(trimmed.to_string()));
        }

        if let Some(version) = parse_lenient_version(trimmed) {
            return Ok(VersionSpecifier::Exact(version));
        }

        if looks_like_range(trimmed) {
            let req = VersionReq::parse(trimmed).map_err(|e| Error::InvalidVersion {
                version: trimmed.to_string(),
                message: e.to_string(),
            })?;
            return Ok(VersionSpecifier::Range(req));
        }

        Ok(VersionSpecifier::Literal(trimmed.to_string()))
    }
}

impl std::fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionSpecifier::Latest => write!(f, "latest"),
            VersionSpecifier::Exact(v) => write!(f, "{}", v),
            VersionSpecifier::Range(req) => write!(f, "{}", req),
            VersionSpecifier::Literal(s) => write!(f, "{}", s),
        }
    }
}

/// The decision returned by [check_conflict] for a publish attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictDecision {
    /// The tag does not exist yet; create it directly.
    Proceed,
    /// The tag exists and force was given; delete then recreate.
    Override(OverridePlan),
    /// The tag exists and force was not given.
    Rejected,
}

/// Delete-then-recreate plan for a forced tag overwrite.
///
/// The delete step always precedes the create step: the prior tag must be
/// removed both locally and remotely before the new one is created, to
/// avoid a detached duplicate tag state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverridePlan {
    /// Tag to delete locally and on the remote.
    pub delete: String,
    /// Tag to create afterwards. Identical to `delete` for a re-publish.
    pub create: String,
}

/// Resolve a load specifier against the repository's existing tags.
///
/// `existing_tags` is the full tag list visible in the target repository;
/// `prefix` scopes which tags belong to the package being loaded. Returns
/// the tag name to check out.
///
/// - `latest` selects the highest semantic version under the prefix
///   (pre-releases sort below the corresponding release).
/// - A range selects the highest version satisfying it.
/// - An exact version matches a candidate tag by parsed version, so both
///   `pkg/v1.2.3` and `pkg/1.2.3` layouts resolve.
/// - A literal tag is returned unchanged when present among
///   `existing_tags`.
pub fn resolve_for_load(
    specifier: &VersionSpecifier,
    existing_tags: &[String],
    prefix: &str,
) -> Result<String> {
    match specifier {
        VersionSpecifier::Literal(tag) => {
            if existing_tags.iter().any(|t| t == tag) {
                Ok(tag.clone())
            } else {
                Err(Error::TagNotFound { tag: tag.clone() })
            }
        }
        VersionSpecifier::Exact(version) => candidates(existing_tags, prefix)
            .into_iter()
            .find(|(_, v)| v == version)
            .map(|(tag, _)| tag)
            .ok_or_else(|| Error::TagNotFound {
                tag: compose_tag(prefix, &version.to_string(), TagStyle::VPrefixed),
            }),
        VersionSpecifier::Latest => candidates(existing_tags, prefix)
            .into_iter()
            .max_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(tag, _)| tag)
            .ok_or_else(|| Error::NoMatchingVersion {
                spec: "latest".to_string(),
                prefix: prefix.to_string(),
            }),
        VersionSpecifier::Range(req) => candidates(existing_tags, prefix)
            .into_iter()
            .filter(|(_, v)| req.matches(v))
            .max_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(tag, _)| tag)
            .ok_or_else(|| Error::NoMatchingVersion {
                spec: req.to_string(),
                prefix: prefix.to_string(),
            }),
    }
}

/// Compute the canonical tag name for publishing a package version.
///
/// Deterministic string composition with no I/O. Fails with
/// `InvalidVersion` when `declared_version` does not parse as a semantic
/// version.
pub fn compute_publish_tag(prefix: &str, declared_version: &str, style: TagStyle) -> Result<String> {
    let version = parse_lenient_version(declared_version).ok_or_else(|| Error::InvalidVersion {
        version: declared_version.to_string(),
        message: "expected MAJOR.MINOR.PATCH with optional pre-release/build metadata".to_string(),
    })?;

    Ok(compose_tag(prefix, &version.to_string(), style))
}

/// Decide how a publish should proceed given the repository's tag list.
///
/// Never returns `Proceed` for a tag that is already present; overwriting
/// requires the explicit force flag and goes through an [OverridePlan].
pub fn check_conflict(tag_name: &str, existing_tags: &[String], force: bool) -> ConflictDecision {
    let exists = existing_tags.iter().any(|t| t == tag_name);

    if !exists {
        ConflictDecision::Proceed
    } else if force {
        ConflictDecision::Override(OverridePlan {
            delete: tag_name.to_string(),
            create: tag_name.to_string(),
        })
    } else {
        ConflictDecision::Rejected
    }
}

/// Collect `(tag, version)` pairs for tags under `prefix` whose suffix
/// parses as a semantic version.
///
/// With an empty prefix the whole tag name is the version suffix, covering
/// repositories that tag at the root (`v1.0.0`).
fn candidates(existing_tags: &[String], prefix: &str) -> Vec<(String, Version)> {
    existing_tags
        .iter()
        .filter_map(|tag| {
            let suffix = if prefix.is_empty() {
                tag.as_str()
            } else {
                tag.strip_prefix(prefix)?.strip_prefix('/')?
            };
            parse_lenient_version(suffix).map(|version| (tag.clone(), version))
        })
        .collect()
}

/// Parse a version string, tolerating a leading `v` or `V`.
fn parse_lenient_version(input: &str) -> Option<Version> {
    let stripped = input.strip_prefix(['v', 'V']).unwrap_or(input);
    Version::parse(stripped).ok()
}

/// True when the input starts with comparator syntax (`>=1.0`, `~1.2`,
/// `^2.0`, `=1.0.0`, `*`, or a comma-separated requirement list).
fn looks_like_range(input: &str) -> bool {
    input.starts_with(['>', '<', '~', '^', '=', '*']) || input.contains(',')
}

fn compose_tag(prefix: &str, version: &str, style: TagStyle) -> String {
    let marker = match style {
        TagStyle::VPrefixed => "v",
        TagStyle::Bare => "",
    };
    if prefix.is_empty() {
        format!("{}{}", marker, version)
    } else {
        format!("{}/{}{}", prefix, marker, version)
    }
}
