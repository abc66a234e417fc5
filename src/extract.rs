//! Subfolder extraction for repositories without a configured local clone.
//!
//! Wraps a degit-style external tool that fetches a repository tree at a
//! given reference into an output directory without version-control
//! history. Only success/failure and the populated directory are consumed;
//! the tool's stderr is preserved in [Error::Extraction] on failure.

use std::path::Path;
use std::process::Command;

use log::debug;
use url::Url;

use crate::error::{Error, Result};

/// Environment variable overriding the extraction tool binary.
pub const EXTRACT_TOOL_ENV: &str = "GITPKG_DEGIT";

const DEFAULT_EXTRACT_TOOL: &str = "degit";

/// A repository reference in `owner/repo[#ref]` or full-URL form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// `owner/repo` shorthand or a full clone URL.
    pub target: String,
    /// Optional branch, tag, or commit to extract.
    pub refname: Option<String>,
}

impl RepoRef {
    /// Parse `owner/repo`, `owner/repo#ref`, or a full URL (with optional
    /// `#ref` fragment).
    pub fn parse(input: &str) -> Result<Self> {
        let (target, refname) = match input.split_once('#') {
            Some((target, refname)) if !refname.is_empty() => {
                (target.to_string(), Some(refname.to_string()))
            }
            Some((target, _)) => (target.to_string(), None),
            None => (input.to_string(), None),
        };

        if target.is_empty() {
            return Err(Error::ConfigParse {
                message: "empty repository reference".to_string(),
                hint: Some("expected owner/repo, owner/repo#ref, or a repository URL".to_string()),
            });
        }

        if target.contains("://") {
            // Full URL form: validate it parses
            Url::parse(&target)?;
        } else if target.split('/').filter(|part| !part.is_empty()).count() < 2 {
            return Err(Error::ConfigParse {
                message: format!("invalid repository reference '{}'", target),
                hint: Some("expected owner/repo, owner/repo#ref, or a repository URL".to_string()),
            });
        }

        Ok(Self { target, refname })
    }

    /// Build a reference from a repository URL, keeping the URL intact.
    pub fn from_url(url: &str) -> Result<Self> {
        Self::parse(url)
    }

    /// The same repository pinned to a resolved ref.
    pub fn with_ref(&self, refname: &str) -> Self {
        Self {
            target: self.target.clone(),
            refname: Some(refname.to_string()),
        }
    }

    /// URL usable with `git ls-remote`; shorthand resolves against GitHub,
    /// matching the extraction tool's own convention.
    pub fn clone_url(&self) -> String {
        if self.target.contains("://") {
            self.target.clone()
        } else {
            format!("https://github.com/{}", self.target)
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.refname {
            Some(refname) => write!(f, "{}#{}", self.target, refname),
            None => write!(f, "{}", self.target),
        }
    }
}

/// Capability trait for the subfolder-extraction tool.
pub trait Extraction: Send + Sync {
    /// Populate `dest` with the repository tree at `repo`'s ref.
    fn extract(&self, repo: &RepoRef, dest: &Path) -> Result<()>;
}

/// Default [Extraction] implementation invoking the external degit binary.
#[derive(Debug, Clone)]
pub struct DegitCli {
    program: String,
}

impl DegitCli {
    /// Use the binary named by `GITPKG_DEGIT`, falling back to `degit`.
    pub fn from_env() -> Self {
        let program = std::env::var(EXTRACT_TOOL_ENV)
            .unwrap_or_else(|_| DEFAULT_EXTRACT_TOOL.to_string());
        Self { program }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for DegitCli {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Extraction for DegitCli {
    fn extract(&self, repo: &RepoRef, dest: &Path) -> Result<()> {
        let spec = repo.to_string();
        let dest_str = dest.display().to_string();

        debug!("running {} {} {}", self.program, spec, dest_str);

        let output = Command::new(&self.program)
            .args([spec.as_str(), dest_str.as_str(), "--force"])
            .output()
            .map_err(|e| Error::Extraction {
                target: spec.clone(),
                message: format!("failed to run '{}': {}", self.program, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::Extraction {
                target: spec,
                message: stderr,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shorthand() {
        let repo = RepoRef::parse("crimson206/test-db").unwrap();
        assert_eq!(repo.target, "crimson206/test-db");
        assert_eq!(repo.refname, None);
    }

    #[test]
    fn test_parse_shorthand_with_ref() {
        let repo = RepoRef::parse("crimson206/test-db#pkg/v0.1.0").unwrap();
        assert_eq!(repo.target, "crimson206/test-db");
        assert_eq!(repo.refname.as_deref(), Some("pkg/v0.1.0"));
    }

    #[test]
    fn test_parse_full_url() {
        let repo = RepoRef::parse("https://github.com/crimson206/test-db").unwrap();
        assert_eq!(repo.target, "https://github.com/crimson206/test-db");
        assert_eq!(repo.refname, None);
    }

    #[test]
    fn test_parse_full_url_with_ref() {
        let repo = RepoRef::parse("https://github.com/crimson206/test-db#main").unwrap();
        assert_eq!(repo.target, "https://github.com/crimson206/test-db");
        assert_eq!(repo.refname.as_deref(), Some("main"));
    }

    #[test]
    fn test_parse_rejects_bare_name() {
        assert!(RepoRef::parse("just-a-name").is_err());
        assert!(RepoRef::parse("").is_err());
    }

    #[test]
    fn test_with_ref_pins_resolved_tag() {
        let repo = RepoRef::parse("owner/repo").unwrap();
        let pinned = repo.with_ref("pkg/v1.2.0");
        assert_eq!(pinned.to_string(), "owner/repo#pkg/v1.2.0");
        // Original is untouched
        assert_eq!(repo.to_string(), "owner/repo");
    }

    #[test]
    fn test_display_round_trip() {
        let repo = RepoRef::parse("owner/repo#v1.0.0").unwrap();
        assert_eq!(RepoRef::parse(&repo.to_string()).unwrap(), repo);
    }

    #[test]
    fn test_degit_missing_binary_is_extraction_error() {
        let degit = DegitCli::with_program("gitpkg-nonexistent-extractor");
        let repo = RepoRef::parse("owner/repo").unwrap();
        let temp = tempfile::TempDir::new().unwrap();
        let err = degit.extract(&repo, temp.path()).unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }
}
