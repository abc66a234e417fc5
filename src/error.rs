//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `gitpkg` application. It uses the `thiserror` library to create a
//! comprehensive `Error` enum that covers all anticipated failure modes,
//! providing clear and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the application. Each variant corresponds to a specific
//!   type of error and includes contextual information to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the application to simplify function signatures and ensure
//!   type safety.
//!
//! External tool failures are opaque and non-retriable: the underlying
//! command's stderr text is carried verbatim, but no attempt is made to
//! classify the cause (network vs. permission vs. missing ref). Every
//! failure is returned to the caller as a tagged result; nothing in the
//! library retries or panics.

use thiserror::Error;

/// Main error type for gitpkg operations
#[derive(Error, Debug)]
pub enum Error {
    /// A requested exact version or literal tag does not exist among the
    /// repository's tags.
    #[error("Tag not found: '{tag}'")]
    TagNotFound { tag: String },

    /// A `latest` or range specifier matched no candidate tag under the
    /// package prefix.
    #[error("No version matching '{spec}' under prefix '{prefix}'")]
    NoMatchingVersion { spec: String, prefix: String },

    /// A declared or requested version string does not parse as a semantic
    /// version.
    #[error("Invalid version '{version}': {message}")]
    InvalidVersion { version: String, message: String },

    /// A publish would overwrite an existing tag and the force flag was not
    /// given.
    #[error("Tag '{tag}' already exists. Pass --force to overwrite it")]
    TagAlreadyExists { tag: String },

    /// An external git invocation exited non-zero.
    ///
    /// Includes the subcommand, the repository path or URL it ran against,
    /// and the tool's own stderr text.
    #[error("git {command} failed for {context}: {stderr}")]
    GitCommand {
        command: String,
        context: String,
        stderr: String,
    },

    /// The subfolder-extraction tool exited non-zero.
    #[error("Extraction failed for {target}: {message}")]
    Extraction { target: String, message: String },

    /// An error occurred while parsing a configuration or metadata file.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A repository has no entry in the gitdbs configuration where one is
    /// required.
    #[error("No local repository configured for {repo}. Check {config_path}")]
    RepoNotConfigured { repo: String, config_path: String },

    /// A configured local path or requested package subfolder does not exist.
    #[error("Path does not exist: {path}")]
    PathMissing { path: String },

    /// An error occurred with a filesystem operation.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
