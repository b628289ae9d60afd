//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ReferenceError: malformed `uses` strings
//! - ResolveError: GitHub lookups (remote state and transport failures)
//! - CheckError: a resolution failure attributed to one action
//! - WorkflowError: workflow file reading and rewriting
//! - ConfigError: configuration file loading

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Workflow file related errors
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Resolution errors
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while parsing an `owner/repo[/path]@ref` string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// No `@` separating the action path from its ref
    #[error("invalid action format: {uses}")]
    InvalidFormat { uses: String },

    /// No `/` after the owner segment
    #[error("invalid action path: {path}")]
    InvalidPath { path: String },
}

/// Errors raised while resolving versions against GitHub
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Neither a tag nor a branch exists with this name
    #[error("ref '{reference}' not found in {repository}")]
    RefNotFound {
        repository: String,
        reference: String,
    },

    /// Tags exist but none satisfies the constraint
    #[error("no compatible tags found in {repository} for pattern {pattern}")]
    NoMatchingTags { repository: String, pattern: String },

    /// Repository has no tags at all
    #[error("no tags found in {repository}")]
    NoTagsFound { repository: String },

    /// No tag belongs to the requested major version
    #[error("no tags found in {repository} for major version v{major}")]
    NoTagsForMajor { repository: String, major: String },

    /// Transport or provider failure
    #[error("failed to fetch {repository}: {message}")]
    Network { repository: String, message: String },

    /// Rate limit exceeded
    #[error("GitHub API rate limit exceeded while fetching {repository} (set GITHUB_TOKEN to raise it)")]
    RateLimitExceeded { repository: String },

    /// Request timed out
    #[error("timeout while fetching {repository}")]
    Timeout { repository: String },

    /// Response body could not be decoded
    #[error("invalid response from GitHub for {repository}: {message}")]
    InvalidResponse { repository: String, message: String },
}

/// A single action's resolution failure, which aborts the scan
#[derive(Error, Debug, Clone)]
#[error("failed to check {action}: {source}")]
pub struct CheckError {
    /// Action name (`owner/repo[/path]`)
    pub action: String,
    /// Underlying resolution error
    #[source]
    pub source: ResolveError,
}

/// Errors related to workflow files
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Workflow path does not exist
    #[error("workflow path not found: {path}")]
    NotFound { path: PathBuf },

    /// Directory contains no workflow files
    #[error("no workflow files found in {path}")]
    NoWorkflows { path: PathBuf },

    /// Failed to read a workflow file
    #[error("failed to read workflow file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a workflow file
    #[error("failed to write workflow file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither the old nor the new uses literal is present
    #[error("action '{uses}' not found in {path}")]
    UsesNotFound { path: PathBuf, uses: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

impl ResolveError {
    /// Creates a new RefNotFound error
    pub fn ref_not_found(repository: impl Into<String>, reference: impl Into<String>) -> Self {
        ResolveError::RefNotFound {
            repository: repository.into(),
            reference: reference.into(),
        }
    }

    /// Creates a new NoMatchingTags error
    pub fn no_matching_tags(repository: impl Into<String>, pattern: impl Into<String>) -> Self {
        ResolveError::NoMatchingTags {
            repository: repository.into(),
            pattern: pattern.into(),
        }
    }

    /// Creates a new NoTagsFound error
    pub fn no_tags_found(repository: impl Into<String>) -> Self {
        ResolveError::NoTagsFound {
            repository: repository.into(),
        }
    }

    /// Creates a new NoTagsForMajor error
    pub fn no_tags_for_major(repository: impl Into<String>, major: impl Into<String>) -> Self {
        ResolveError::NoTagsForMajor {
            repository: repository.into(),
            major: major.into(),
        }
    }

    /// Creates a new Network error
    pub fn network(repository: impl Into<String>, message: impl Into<String>) -> Self {
        ResolveError::Network {
            repository: repository.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimitExceeded error
    pub fn rate_limit_exceeded(repository: impl Into<String>) -> Self {
        ResolveError::RateLimitExceeded {
            repository: repository.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(repository: impl Into<String>) -> Self {
        ResolveError::Timeout {
            repository: repository.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(repository: impl Into<String>, message: impl Into<String>) -> Self {
        ResolveError::InvalidResponse {
            repository: repository.into(),
            message: message.into(),
        }
    }

    /// Whether this failure describes remote state and may be cached
    ///
    /// Transport failures may be transient and are never cached.
    pub fn is_cacheable(&self) -> bool {
        matches!(
            self,
            ResolveError::NoMatchingTags { .. }
                | ResolveError::NoTagsFound { .. }
                | ResolveError::NoTagsForMajor { .. }
        )
    }
}

impl WorkflowError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WorkflowError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WorkflowError::WriteError {
            path: path.into(),
            source,
        }
    }
}
