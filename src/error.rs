//! Error types.
//!
//! None of these abort a query: a document that produces one is logged and
//! dropped from the working set.

use std::path::PathBuf;
use thiserror::Error;

/// A metadata block was present between the delimiters but could not be used.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrontmatterError {
    #[error("frontmatter is not valid YAML: {0}")]
    Malformed(String),

    #[error("frontmatter decoded to a {0}, expected a mapping")]
    NotAMapping(&'static str),
}

/// A single document could not be turned into a record.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("`{0}` has no file name to derive a slug from")]
    InvalidPath(String),

    #[error("`{path}`: location must be a mapping or a string")]
    InvalidLocation { path: String },

    #[error("`{path}`: {source}")]
    Location {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Failures of the document source collaborator.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error when reading `{0}`")]
    Io(String, #[source] std::io::Error),

    #[error("no document at `{0}`")]
    NotFound(String),

    #[error("directory walk was interrupted")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
