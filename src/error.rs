//! @ai:module:intent Define error types for resolving files and running linters
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for all global-linters operations
#[derive(Error, Debug)]
pub enum Error {
    /// Bad user input: an unresolvable token, an unusable glob or option string
    #[error("{0}")]
    Argument(String),

    /// Misconfigured ignore path, config file or linter registry entry
    #[error("{0}")]
    Config(String),

    #[error("Linter '{0}' is not supported.")]
    UnsupportedLinter(String),

    #[error("Could not find executable '{0}'.")]
    ExecutableNotFound(String),

    #[error("Could not find version for {linter} using '{linter} {flag}'.")]
    VersionParse { linter: String, flag: String },

    #[error("'{0}' is not a valid semver range.")]
    InvalidRange(String),

    #[error("{linter} {version} does not satisfy {range}.")]
    VersionMismatch {
        linter: String,
        version: semver::Version,
        range: String,
    },

    #[error("{linter} produced malformed structured output for {}: {message}", file.display())]
    OutputParse {
        linter: String,
        file: PathBuf,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
