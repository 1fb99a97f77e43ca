//! Error type for the lint library

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LintError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {0}")]
    Parse(String),

    #[error("unknown rule `{0}`")]
    UnknownRule(String),

    #[error("invalid options for rule `{rule}`: {message}")]
    InvalidOptions { rule: String, message: String },

    #[error("invalid setting `{key}`: {message}")]
    InvalidSettings { key: String, message: String },

    #[error("{0}")]
    Config(String),
}
