//! Error types for snapshot persistence and configuration

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the core crate.
///
/// The routing pipeline itself (normalize, diff, build, layout) is infallible;
/// only the edges of the system that touch the filesystem or parse user input
/// can fail.
#[derive(Debug, Error)]
pub enum PatchscopeError {
    /// Failed to read a file
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the output directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted record is not valid JSON
    #[error("invalid snapshot record '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize a snapshot record
    #[error("failed to serialize snapshot record: {0}")]
    Serialize(#[source] serde_json::Error),

    /// No `state_*.json` file in the output directory
    #[error("no snapshot records found in '{0}'")]
    NoRecord(PathBuf),

    /// Configuration file could not be parsed
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration values out of range
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PatchscopeError>;
