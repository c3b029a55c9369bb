//! Audio backends: where raw routing listings come from

pub mod pactl;
pub mod replay;

use std::path::PathBuf;

use patchscope_core::RawRouting;
use thiserror::Error;

pub use pactl::PactlBackend;
pub use replay::ReplayBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The audio server could not be reached at startup
    #[error("audio backend unavailable: {0}")]
    Unavailable(String),

    /// A backend command ran but reported failure
    #[error("`{command}` failed: {message}")]
    Command { command: String, message: String },

    /// Backend output could not be parsed
    #[error("malformed output from {origin}: {source}")]
    Malformed {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// A replay file could not be read
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A source of routing listings, sampled once per poll.
#[async_trait::async_trait]
pub trait AudioBackend: Send + Sync {
    /// Fetch the current listings for all four categories.
    async fn sample(&self) -> Result<RawRouting, BackendError>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}
