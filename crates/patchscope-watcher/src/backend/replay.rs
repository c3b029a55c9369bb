//! Backend that replays raw listings from a JSON file

use std::path::PathBuf;

use patchscope_core::RawRouting;
use tracing::info;

use super::{AudioBackend, BackendError};

/// Reads a [`RawRouting`] JSON file on every sample, so edits to the file
/// show up on the next poll.
#[derive(Debug, Clone)]
pub struct ReplayBackend {
    path: PathBuf,
}

impl ReplayBackend {
    /// Open a replay file. Fails if it cannot be read or parsed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let backend = ReplayBackend { path: path.into() };
        backend.read().await?;
        info!("Replaying routing from {}", backend.path.display());
        Ok(backend)
    }

    async fn read(&self) -> Result<RawRouting, BackendError> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| BackendError::Read {
                path: self.path.clone(),
                source,
            })?;
        serde_json::from_str(&json).map_err(|source| BackendError::Malformed {
            origin: self.path.display().to_string(),
            source,
        })
    }
}

#[async_trait::async_trait]
impl AudioBackend for ReplayBackend {
    async fn sample(&self) -> Result<RawRouting, BackendError> {
        self.read().await
    }

    fn name(&self) -> &str {
        "replay"
    }
}
