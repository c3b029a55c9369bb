//! Snapshot records written on every change event

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::diff::{ChangeSet, ChangedItems};
use crate::error::{PatchscopeError, Result};
use crate::model::{Connections, Node, Snapshot};

/// Default directory for records and rendered graphs.
pub const DEFAULT_OUTPUT_DIR: &str = "./graphs";

/// File name prefix of snapshot records.
pub const RECORD_PREFIX: &str = "state_";

/// Timestamp format shared by every file written to the output directory.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// A persisted change event: the snapshot plus what changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    #[serde(default)]
    pub sinks: BTreeMap<u32, Node>,
    #[serde(default)]
    pub sources: BTreeMap<u32, Node>,
    #[serde(default)]
    pub sink_inputs: BTreeMap<u32, Node>,
    #[serde(default)]
    pub source_outputs: BTreeMap<u32, Node>,
    #[serde(default)]
    pub connections: Connections,
    #[serde(default)]
    pub has_changed: bool,
    #[serde(default)]
    pub changed_items: ChangedItems,
}

impl SnapshotRecord {
    pub fn new(snapshot: &Snapshot, changes: &ChangeSet) -> Self {
        SnapshotRecord {
            sinks: snapshot.sinks.clone(),
            sources: snapshot.sources.clone(),
            sink_inputs: snapshot.sink_inputs.clone(),
            source_outputs: snapshot.source_outputs.clone(),
            connections: snapshot.connections.clone(),
            has_changed: changes.has_changed,
            changed_items: changes.changed_items.clone(),
        }
    }

    pub fn into_snapshot(self) -> Snapshot {
        Snapshot {
            sinks: self.sinks,
            sources: self.sources,
            sink_inputs: self.sink_inputs,
            source_outputs: self.source_outputs,
            connections: self.connections,
        }
    }
}

/// `<prefix><timestamp>.<extension>`
pub fn timestamped_name(prefix: &str, at: DateTime<Local>, extension: &str) -> String {
    format!("{}{}.{}", prefix, at.format(TIMESTAMP_FORMAT), extension)
}

/// Ensure output directory exists
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| PatchscopeError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Write a record as pretty JSON to `dir/state_<timestamp>.json`.
pub fn save_record(record: &SnapshotRecord, dir: &Path, at: DateTime<Local>) -> Result<PathBuf> {
    ensure_output_dir(dir)?;
    let path = dir.join(timestamped_name(RECORD_PREFIX, at, "json"));
    let json = serde_json::to_string_pretty(record).map_err(PatchscopeError::Serialize)?;
    std::fs::write(&path, json).map_err(|source| PatchscopeError::Write {
        path: path.clone(),
        source,
    })?;

    tracing::debug!("Snapshot record saved: {}", path.display());
    Ok(path)
}

/// Load a record from a JSON file.
pub fn load_record(path: &Path) -> Result<SnapshotRecord> {
    let json = std::fs::read_to_string(path).map_err(|source| PatchscopeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| PatchscopeError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Path of the newest record in `dir`. Timestamps sort lexically, so the
/// greatest file name is the newest.
pub fn latest_record_path(dir: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dir).map_err(|source| PatchscopeError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(RECORD_PREFIX) && n.ends_with(".json"))
        })
        .max()
        .ok_or_else(|| PatchscopeError::NoRecord(dir.to_path_buf()))
}

/// Load the newest record in `dir`.
pub fn load_latest_record(dir: &Path) -> Result<SnapshotRecord> {
    let path = latest_record_path(dir)?;
    tracing::info!("Loading snapshot record {}", path.display());
    load_record(&path)
}
