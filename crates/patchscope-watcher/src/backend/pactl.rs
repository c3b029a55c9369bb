//! PulseAudio / PipeWire backend driven through `pactl --format=json`

use std::collections::BTreeMap;

use patchscope_core::{Category, RawEntity, RawRouting};
use serde::Deserialize;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, info};

use super::{AudioBackend, BackendError};

const DEFAULT_PROGRAM: &str = "pactl";

/// One entry of a `pactl --format=json list ...` array. Only the fields
/// the snapshot needs are read; everything else is ignored.
#[derive(Debug, Deserialize)]
struct PactlEntry {
    index: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    sink: Option<Value>,
    #[serde(default)]
    source: Option<Value>,
    #[serde(default)]
    properties: BTreeMap<String, Value>,
}

pub struct PactlBackend {
    program: String,
}

impl PactlBackend {
    /// Probe the audio server with `pactl info`. Failure here is fatal for
    /// the caller.
    pub async fn connect() -> Result<Self, BackendError> {
        Self::connect_with(DEFAULT_PROGRAM).await
    }

    pub async fn connect_with(program: impl Into<String>) -> Result<Self, BackendError> {
        let program = program.into();
        let output = Command::new(&program)
            .arg("info")
            .output()
            .await
            .map_err(|e| BackendError::Unavailable(format!("cannot run {}: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::Unavailable(
                stderr.lines().last().unwrap_or("no response").to_string(),
            ));
        }

        info!("Connected to audio server via {}", program);
        Ok(PactlBackend { program })
    }

    async fn list(&self, category: Category) -> Result<Vec<RawEntity>, BackendError> {
        let kind = list_kind(category);
        let command = format!("{} --format=json list {}", self.program, kind);

        let output = Command::new(&self.program)
            .args(["--format=json", "list", kind])
            .output()
            .await
            .map_err(|e| BackendError::Command {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::Command {
                command,
                message: format!(
                    "exit {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr.lines().last().unwrap_or("unknown error")
                ),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let entities = parse_listing(category, &stdout).map_err(|source| BackendError::Malformed {
            origin: command,
            source,
        })?;
        debug!("Listed {} {}", entities.len(), kind);
        Ok(entities)
    }
}

#[async_trait::async_trait]
impl AudioBackend for PactlBackend {
    async fn sample(&self) -> Result<RawRouting, BackendError> {
        Ok(RawRouting {
            sinks: self.list(Category::Sink).await?,
            sources: self.list(Category::Source).await?,
            sink_inputs: self.list(Category::SinkInput).await?,
            source_outputs: self.list(Category::SourceOutput).await?,
        })
    }

    fn name(&self) -> &str {
        "pactl"
    }
}

impl Drop for PactlBackend {
    fn drop(&mut self) {
        info!("Released audio server connection");
    }
}

fn list_kind(category: Category) -> &'static str {
    match category {
        Category::Sink => "sinks",
        Category::Source => "sources",
        Category::SinkInput => "sink-inputs",
        Category::SourceOutput => "source-outputs",
        Category::Unknown => "modules",
    }
}

/// Parse one `pactl --format=json list` array into raw entities.
///
/// States are lowercased. A playback stream's target is its `sink`, a
/// recording stream's its `source`; devices have no target.
pub fn parse_listing(category: Category, json: &str) -> Result<Vec<RawEntity>, serde_json::Error> {
    let entries: Vec<PactlEntry> = serde_json::from_str(json)?;
    Ok(entries
        .into_iter()
        .map(|entry| {
            let target = match category {
                Category::SinkInput => entry.sink.as_ref(),
                Category::SourceOutput => entry.source.as_ref(),
                _ => None,
            }
            .and_then(Value::as_u64)
            .and_then(|index| u32::try_from(index).ok());

            RawEntity {
                index: entry.index,
                name: entry.name,
                description: entry.description,
                state: entry.state.map(|s| s.to_lowercase()),
                target,
                properties: entry
                    .properties
                    .into_iter()
                    .map(|(key, value)| (key, property_text(value)))
                    .collect(),
            }
        })
        .collect())
}

fn property_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
