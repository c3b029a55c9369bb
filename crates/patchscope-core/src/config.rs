//! Visualizer configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builder::BuildOptions;
use crate::embedding::DEFAULT_SEED;
use crate::error::{PatchscopeError, Result};
use crate::layout::{DEFAULT_SCALE, LayoutOptions, OrderingMode};
use crate::persist::DEFAULT_OUTPUT_DIR;

/// Everything the user can tune. Every field has a default, so a config
/// file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Characters per line before a node label wraps.
    pub text_wrap: usize,
    /// Substrings removed from labels.
    pub hide: Vec<String>,
    /// Nodes whose label contains any of these are not drawn.
    pub ignore: Vec<String>,
    /// Only draw running nodes.
    pub active_only: bool,
    pub ordering: OrderingMode,
    pub poll_interval_ms: u64,
    /// Where snapshot records and rendered graphs go.
    pub output_dir: PathBuf,
    /// Seed for the force-directed embedding.
    pub seed: u64,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        VisualizerConfig {
            text_wrap: 30,
            hide: Vec::new(),
            ignore: Vec::new(),
            active_only: false,
            ordering: OrderingMode::ForceDirected,
            poll_interval_ms: 1000,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            seed: DEFAULT_SEED,
        }
    }
}

impl VisualizerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: VisualizerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PatchscopeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.text_wrap == 0 {
            return Err(PatchscopeError::Config("text_wrap must be at least 1".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(PatchscopeError::Config(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            hide: self.hide.clone(),
            ignore: self.ignore.clone(),
            active_only: self.active_only,
        }
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            ordering: self.ordering,
            seed: self.seed,
            scale: DEFAULT_SCALE,
        }
    }
}
