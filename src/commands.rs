//! CLI command implementations

use anyhow::Context;
use chrono::Local;
use patchscope_core::{VisualizerConfig, load_latest_record, load_record};
use patchscope_render::{DotRenderer, Frame, Renderer};
use patchscope_watcher::{AudioBackend, PactlBackend, Pipeline, PollService, ReplayBackend};
use std::path::{Path, PathBuf};

pub fn load_config(path: Option<&Path>) -> anyhow::Result<VisualizerConfig> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            VisualizerConfig::load(path)
                .with_context(|| format!("Invalid configuration file {}", path.display()))
        }
        None => Ok(VisualizerConfig::default()),
    }
}

fn log_filters(config: &VisualizerConfig) {
    tracing::info!("Ignore list: {:?}", config.ignore);
    tracing::info!("Hide list: {:?}", config.hide);
    if config.active_only {
        tracing::info!("Showing running nodes only");
    }
}

pub async fn watch(config: VisualizerConfig, replay: Option<PathBuf>) -> anyhow::Result<()> {
    log_filters(&config);
    let renderer = DotRenderer::new(&config.output_dir, config.text_wrap);
    tracing::info!("Writing graphs to {}", config.output_dir.display());

    match replay {
        Some(path) => {
            let backend = ReplayBackend::open(&path)
                .await
                .with_context(|| format!("Cannot replay {}", path.display()))?;
            poll(backend, renderer, &config).await
        }
        None => {
            let backend = PactlBackend::connect()
                .await
                .context("Cannot connect to the audio server")?;
            poll(backend, renderer, &config).await
        }
    }
}

async fn poll<B: AudioBackend>(
    backend: B,
    renderer: DotRenderer,
    config: &VisualizerConfig,
) -> anyhow::Result<()> {
    let service = PollService::new(backend, renderer, config);
    let cycles = service.run_until(interrupted()).await?;
    tracing::info!("Stopped after {} polls", cycles);
    Ok(())
}

/// Resolves on Ctrl-C.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

pub fn render(config: VisualizerConfig, state: Option<PathBuf>) -> anyhow::Result<()> {
    log_filters(&config);

    let record = match state {
        Some(path) => load_record(&path)?,
        None => load_latest_record(&config.output_dir)?,
    };
    let snapshot = record.into_snapshot();
    let view = Pipeline::from_config(&config).view(&snapshot);

    let mut renderer = DotRenderer::new(&config.output_dir, config.text_wrap);
    renderer.render(&Frame {
        graph: &view.graph,
        layout: &view.layout,
        updated_at: Local::now(),
    })?;

    tracing::info!("Rendered to {}", renderer.latest_path().display());
    Ok(())
}
