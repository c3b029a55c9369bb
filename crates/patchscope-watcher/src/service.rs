//! Poll service: sample the backend on a fixed interval and redraw on change

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use patchscope_core::{Snapshot, SnapshotRecord, VisualizerConfig, save_record};
use patchscope_render::{Frame, Renderer};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::backend::AudioBackend;
use crate::cycle::{CycleOutcome, Pipeline};

/// Drives one backend, one pipeline and one renderer.
pub struct PollService<B, R> {
    backend: B,
    renderer: R,
    pipeline: Pipeline,
    output_dir: PathBuf,
    interval: Duration,
}

impl<B: AudioBackend, R: Renderer> PollService<B, R> {
    pub fn new(backend: B, renderer: R, config: &VisualizerConfig) -> Self {
        PollService {
            backend,
            renderer,
            pipeline: Pipeline::from_config(config),
            output_dir: config.output_dir.clone(),
            interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    /// Sample once. On change, persist a record and redraw. Returns the
    /// outcome; its snapshot is the previous snapshot for the next call.
    pub async fn run_cycle(&mut self, previous: Option<&Snapshot>) -> Result<CycleOutcome> {
        let raw = self
            .backend
            .sample()
            .await
            .with_context(|| format!("Failed to sample {} backend", self.backend.name()))?;

        let outcome = self.pipeline.process(previous, &raw);
        if let Some(view) = &outcome.view {
            let now = Local::now();
            let record = SnapshotRecord::new(&outcome.snapshot, &outcome.changes);
            let path = save_record(&record, &self.output_dir, now)
                .context("Failed to save snapshot record")?;
            debug!("Saved {}", path.display());

            self.renderer
                .render(&Frame {
                    graph: &view.graph,
                    layout: &view.layout,
                    updated_at: now,
                })
                .context("Failed to render graph")?;
        }

        Ok(outcome)
    }

    /// Poll until `shutdown` resolves. The previous snapshot is carried from
    /// each cycle into the next. Returns the number of completed cycles.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<usize>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            "Polling {} backend every {:?}",
            self.backend.name(),
            self.interval
        );

        let mut previous: Option<Snapshot> = None;
        let mut cycles = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down after {} cycles", cycles);
                    break;
                }
                _ = ticker.tick() => {
                    let outcome = self.run_cycle(previous.as_ref()).await?;
                    previous = Some(outcome.snapshot);
                    cycles += 1;
                }
            }
        }

        Ok(cycles)
    }
}
