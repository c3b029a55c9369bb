//! Poll service tests against a replayed backend

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use patchscope_core::{VisualizerConfig, load_latest_record};
use patchscope_render::{Frame, Renderer};
use tempfile::TempDir;

use crate::*;

/// Remembers the node count of every frame it was asked to draw.
#[derive(Clone, Default)]
struct CountingRenderer {
    frames: Arc<Mutex<Vec<usize>>>,
}

impl Renderer for CountingRenderer {
    fn render(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
        self.frames
            .lock()
            .map_err(|_| anyhow::anyhow!("poisoned"))?
            .push(frame.graph.node_count());
        Ok(())
    }
}

const SINGLE_ROUTE: &str = r#"{
    "sinks": [{"index": 1, "description": "Speakers", "state": "running"}],
    "sink_inputs": [{"index": 7, "target": 1, "properties": {"application.name": "Music Player"}}]
}"#;

const TWO_ROUTES: &str = r#"{
    "sinks": [{"index": 1, "description": "Speakers", "state": "running"}],
    "sink_inputs": [
        {"index": 7, "target": 1, "properties": {"application.name": "Music Player"}},
        {"index": 8, "target": 1, "properties": {"application.name": "Browser"}}
    ]
}"#;

fn config(dir: &Path) -> VisualizerConfig {
    VisualizerConfig {
        output_dir: dir.join("graphs"),
        poll_interval_ms: 10,
        ..Default::default()
    }
}

fn service(
    dir: &TempDir,
    routing: &str,
) -> (PollService<ReplayBackend, CountingRenderer>, Arc<Mutex<Vec<usize>>>) {
    let path = dir.path().join("routing.json");
    std::fs::write(&path, routing).unwrap();
    let backend = tokio_test::block_on(ReplayBackend::open(&path)).unwrap();
    let renderer = CountingRenderer::default();
    let frames = renderer.frames.clone();
    (PollService::new(backend, renderer, &config(dir.path())), frames)
}

#[test]
fn test_cycle_persists_and_renders_on_change() {
    let dir = TempDir::new().unwrap();
    let (mut service, frames) = service(&dir, SINGLE_ROUTE);

    let first = tokio_test::block_on(service.run_cycle(None)).unwrap();
    assert!(first.changes.has_changed);
    assert_eq!(*frames.lock().unwrap(), vec![2]);

    let record = load_latest_record(&dir.path().join("graphs")).unwrap();
    assert!(record.has_changed);
    assert_eq!(record.into_snapshot(), first.snapshot);
}

#[test]
fn test_unchanged_cycle_does_not_render() {
    let dir = TempDir::new().unwrap();
    let (mut service, frames) = service(&dir, SINGLE_ROUTE);

    let first = tokio_test::block_on(service.run_cycle(None)).unwrap();
    let second = tokio_test::block_on(service.run_cycle(Some(&first.snapshot))).unwrap();
    assert!(!second.changes.has_changed);
    assert_eq!(frames.lock().unwrap().len(), 1);
}

#[test]
fn test_new_stream_is_picked_up() {
    let dir = TempDir::new().unwrap();
    let (mut service, frames) = service(&dir, SINGLE_ROUTE);

    let first = tokio_test::block_on(service.run_cycle(None)).unwrap();
    std::fs::write(dir.path().join("routing.json"), TWO_ROUTES).unwrap();
    let second = tokio_test::block_on(service.run_cycle(Some(&first.snapshot))).unwrap();

    assert_eq!(
        second.changes.changed_items.get(patchscope_core::Category::SinkInput),
        &[8]
    );
    assert_eq!(*frames.lock().unwrap(), vec![2, 3]);
}

#[test]
fn test_broken_sample_is_an_error() {
    let dir = TempDir::new().unwrap();
    let (mut service, _) = service(&dir, SINGLE_ROUTE);
    std::fs::write(dir.path().join("routing.json"), "{").unwrap();

    let err = tokio_test::block_on(service.run_cycle(None)).unwrap_err();
    assert!(err.to_string().contains("replay"));
}

#[tokio::test]
async fn test_run_until_shutdown() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("routing.json");
    std::fs::write(&path, SINGLE_ROUTE).unwrap();
    let backend = ReplayBackend::open(&path).await.unwrap();
    let renderer = CountingRenderer::default();
    let frames = renderer.frames.clone();
    let service = PollService::new(backend, renderer, &config(dir.path()));

    let cycles = service
        .run_until(tokio::time::sleep(Duration::from_millis(55)))
        .await
        .unwrap();

    assert!(cycles >= 1);
    // routing never changes, so only the first cycle draws
    assert_eq!(frames.lock().unwrap().len(), 1);
}
