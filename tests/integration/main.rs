//! Integration tests for Patchscope
//!
//! These tests drive the public crates and the binary together.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};

use patchscope_core::{
    Category, EdgeColor, NodeId, OrderingMode, Position, RawEntity, RawRouting, VisualizerConfig,
};
use patchscope_render::{DotRenderer, Frame, Renderer};
use patchscope_watcher::{PollService, ReplayBackend};
use tempfile::TempDir;

fn patchscope() -> Command {
    Command::new(env!("CARGO_BIN_EXE_patchscope"))
}

fn speakers_and_player() -> RawRouting {
    let mut player = BTreeMap::new();
    player.insert("application.name".to_string(), "Music Player".to_string());
    RawRouting {
        sinks: vec![RawEntity {
            index: 1,
            description: Some("Speakers".to_string()),
            state: Some("running".to_string()),
            ..Default::default()
        }],
        sink_inputs: vec![RawEntity {
            index: 7,
            target: Some(1),
            properties: player,
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn write_routing(dir: &Path, routing: &RawRouting) -> std::path::PathBuf {
    let path = dir.join("routing.json");
    std::fs::write(&path, serde_json::to_string_pretty(routing).unwrap()).unwrap();
    path
}

/// Keeps every frame's positions and edges.
#[derive(Clone, Default)]
struct Capture {
    frames: Arc<Mutex<Vec<(BTreeMap<NodeId, Position>, Vec<(NodeId, NodeId, EdgeColor)>)>>>,
}

impl Renderer for Capture {
    fn render(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
        let edges = frame
            .layout
            .edges
            .iter()
            .map(|e| (e.from, e.to, e.color))
            .collect();
        self.frames
            .lock()
            .map_err(|_| anyhow::anyhow!("poisoned"))?
            .push((frame.layout.positions.clone(), edges));
        Ok(())
    }
}

/// One output device fed by one playback stream, end to end through the
/// poll service.
#[tokio::test]
async fn test_end_to_end_single_route() {
    let dir = TempDir::new().unwrap();
    let path = write_routing(dir.path(), &speakers_and_player());
    let config = VisualizerConfig {
        ordering: OrderingMode::Alphabetical,
        output_dir: dir.path().join("graphs"),
        ..Default::default()
    };

    let capture = Capture::default();
    let frames = capture.frames.clone();
    let backend = ReplayBackend::open(&path).await.unwrap();
    let mut service = PollService::new(backend, capture, &config);
    let outcome = service.run_cycle(None).await.unwrap();

    let view = outcome.view.unwrap();
    assert_eq!(view.graph.node_count(), 2);
    assert_eq!(view.graph.edge_count(), 1);

    let frames = frames.lock().unwrap();
    let (positions, edges) = &frames[0];
    let speakers = NodeId::new(Category::Sink, 1);
    let player = NodeId::new(Category::SinkInput, 7);
    assert_eq!(positions[&speakers], Position { column: 1, y: 0.0 });
    assert_eq!(positions[&player], Position { column: 0, y: 0.0 });
    assert_eq!(edges, &vec![(player, speakers, EdgeColor::Red)]);
}

/// The DOT renderer plugs into the poll service and writes next to the
/// snapshot records.
#[tokio::test]
async fn test_watch_cycle_writes_files() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("graphs");
    let path = write_routing(dir.path(), &speakers_and_player());
    let config = VisualizerConfig {
        output_dir: out.clone(),
        ..Default::default()
    };

    let backend = ReplayBackend::open(&path).await.unwrap();
    let renderer = DotRenderer::new(&out, config.text_wrap);
    let mut service = PollService::new(backend, renderer, &config);
    service.run_cycle(None).await.unwrap();

    let names: Vec<String> = std::fs::read_dir(&out)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert!(names.iter().any(|n| n.starts_with("state_") && n.ends_with(".json")));
    assert!(names.iter().any(|n| n.starts_with("graph_2") && n.ends_with(".dot")));
    assert!(names.contains(&"graph_latest.dot".to_string()));

    let dot = std::fs::read_to_string(out.join("graph_latest.dot")).unwrap();
    assert!(dot.contains("\"sink_input_7\" -> \"sink_1\" [color=\"red\"]"));
    assert!(dot.contains("Music Player SI.7"));
}

#[test]
fn test_cli_version() {
    let output = patchscope().arg("version").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("Patchscope v{}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_cli_render_saved_record() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("graphs");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(
        out.join("state_2024-03-09_14-05-07.json"),
        r#"{
            "sinks": {"1": {"active": true, "type": "sink", "label": "Speakers", "state": "running"}},
            "sink_inputs": {"7": {"active": true, "type": "sink_input", "label": "Music Player", "state": "unknown"}},
            "connections": {"sink_inputs": [{"category": "sink_input", "from": 7, "to": 1}], "source_outputs": []},
            "has_changed": true
        }"#,
    )
    .unwrap();

    let output = patchscope()
        .args(["render", "--alpha", "--ignore", "Player", "--output-dir"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let dot = std::fs::read_to_string(out.join("graph_latest.dot")).unwrap();
    assert!(dot.contains("Speakers sn.1"));
    assert!(!dot.contains("Music Player"));
    assert!(!dot.contains("->"));
}

#[test]
fn test_cli_render_without_records_fails() {
    let dir = TempDir::new().unwrap();
    let output = patchscope()
        .args(["render", "--output-dir"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_cli_rejects_bad_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("patchscope.toml");
    std::fs::write(&config, "text_wrap = 0\n").unwrap();

    let output = patchscope()
        .arg("--config")
        .arg(&config)
        .args(["render", "--output-dir"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
}
