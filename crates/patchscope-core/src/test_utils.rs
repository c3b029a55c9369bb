//! Snapshot fixtures for tests

use std::collections::BTreeMap;

use crate::model::{Category, Connection, Node, Snapshot};

pub fn node(category: Category, label: &str, active: bool) -> Node {
    Node {
        active,
        category,
        label: label.to_string(),
        state: if active { "running" } else { "suspended" }.to_string(),
        properties: BTreeMap::new(),
    }
}

pub fn sink(label: &str, active: bool) -> Node {
    node(Category::Sink, label, active)
}

pub fn source(label: &str, active: bool) -> Node {
    node(Category::Source, label, active)
}

pub fn playback(label: &str, active: bool) -> Node {
    node(Category::SinkInput, label, active)
}

pub fn recording(label: &str, active: bool) -> Node {
    node(Category::SourceOutput, label, active)
}

/// One output device "Speakers" (sink 1) fed by playback stream
/// "Music Player" (sink input 7).
pub fn routed_snapshot() -> Snapshot {
    let mut snapshot = Snapshot::default();
    snapshot.sinks.insert(1, sink("Speakers", true));
    snapshot.sink_inputs.insert(7, playback("Music Player", true));
    snapshot.connections.sink_inputs.push(Connection::playback(7, 1));
    snapshot
}

/// A desk setup: speakers with their monitor, a microphone, a recorder on
/// the microphone and one loopback pair routing the monitor to the speakers.
pub fn studio_snapshot() -> Snapshot {
    let mut snapshot = routed_snapshot();
    snapshot.sources.insert(2, source("Monitor of Speakers", true));
    snapshot.sources.insert(3, source("Microphone", true));
    snapshot.source_outputs.insert(20, recording("Recorder", true));
    snapshot
        .sink_inputs
        .insert(30, playback("L1 Loopback to Speakers", true));
    snapshot
        .source_outputs
        .insert(31, recording("L1 Loopback from Monitor of Speakers", true));
    snapshot.connections.sink_inputs.push(Connection::playback(30, 1));
    snapshot
        .connections
        .source_outputs
        .push(Connection::recording(20, 3));
    snapshot
        .connections
        .source_outputs
        .push(Connection::recording(31, 2));
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_studio_snapshot() {
        let snapshot = studio_snapshot();
        assert_eq!(snapshot.node_count(), 7);
        assert_eq!(snapshot.connections.iter().count(), 4);
    }
}
