//! Graph construction from a canonical snapshot

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::graph::{EdgeOrigin, Graph, GraphEdge, GraphNode};
use crate::heuristics::{loopback_ordinal, monitor_target, strip_id_suffix};
use crate::model::{Node, NodeId, Snapshot};

/// Node filters applied while building the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Substrings removed from display labels.
    pub hide: Vec<String>,
    /// Nodes whose raw label contains any of these are left out.
    pub ignore: Vec<String>,
    /// Leave out nodes that are not running.
    pub active_only: bool,
}

impl BuildOptions {
    pub fn admits(&self, node: &Node) -> bool {
        (!self.active_only || node.active)
            && !self.ignore.iter().any(|term| node.label.contains(term.as_str()))
    }

    /// Raw label with hidden substrings removed, suffixed with the id.
    pub fn display_label(&self, id: NodeId, node: &Node) -> String {
        let visible = self
            .hide
            .iter()
            .fold(node.label.clone(), |label, hidden| label.replace(hidden.as_str(), ""));
        format!("{} {}", visible, id)
    }
}

/// Build the routing graph for a snapshot.
///
/// Nodes are admitted in id order. Backend connections come first, then
/// edges inferred from labels. Deterministic for a given snapshot and
/// options.
pub fn build_graph(snapshot: &Snapshot, options: &BuildOptions) -> Graph {
    let mut graph = Graph::new();

    for (id, node) in snapshot.all_nodes() {
        if !options.admits(node) {
            debug!("Skipping node {} ({})", id, node.label);
            continue;
        }
        graph.add_node(GraphNode {
            id,
            category: node.category,
            label: options.display_label(id, node),
            active: node.active,
            state: node.state.clone(),
        });
    }

    let explicit = add_connection_edges(&mut graph, snapshot);
    let inferred = infer_edges(&graph);
    for edge in &inferred {
        graph.add_edge(*edge);
    }

    info!(
        "Built graph: {} nodes, {} connection edges, {} inferred edges",
        graph.node_count(),
        explicit,
        inferred.len()
    );
    graph
}

/// Add one edge per backend connection whose endpoints are both admitted.
/// Returns the number of edges added.
fn add_connection_edges(graph: &mut Graph, snapshot: &Snapshot) -> usize {
    let mut added: HashSet<(NodeId, NodeId)> = HashSet::new();

    for conn in snapshot.connections.iter() {
        let from = conn.stream_id();
        let to = conn.device_id();

        if !graph.contains(from) || !graph.contains(to) {
            warn!("Connection: dropping edge from {} to {}: endpoint not shown", from, to);
            continue;
        }
        if added.contains(&(from, to)) {
            warn!("Connection: duplicate edge from {} to {}", from, to);
            continue;
        }
        if added.contains(&(to, from)) {
            warn!("Connection: spurious reverse edge from {} to {}", from, to);
            continue;
        }

        graph.add_edge(GraphEdge {
            from,
            to,
            origin: EdgeOrigin::Connection,
        });
        added.insert((from, to));
        debug!("Connection: edge from {} to {}", from, to);
    }

    added.len()
}

/// Edges implied by labels: monitors point at the device they tap, and the
/// first pair of nodes sharing a loopback ordinal is linked.
///
/// Pairs are visited in node insertion order, so the result is stable for a
/// given graph. Each loopback ordinal yields at most one edge.
pub fn infer_edges(graph: &Graph) -> Vec<GraphEdge> {
    let nodes: Vec<(NodeId, &str)> = graph
        .all_nodes()
        .map(|n| (n.id, strip_id_suffix(&n.label)))
        .collect();

    let mut edges = Vec::new();
    let mut consumed: HashSet<&str> = HashSet::new();

    for &(from, from_label) in &nodes {
        let monitored = monitor_target(from_label);
        let ordinal = loopback_ordinal(from_label);

        for &(to, to_label) in &nodes {
            if from == to {
                continue;
            }

            if monitored == Some(to_label) {
                debug!("Monitor connection: {} -> {}", from, to);
                edges.push(GraphEdge {
                    from,
                    to,
                    origin: EdgeOrigin::Monitor,
                });
            }

            if let Some(ordinal) = ordinal {
                if !consumed.contains(ordinal) && loopback_ordinal(to_label) == Some(ordinal) {
                    debug!("Loop connection: {} -> {} ({})", from, to, ordinal);
                    edges.push(GraphEdge {
                        from,
                        to,
                        origin: EdgeOrigin::Loopback,
                    });
                    consumed.insert(ordinal);
                }
            }
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Connection};
    use crate::test_utils::*;

    fn labels_of(graph: &Graph) -> Vec<String> {
        graph.all_nodes().map(|n| n.label.clone()).collect()
    }

    #[test]
    fn display_label_hides_substrings_and_appends_id() {
        let options = BuildOptions {
            hide: vec!["Built-in ".to_string(), " Stereo".to_string()],
            ..Default::default()
        };
        let node = sink("Built-in Audio Analog Stereo", true);
        let label = options.display_label(NodeId::new(Category::Sink, 4), &node);
        assert_eq!(label, "Audio Analog sink_4");
    }

    #[test]
    fn builds_connection_edge() {
        let graph = build_graph(&routed_snapshot(), &BuildOptions::default());
        assert_eq!(labels_of(&graph), vec!["Speakers sink_1", "Music Player sink_input_7"]);

        let edges: Vec<_> = graph.all_edges().copied().collect();
        assert_eq!(
            edges,
            vec![GraphEdge {
                from: NodeId::new(Category::SinkInput, 7),
                to: NodeId::new(Category::Sink, 1),
                origin: EdgeOrigin::Connection,
            }]
        );
    }

    #[test]
    fn ignored_nodes_and_their_edges_are_dropped() {
        let options = BuildOptions {
            ignore: vec!["Music".to_string()],
            ..Default::default()
        };
        let graph = build_graph(&routed_snapshot(), &options);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.contains(NodeId::new(Category::SinkInput, 7)));
    }

    #[test]
    fn active_only_drops_inactive_nodes() {
        let mut snapshot = routed_snapshot();
        snapshot.sinks.insert(5, sink("HDMI", false));

        let all = build_graph(&snapshot, &BuildOptions::default());
        assert!(all.contains(NodeId::new(Category::Sink, 5)));

        let options = BuildOptions {
            active_only: true,
            ..Default::default()
        };
        let graph = build_graph(&snapshot, &options);
        assert!(!graph.contains(NodeId::new(Category::Sink, 5)));
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn duplicate_connections_are_dropped() {
        let mut snapshot = routed_snapshot();
        snapshot.connections.sink_inputs.push(Connection::playback(7, 1));
        let graph = build_graph(&snapshot, &BuildOptions::default());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn reverse_duplicate_is_dropped() {
        let mut snapshot = Snapshot::default();
        snapshot.sinks.insert(1, sink("Speakers", true));
        snapshot.sinks.insert(2, sink("Headset", true));
        snapshot.connections.sink_inputs.push(Connection {
            category: Category::Sink,
            from: 1,
            to: 2,
        });
        snapshot.connections.sink_inputs.push(Connection {
            category: Category::Sink,
            from: 2,
            to: 1,
        });

        let graph = build_graph(&snapshot, &BuildOptions::default());
        let edges: Vec<_> = graph.all_edges().copied().collect();
        assert_eq!(
            edges,
            vec![GraphEdge {
                from: NodeId::new(Category::Sink, 1),
                to: NodeId::new(Category::Sink, 2),
                origin: EdgeOrigin::Connection,
            }]
        );
    }

    #[test]
    fn trailing_label_whitespace_blocks_monitor_match() {
        let mut snapshot = Snapshot::default();
        snapshot.sinks.insert(5, sink("Foo  ", true));
        snapshot.sources.insert(3, source("Monitor of Foo", true));

        let graph = build_graph(&snapshot, &BuildOptions::default());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn connection_to_missing_device_is_dropped() {
        let mut snapshot = routed_snapshot();
        snapshot.connections.sink_inputs.push(Connection::playback(7, 99));
        let graph = build_graph(&snapshot, &BuildOptions::default());
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn monitor_points_at_its_device() {
        let mut snapshot = Snapshot::default();
        snapshot.sinks.insert(5, sink("Foo", true));
        snapshot.sources.insert(3, source("Monitor of Foo", true));
        snapshot.sources.insert(4, source("Foo Mic", true));

        let graph = build_graph(&snapshot, &BuildOptions::default());
        let edges: Vec<_> = graph.all_edges().copied().collect();
        assert_eq!(
            edges,
            vec![GraphEdge {
                from: NodeId::new(Category::Source, 3),
                to: NodeId::new(Category::Sink, 5),
                origin: EdgeOrigin::Monitor,
            }]
        );
    }

    #[test]
    fn loopback_ordinal_is_paired_once() {
        let mut snapshot = Snapshot::default();
        snapshot
            .sink_inputs
            .insert(7, playback("L1 Loopback from X", true));
        snapshot
            .source_outputs
            .insert(8, recording("L1 Loopback to Y", true));

        let graph = build_graph(&snapshot, &BuildOptions::default());
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge_between(
            NodeId::new(Category::SinkInput, 7),
            NodeId::new(Category::SourceOutput, 8)
        ));

        snapshot
            .source_outputs
            .insert(9, recording("L1 Loopback to Z", true));
        let graph = build_graph(&snapshot, &BuildOptions::default());
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.all_edges().all(|e| e.origin == EdgeOrigin::Loopback));
    }

    #[test]
    fn distinct_ordinals_pair_independently() {
        let mut snapshot = Snapshot::default();
        snapshot.sink_inputs.insert(1, playback("L1 Loopback a", true));
        snapshot.sink_inputs.insert(2, playback("L2 Loopback b", true));
        snapshot.source_outputs.insert(3, recording("L1 Loopback c", true));
        snapshot.source_outputs.insert(4, recording("L2 Loopback d", true));

        let graph = build_graph(&snapshot, &BuildOptions::default());
        assert!(graph.has_edge_between(
            NodeId::new(Category::SinkInput, 1),
            NodeId::new(Category::SourceOutput, 3)
        ));
        assert!(graph.has_edge_between(
            NodeId::new(Category::SinkInput, 2),
            NodeId::new(Category::SourceOutput, 4)
        ));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn inferred_edges_follow_connection_edges() {
        let graph = build_graph(&studio_snapshot(), &BuildOptions::default());
        let origins: Vec<_> = graph.all_edges().map(|e| e.origin).collect();
        let first_inferred = origins.iter().position(|o| o.is_inferred());
        assert_eq!(first_inferred, Some(4));
        assert!(origins[4..].iter().all(|o| o.is_inferred()));
    }

    #[test]
    fn rebuild_is_idempotent() {
        let snapshot = studio_snapshot();
        let options = BuildOptions {
            hide: vec!["Loopback ".to_string()],
            ..Default::default()
        };
        let a = build_graph(&snapshot, &options);
        let b = build_graph(&snapshot, &options);
        assert_eq!(labels_of(&a), labels_of(&b));
        assert_eq!(
            a.all_edges().copied().collect::<Vec<_>>(),
            b.all_edges().copied().collect::<Vec<_>>()
        );
    }
}
