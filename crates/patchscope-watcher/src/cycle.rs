//! One poll cycle: normalize, diff, and rebuild on change

use patchscope_core::{
    BuildOptions, ChangeSet, Graph, Layout, LayoutEngine, LayoutOptions, RawRouting, Snapshot,
    VisualizerConfig, build_graph, detect_changes, normalize,
};
use tracing::{debug, info};

/// A rebuilt graph and its layout.
#[derive(Debug, Clone)]
pub struct View {
    pub graph: Graph,
    pub layout: Layout,
}

/// Result of processing one sample.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// Becomes the previous snapshot of the next cycle.
    pub snapshot: Snapshot,
    pub changes: ChangeSet,
    /// Present only when something changed.
    pub view: Option<View>,
}

/// Filters and layout settings applied to every cycle.
pub struct Pipeline {
    build: BuildOptions,
    engine: LayoutEngine,
}

impl Pipeline {
    pub fn new(build: BuildOptions, layout: LayoutOptions) -> Self {
        Pipeline {
            build,
            engine: LayoutEngine::new(layout),
        }
    }

    pub fn from_config(config: &VisualizerConfig) -> Self {
        Self::new(config.build_options(), config.layout_options())
    }

    /// Build and lay out the graph for a snapshot.
    pub fn view(&self, snapshot: &Snapshot) -> View {
        let graph = build_graph(snapshot, &self.build);
        let layout = self.engine.arrange(&graph);
        View { graph, layout }
    }

    /// Process one raw sample against the previous snapshot. Nothing is
    /// rebuilt when the routing is unchanged.
    pub fn process(&self, previous: Option<&Snapshot>, raw: &RawRouting) -> CycleOutcome {
        let snapshot = normalize(raw);
        let changes = detect_changes(previous, &snapshot);

        if !changes.has_changed {
            debug!("Routing unchanged");
            return CycleOutcome {
                snapshot,
                changes,
                view: None,
            };
        }

        info!(
            "Routing changed: {} new or modified ids {:?}",
            changes.changed_items.len(),
            changes.changed_items
        );
        let view = self.view(&snapshot);
        CycleOutcome {
            snapshot,
            changes,
            view: Some(view),
        }
    }
}
