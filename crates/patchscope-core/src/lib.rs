//! Patchscope Core: routing snapshot model, change detection, graph building and layout

pub mod model;
pub mod normalize;
pub mod diff;
pub mod heuristics;
pub mod graph;
pub mod builder;
pub mod embedding;
pub mod layout;
pub mod persist;
pub mod config;
pub mod error;


#[cfg(test)]
pub mod test_utils;

pub use model::{Category, NodeId, Node, Connection, Connections, Snapshot, RawEntity, RawRouting};
pub use normalize::normalize;
pub use diff::{ChangeSet, ChangedItems, detect_changes};
pub use graph::{Graph, GraphNode, GraphEdge, EdgeOrigin};
pub use builder::{BuildOptions, build_graph};
pub use embedding::{Embedding, SpringEmbedding};
pub use layout::{Layout, LayoutEngine, LayoutOptions, OrderingMode, Position, EdgeColor, StyledEdge};
pub use persist::{SnapshotRecord, save_record, load_record, load_latest_record, ensure_output_dir};
pub use config::VisualizerConfig;
pub use error::{PatchscopeError, Result};
