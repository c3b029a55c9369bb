//! Node fill colours and sizes

use patchscope_core::{Category, GraphNode};

/// Marker area for running nodes, in square points.
pub const ACTIVE_SIZE: u32 = 500;

/// Marker area for idle nodes.
pub const INACTIVE_SIZE: u32 = 200;

pub const INACTIVE_COLOR: &str = "grey";

pub fn category_color(category: Category) -> &'static str {
    match category {
        Category::Sink => "lightblue",
        Category::Source => "lightgreen",
        Category::SinkInput => "lightcoral",
        Category::SourceOutput => "yellow",
        Category::Unknown => "grey",
    }
}

pub fn node_color(node: &GraphNode) -> &'static str {
    if node.active {
        category_color(node.category)
    } else {
        INACTIVE_COLOR
    }
}

pub fn node_size(node: &GraphNode) -> u32 {
    if node.active { ACTIVE_SIZE } else { INACTIVE_SIZE }
}

/// Diameter in inches of a circle with the node's marker area.
pub fn node_diameter(node: &GraphNode) -> f64 {
    (node_size(node) as f64).sqrt() / 72.0
}
