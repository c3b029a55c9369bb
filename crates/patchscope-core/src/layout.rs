//! Column layout: deterministic positions, edge direction, edge colour

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embedding::{DEFAULT_SEED, Embedding, SpringEmbedding};
use crate::graph::{EdgeOrigin, Graph, GraphEdge, GraphNode};
use crate::model::NodeId;

/// Factor applied to embedding coordinates before collision resolution.
pub const DEFAULT_SCALE: f64 = 10.0;

/// How nodes are ordered vertically within a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingMode {
    /// Sorted by display label, top to bottom.
    Alphabetical,
    /// Seeded by a spring embedding to reduce edge crossings.
    #[default]
    ForceDirected,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    pub ordering: OrderingMode,
    pub seed: u64,
    pub scale: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            ordering: OrderingMode::default(),
            seed: DEFAULT_SEED,
            scale: DEFAULT_SCALE,
        }
    }
}

/// Where a node is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub column: u8,
    pub y: f64,
}

/// Edge colour, chosen by the columns an edge connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeColor {
    /// Playback stream into output device.
    Red,
    /// Output device into its monitor.
    Green,
    /// Input device into recording stream.
    Orange,
    /// Everything else.
    LightGray,
}

impl EdgeColor {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeColor::Red => "red",
            EdgeColor::Green => "green",
            EdgeColor::Orange => "orange",
            EdgeColor::LightGray => "lightgray",
        }
    }
}

/// Colour for an edge from column `from` to column `to`.
pub fn edge_color(from: u8, to: u8) -> EdgeColor {
    match (from, to) {
        (0, 1) => EdgeColor::Red,
        (1, 2) => EdgeColor::Green,
        (2, 3) => EdgeColor::Orange,
        _ => EdgeColor::LightGray,
    }
}

/// Whether an edge between these columns runs against the signal flow and
/// must be flipped: recording into input, input into output, or playback
/// into recording.
pub fn runs_backwards(from: u8, to: u8) -> bool {
    matches!((from, to), (3, 2) | (2, 1) | (0, 3))
}

/// An edge after direction normalization, ready to draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyledEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub origin: EdgeOrigin,
    pub color: EdgeColor,
}

/// Positions for every node plus the normalized, coloured edge list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub positions: BTreeMap<NodeId, Position>,
    pub edges: Vec<StyledEdge>,
}

impl Layout {
    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.positions.get(&id).copied()
    }
}

/// Tracks occupied (column, y) slots and hands out free ones.
#[derive(Debug, Default)]
pub struct PlacementGrid {
    taken: HashSet<(u8, u64)>,
}

impl PlacementGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `(column, y)`, moving down one unit at a time until the slot is
    /// free. Returns the y actually claimed.
    pub fn place(&mut self, column: u8, mut y: f64) -> f64 {
        while !self.taken.insert((column, slot_key(y))) {
            y -= 1.0;
        }
        y
    }
}

fn slot_key(y: f64) -> u64 {
    // -0.0 and 0.0 are the same slot
    if y == 0.0 { 0.0f64.to_bits() } else { y.to_bits() }
}

/// Assigns positions and normalizes edges.
pub struct LayoutEngine<E = SpringEmbedding> {
    options: LayoutOptions,
    embedding: E,
}

impl LayoutEngine<SpringEmbedding> {
    pub fn new(options: LayoutOptions) -> Self {
        let embedding = SpringEmbedding::new(options.seed);
        LayoutEngine { options, embedding }
    }
}

impl Default for LayoutEngine<SpringEmbedding> {
    fn default() -> Self {
        Self::new(LayoutOptions::default())
    }
}

impl<E: Embedding> LayoutEngine<E> {
    pub fn with_embedding(options: LayoutOptions, embedding: E) -> Self {
        LayoutEngine { options, embedding }
    }

    pub fn arrange(&self, graph: &Graph) -> Layout {
        let columns = nodes_by_column(graph);
        let positions = match self.options.ordering {
            OrderingMode::Alphabetical => alphabetical_positions(&columns),
            OrderingMode::ForceDirected => {
                let coords = self.embedding.embed(graph);
                force_positions(&columns, &coords, self.options.scale)
            }
        };

        let edges = normalize_edges(graph.all_edges().copied(), &positions)
            .into_iter()
            .map(|edge| {
                let color = match (positions.get(&edge.from), positions.get(&edge.to)) {
                    (Some(a), Some(b)) => edge_color(a.column, b.column),
                    _ => EdgeColor::LightGray,
                };
                StyledEdge {
                    from: edge.from,
                    to: edge.to,
                    origin: edge.origin,
                    color,
                }
            })
            .collect();

        Layout { positions, edges }
    }
}

/// Nodes grouped by column, each column sorted by display label.
fn nodes_by_column(graph: &Graph) -> BTreeMap<u8, Vec<&GraphNode>> {
    let mut columns: BTreeMap<u8, Vec<&GraphNode>> = BTreeMap::new();
    for node in graph.all_nodes() {
        columns.entry(node.category.column()).or_default().push(node);
    }
    for nodes in columns.values_mut() {
        nodes.sort_by(|a, b| a.label.cmp(&b.label));
    }
    columns
}

fn alphabetical_positions(columns: &BTreeMap<u8, Vec<&GraphNode>>) -> BTreeMap<NodeId, Position> {
    let mut grid = PlacementGrid::new();
    let mut positions = BTreeMap::new();
    for (&column, nodes) in columns {
        let mut next = 0.0;
        for node in nodes {
            let y = grid.place(column, next);
            positions.insert(node.id, Position { column, y });
            next -= 1.0;
        }
    }
    positions
}

fn force_positions(
    columns: &BTreeMap<u8, Vec<&GraphNode>>,
    coords: &HashMap<NodeId, [f64; 2]>,
    scale: f64,
) -> BTreeMap<NodeId, Position> {
    let mut grid = PlacementGrid::new();
    let mut positions = BTreeMap::new();

    for (&column, nodes) in columns {
        let mut placed: Vec<(NodeId, f64)> = nodes
            .iter()
            .map(|node| {
                let seed_y = coords.get(&node.id).map_or(0.0, |c| c[1] * scale);
                (node.id, grid.place(column, seed_y))
            })
            .collect();

        // Keep the embedding's order but spread the column evenly.
        placed.sort_by(|a, b| a.1.total_cmp(&b.1));
        let min = placed.first().map_or(0.0, |p| p.1);
        let max = placed.last().map_or(0.0, |p| p.1);
        let step = if placed.len() > 1 {
            (max - min) / (placed.len() - 1) as f64
        } else {
            0.0
        };
        for (i, (id, _)) in placed.into_iter().enumerate() {
            positions.insert(
                id,
                Position {
                    column,
                    y: min + i as f64 * step,
                },
            );
        }
    }

    positions
}

/// Flip edges that run against the signal flow.
///
/// Returns a new edge list in the original order; edges with an endpoint
/// missing from `positions` pass through unchanged.
pub fn normalize_edges(
    edges: impl IntoIterator<Item = GraphEdge>,
    positions: &BTreeMap<NodeId, Position>,
) -> Vec<GraphEdge> {
    edges
        .into_iter()
        .map(|edge| match (positions.get(&edge.from), positions.get(&edge.to)) {
            (Some(a), Some(b)) if runs_backwards(a.column, b.column) => {
                debug!("Reversing edge {} -> {}", edge.from, edge.to);
                edge.reversed()
            }
            _ => edge,
        })
        .collect()
}
