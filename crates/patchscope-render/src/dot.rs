//! Graphviz DOT output with pinned node positions
//!
//! Files are meant for `neato -n`, which keeps the `pos` attributes as
//! given, so the drawing matches the computed layout exactly.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};

use patchscope_core::persist::{ensure_output_dir, timestamped_name};
use patchscope_core::{Graph, Layout};

use crate::label::node_text;
use crate::palette::{node_color, node_diameter};
use crate::{Frame, Renderer};

/// File name prefix of rendered graphs.
pub const GRAPH_PREFIX: &str = "graph_";

/// Rendered graph that is overwritten on every refresh.
pub const LATEST_GRAPH: &str = "graph_latest.dot";

/// Horizontal distance between columns, in points.
const COLUMN_SPACING: f64 = 250.0;

/// Vertical distance of one layout unit, in points.
const ROW_SPACING: f64 = 72.0;

/// Headers sit this many rows above the highest node.
const HEADER_OFFSET: f64 = 1.5;

const COLUMN_HEADERS: [&str; 4] = [
    "Playback\n(Sink Inputs)",
    "Output Devices\n(Sinks)",
    "Input Devices\n(Sources)",
    "Recording\n(Source Outputs)",
];

/// Writes each frame to `graph_<timestamp>.dot` and `graph_latest.dot`.
#[derive(Debug, Clone)]
pub struct DotRenderer {
    output_dir: PathBuf,
    text_wrap: usize,
}

impl DotRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, text_wrap: usize) -> Self {
        DotRenderer {
            output_dir: output_dir.into(),
            text_wrap,
        }
    }

    pub fn latest_path(&self) -> PathBuf {
        self.output_dir.join(LATEST_GRAPH)
    }
}

impl Renderer for DotRenderer {
    fn render(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
        ensure_output_dir(&self.output_dir)?;
        let dot = render_dot(frame, self.text_wrap);

        let stamped = self
            .output_dir
            .join(timestamped_name(GRAPH_PREFIX, frame.updated_at, "dot"));
        std::fs::write(&stamped, &dot)
            .with_context(|| format!("Failed to write {}", stamped.display()))?;

        let latest = self.latest_path();
        std::fs::write(&latest, &dot)
            .with_context(|| format!("Failed to write {}", latest.display()))?;

        info!("Graph written to {}", stamped.display());
        Ok(())
    }
}

/// Render one frame as DOT text.
pub fn render_dot(frame: &Frame<'_>, text_wrap: usize) -> String {
    let mut out = String::new();
    out.push_str("digraph patchscope {\n");
    let _ = writeln!(
        out,
        "  graph [forcelabels=true label=\"Last update: {}\" labelloc=b labeljust=r fontsize=10 fontcolor=\"gray\"];",
        frame.updated_at.format("%Y-%m-%d %H:%M:%S")
    );
    out.push_str(
        "  node [shape=circle fixedsize=true style=filled fontname=\"Helvetica-Bold\" fontsize=14];\n",
    );
    out.push_str("  edge [penwidth=2 arrowsize=1.5];\n");
    out.push('\n');

    write_headers(&mut out, frame.layout);
    out.push('\n');
    write_nodes(&mut out, frame.graph, frame.layout, text_wrap);
    out.push('\n');

    for edge in &frame.layout.edges {
        let _ = writeln!(
            out,
            "  \"{}\" -> \"{}\" [color=\"{}\"];",
            edge.from,
            edge.to,
            edge.color.as_str()
        );
    }

    out.push_str("}\n");
    out
}

fn write_headers(out: &mut String, layout: &Layout) {
    let top = layout
        .positions
        .values()
        .map(|p| p.y)
        .fold(f64::NEG_INFINITY, f64::max);
    let top = if top.is_finite() { top } else { 0.0 };
    let y = (top + HEADER_OFFSET) * ROW_SPACING;

    for (column, header) in COLUMN_HEADERS.iter().enumerate() {
        let _ = writeln!(
            out,
            "  \"column_{}\" [shape=plaintext fixedsize=false style=\"\" label=\"{}\" pos=\"{:.1},{:.1}!\"];",
            column,
            escape_dot(header),
            points(column as f64 * COLUMN_SPACING),
            points(y)
        );
    }
}

fn write_nodes(out: &mut String, graph: &Graph, layout: &Layout, text_wrap: usize) {
    for (id, position) in &layout.positions {
        let Some(node) = graph.node(*id) else {
            warn!("Layout position for {} which is not in the graph", id);
            continue;
        };
        let _ = writeln!(
            out,
            "  \"{}\" [label=\"\" xlabel=\"{}\" fillcolor=\"{}\" width={:.2} pos=\"{:.1},{:.1}!\"];",
            id,
            escape_dot(&node_text(&node.label, text_wrap)),
            node_color(node),
            node_diameter(node),
            points(position.column as f64 * COLUMN_SPACING),
            points(position.y * ROW_SPACING)
        );
    }
}

/// Avoid printing `-0.0`.
fn points(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
