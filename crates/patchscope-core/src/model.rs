//! Core data structures for the routing snapshot

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Property key holding the owning application's name.
pub const APPLICATION_NAME: &str = "application.name";

/// Discriminates what kind of routing entity a node represents.
///
/// Variants are declared in build order: devices first, then streams. The
/// derived `Ord` is what makes node iteration order stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// Output device
    Sink,
    /// Input device
    Source,
    /// Playback stream feeding an output device
    SinkInput,
    /// Recording stream drawing from an input device
    SourceOutput,
    /// Anything a persisted record names that we do not recognise
    Unknown,
}

impl Category {
    /// The four categories a live backend produces, in build order.
    pub const ALL: [Category; 4] = [
        Category::Sink,
        Category::Source,
        Category::SinkInput,
        Category::SourceOutput,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Sink => "sink",
            Category::Source => "source",
            Category::SinkInput => "sink_input",
            Category::SourceOutput => "source_output",
            Category::Unknown => "unknown",
        }
    }

    /// Layout column. Signal flows left to right: playback, output devices,
    /// input devices, recording.
    pub fn column(self) -> u8 {
        match self {
            Category::SinkInput => 0,
            Category::Sink => 1,
            Category::Source => 2,
            Category::SourceOutput => 3,
            Category::Unknown => 4,
        }
    }

    /// Whether nodes of this category are streams rather than devices.
    pub fn is_stream(self) -> bool {
        matches!(self, Category::SinkInput | Category::SourceOutput)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "sink" => Category::Sink,
            "source" => Category::Source,
            "sink_input" => Category::SinkInput,
            "source_output" => Category::SourceOutput,
            _ => Category::Unknown,
        }
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

/// Canonical node identity: category plus backend index.
///
/// Stable across rebuilds, so a node keeps its id even though the graph that
/// holds it is thrown away every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    pub category: Category,
    pub index: u32,
}

impl NodeId {
    pub fn new(category: Category, index: u32) -> Self {
        NodeId { category, index }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.category, self.index)
    }
}

/// A normalized routing entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub active: bool,
    #[serde(rename = "type")]
    pub category: Category,
    pub label: String,
    pub state: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// A stream attached to a device.
///
/// `category` is the stream's category; the device category follows from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Connection {
    pub category: Category,
    pub from: u32,
    pub to: u32,
}

impl Connection {
    pub fn playback(stream: u32, sink: u32) -> Self {
        Connection {
            category: Category::SinkInput,
            from: stream,
            to: sink,
        }
    }

    pub fn recording(stream: u32, source: u32) -> Self {
        Connection {
            category: Category::SourceOutput,
            from: stream,
            to: source,
        }
    }

    pub fn stream_id(&self) -> NodeId {
        NodeId::new(self.category, self.from)
    }

    pub fn device_id(&self) -> NodeId {
        let device = match self.category {
            Category::SinkInput => Category::Sink,
            Category::SourceOutput => Category::Source,
            other => other,
        };
        NodeId::new(device, self.to)
    }
}

/// Stream-to-device links, one list per stream category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connections {
    #[serde(default)]
    pub sink_inputs: Vec<Connection>,
    #[serde(default)]
    pub source_outputs: Vec<Connection>,
}

impl Connections {
    /// Playback links first, then recording links.
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.sink_inputs.iter().chain(self.source_outputs.iter())
    }
}

static NO_NODES: BTreeMap<u32, Node> = BTreeMap::new();

/// Canonical, comparable view of the routing state at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub sinks: BTreeMap<u32, Node>,
    #[serde(default)]
    pub sources: BTreeMap<u32, Node>,
    #[serde(default)]
    pub sink_inputs: BTreeMap<u32, Node>,
    #[serde(default)]
    pub source_outputs: BTreeMap<u32, Node>,
    #[serde(default)]
    pub connections: Connections,
}

impl Snapshot {
    /// Nodes of one category keyed by backend index.
    pub fn nodes(&self, category: Category) -> &BTreeMap<u32, Node> {
        match category {
            Category::Sink => &self.sinks,
            Category::Source => &self.sources,
            Category::SinkInput => &self.sink_inputs,
            Category::SourceOutput => &self.source_outputs,
            Category::Unknown => &NO_NODES,
        }
    }

    pub fn nodes_mut(&mut self, category: Category) -> Option<&mut BTreeMap<u32, Node>> {
        match category {
            Category::Sink => Some(&mut self.sinks),
            Category::Source => Some(&mut self.sources),
            Category::SinkInput => Some(&mut self.sink_inputs),
            Category::SourceOutput => Some(&mut self.source_outputs),
            Category::Unknown => None,
        }
    }

    /// Every node with its canonical id, ordered by id.
    pub fn all_nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        Category::ALL.into_iter().flat_map(move |category| {
            self.nodes(category)
                .iter()
                .map(move |(&index, node)| (NodeId::new(category, index), node))
        })
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes(id.category).get(&id.index)
    }

    pub fn node_count(&self) -> usize {
        Category::ALL.iter().map(|c| self.nodes(*c).len()).sum()
    }
}

/// One entity as reported by the audio backend, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntity {
    pub index: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Runtime state as the backend prints it. `None` for entity types that
    /// have no runtime state.
    #[serde(default)]
    pub state: Option<String>,
    /// Index of the device a stream is attached to.
    #[serde(default)]
    pub target: Option<u32>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl RawEntity {
    pub fn application_name(&self) -> Option<&str> {
        self.properties.get(APPLICATION_NAME).map(String::as_str)
    }
}

/// Raw listings for one poll, one list per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRouting {
    #[serde(default)]
    pub sinks: Vec<RawEntity>,
    #[serde(default)]
    pub sources: Vec<RawEntity>,
    #[serde(default)]
    pub sink_inputs: Vec<RawEntity>,
    #[serde(default)]
    pub source_outputs: Vec<RawEntity>,
}

impl RawRouting {
    pub fn entities(&self, category: Category) -> &[RawEntity] {
        match category {
            Category::Sink => &self.sinks,
            Category::Source => &self.sources,
            Category::SinkInput => &self.sink_inputs,
            Category::SourceOutput => &self.source_outputs,
            Category::Unknown => &[],
        }
    }
}
