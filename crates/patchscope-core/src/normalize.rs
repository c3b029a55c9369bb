//! Snapshot normalization: raw backend listings into a canonical snapshot

use tracing::debug;

use crate::heuristics::{is_loopback_label, tag_loopback};
use crate::model::{Category, Connection, Connections, Node, RawEntity, RawRouting, Snapshot};

/// Label used when an entity reports no usable name at all.
pub const UNNAMED_NODE: &str = "Unnamed Node";

/// State reported for entities that have no runtime state.
pub const UNKNOWN_STATE: &str = "unknown";

/// The runtime state that marks an entity as active.
pub const RUNNING: &str = "running";

/// Build the canonical snapshot for one poll.
///
/// Never fails: missing fields fall back to defaults. Loopback ordinals and
/// connections both follow the backend's listing order.
pub fn normalize(raw: &RawRouting) -> Snapshot {
    let mut snapshot = Snapshot::default();

    for category in Category::ALL {
        let Some(nodes) = snapshot.nodes_mut(category) else {
            continue;
        };
        let mut loopbacks = 0;
        for entity in raw.entities(category) {
            let mut node = normalize_entity(entity, category);
            if category.is_stream() && is_loopback_label(&node.label) {
                loopbacks += 1;
                node.label = tag_loopback(&node.label, loopbacks);
                debug!("Loopback {} tagged as {}", entity.index, node.label);
            }
            nodes.insert(entity.index, node);
        }
    }

    snapshot.connections = Connections {
        sink_inputs: raw
            .sink_inputs
            .iter()
            .filter_map(|e| e.target.map(|sink| Connection::playback(e.index, sink)))
            .collect(),
        source_outputs: raw
            .source_outputs
            .iter()
            .filter_map(|e| e.target.map(|source| Connection::recording(e.index, source)))
            .collect(),
    };

    snapshot
}

/// Normalize a single entity.
pub fn normalize_entity(entity: &RawEntity, category: Category) -> Node {
    let (active, state) = match entity.state.as_deref() {
        Some(raw) => {
            let state = extract_state(raw);
            (state == RUNNING, state)
        }
        None => (true, UNKNOWN_STATE.to_string()),
    };

    Node {
        active,
        category,
        label: derive_label(entity),
        state,
        properties: entity.properties.clone(),
    }
}

/// Application name, else description, else name, else [`UNNAMED_NODE`].
/// Empty strings count as absent.
pub fn derive_label(entity: &RawEntity) -> String {
    [
        entity.application_name(),
        entity.description.as_deref(),
        entity.name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find(|s| !s.is_empty())
    .unwrap_or(UNNAMED_NODE)
    .to_string()
}

/// Strip enum-repr wrapping from a backend state string.
///
/// `<EnumValue sink/source-state=running>` becomes `running`; a bare
/// `running` is returned as is. Blank input yields [`UNKNOWN_STATE`].
pub fn extract_state(raw: &str) -> String {
    let tail = raw.rsplit('=').next().unwrap_or(raw);
    let state = tail.trim_matches(|c| c == '<' || c == '>').trim();
    if state.is_empty() {
        UNKNOWN_STATE.to_string()
    } else {
        state.to_string()
    }
}
