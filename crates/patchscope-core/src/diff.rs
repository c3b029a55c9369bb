//! Change detection between consecutive snapshots

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{Category, Connection, Node, Snapshot};

/// Per-category ids that are new or modified since the previous snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedItems {
    pub sinks: Vec<u32>,
    pub sources: Vec<u32>,
    pub sink_inputs: Vec<u32>,
    pub source_outputs: Vec<u32>,
}

impl ChangedItems {
    pub fn get(&self, category: Category) -> &[u32] {
        match category {
            Category::Sink => &self.sinks,
            Category::Source => &self.sources,
            Category::SinkInput => &self.sink_inputs,
            Category::SourceOutput => &self.source_outputs,
            Category::Unknown => &[],
        }
    }

    fn get_mut(&mut self, category: Category) -> Option<&mut Vec<u32>> {
        match category {
            Category::Sink => Some(&mut self.sinks),
            Category::Source => Some(&mut self.sources),
            Category::SinkInput => Some(&mut self.sink_inputs),
            Category::SourceOutput => Some(&mut self.source_outputs),
            Category::Unknown => None,
        }
    }

    /// Check if no id changed in any category.
    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).is_empty())
    }

    /// Total number of changed ids.
    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c).len()).sum()
    }
}

/// Outcome of comparing two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Whether the graph must be rebuilt.
    pub has_changed: bool,
    pub changed_items: ChangedItems,
}

/// Compare `current` against `previous`.
///
/// Reports a change when there is no previous snapshot, when any category
/// gained or lost ids, when any node differs field by field, or when the
/// connection lists differ as sets. Removed ids flip `has_changed` but are
/// not listed in `changed_items`, which only names ids present in `current`.
pub fn detect_changes(previous: Option<&Snapshot>, current: &Snapshot) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for category in Category::ALL {
        let now = current.nodes(category);
        let Some(changed) = changes.changed_items.get_mut(category) else {
            continue;
        };
        changed.extend(
            now.iter()
                .filter(|(index, node)| {
                    previous
                        .and_then(|p| p.nodes(category).get(*index))
                        .is_none_or(|before| before != *node)
                })
                .map(|(index, _)| *index),
        );
    }

    changes.has_changed = match previous {
        None => true,
        Some(previous) => {
            !changes.changed_items.is_empty()
                || Category::ALL
                    .iter()
                    .any(|c| !same_ids(previous.nodes(*c), current.nodes(*c)))
                || connection_set(previous) != connection_set(current)
        }
    };

    changes
}

fn same_ids(a: &BTreeMap<u32, Node>, b: &BTreeMap<u32, Node>) -> bool {
    a.len() == b.len() && a.keys().eq(b.keys())
}

fn connection_set(snapshot: &Snapshot) -> BTreeSet<Connection> {
    snapshot.connections.iter().copied().collect()
}
