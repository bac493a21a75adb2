mod placement;
mod ranking;
mod tree;
pub(crate) mod types;

pub use placement::{GridItem, GridPlacement, content_size, place_on_grid};
pub use types::{LinkGraph, Slot};

use std::collections::{HashMap, HashSet};

use crate::ir::{GraphSnapshot, NodeKey, NodeKind, ObjectiveRecord, OutcomeRecord};
use ranking::compute_layers;
use tree::{assign_centers, extract_forest};

/// Assigns a layer and row to every node of `snapshot`.
///
/// Pure: the same snapshot always yields the same coordinates. Links and display
/// fields pass through unchanged; `outcomeCount`/`usedByCount` are recomputed from the
/// links. Nodes without any link form a block at layer 0, rows `0..k`, sorted by id;
/// every linked node's row is shifted below that block.
pub fn compute_layout(snapshot: &GraphSnapshot) -> GraphSnapshot {
    let graph = LinkGraph::from_links(&snapshot.links);
    let slots = compute_slots(&graph);

    let mut outcome_count: HashMap<&str, usize> = HashMap::new();
    let mut used_by: HashMap<&str, usize> = HashMap::new();
    for link in &snapshot.links {
        match (link.from_is_objective, link.to_is_objective) {
            (true, false) => *outcome_count.entry(link.from_id.as_str()).or_default() += 1,
            (false, true) => *used_by.entry(link.from_id.as_str()).or_default() += 1,
            _ => {}
        }
    }

    let unconnected = unconnected_block(snapshot, &graph);
    let row_offset = unconnected.len();
    let slot_of = |key: &NodeKey| -> Slot {
        if let Some(&row) = unconnected.get(key) {
            return Slot { layer: 0, row };
        }
        match graph.index.get(key) {
            Some(&idx) => Slot {
                layer: slots[idx].layer,
                row: slots[idx].row + row_offset,
            },
            None => Slot {
                layer: 0,
                row: row_offset,
            },
        }
    };

    let objectives = snapshot
        .objectives
        .iter()
        .map(|o| {
            let slot = slot_of(&NodeKey::objective(&o.id));
            ObjectiveRecord {
                outcome_count: outcome_count.get(o.id.as_str()).copied().unwrap_or(0),
                layer: slot.layer,
                row: slot.row,
                ..o.clone()
            }
        })
        .collect();
    let outcomes = snapshot
        .outcomes
        .iter()
        .map(|o| {
            let slot = slot_of(&NodeKey::outcome(&o.id));
            OutcomeRecord {
                used_by_count: used_by.get(o.id.as_str()).copied().unwrap_or(0),
                layer: slot.layer,
                row: slot.row,
                ..o.clone()
            }
        })
        .collect();

    GraphSnapshot {
        objectives,
        outcomes,
        links: snapshot.links.clone(),
    }
}

/// Layer and (unshifted) row for every linked node, indexed like `graph.keys`.
pub fn compute_slots(graph: &LinkGraph) -> Vec<Slot> {
    if graph.is_empty() {
        return Vec::new();
    }
    let layers = compute_layers(graph);
    let forest = extract_forest(graph, &layers);
    let centers = assign_centers(&forest);
    layers
        .iter()
        .zip(centers)
        .map(|(&layer, center)| Slot {
            layer,
            row: center.round_ties_even().max(0.0) as usize,
        })
        .collect()
}

/// Fixed rows for nodes that no link touches, sorted by id (objectives first on ties).
fn unconnected_block(snapshot: &GraphSnapshot, graph: &LinkGraph) -> HashMap<NodeKey, usize> {
    let mut seen: HashSet<NodeKey> = HashSet::new();
    let mut keys: Vec<NodeKey> = Vec::new();
    let all = snapshot
        .objectives
        .iter()
        .map(|o| NodeKey::new(NodeKind::Objective, &o.id))
        .chain(
            snapshot
                .outcomes
                .iter()
                .map(|o| NodeKey::new(NodeKind::Outcome, &o.id)),
        );
    for key in all {
        if graph.contains(&key) || !seen.insert(key.clone()) {
            continue;
        }
        keys.push(key);
    }
    keys.sort_by(|a, b| a.id.cmp(&b.id));
    keys.into_iter()
        .enumerate()
        .map(|(row, key)| (key, row))
        .collect()
}
