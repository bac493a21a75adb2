//! Arena of placed nodes and the builder that fills it from a laid-out snapshot.

use std::collections::HashMap;

use log::debug;
use serde::Serialize;

use crate::config::LayoutConfig;
use crate::connection::{ConnectionId, ConnectionModel};
use crate::geometry::{Rect, Vec2};
use crate::host::GraphHost;
use crate::ir::{GraphSnapshot, NodeKey, NodeKind, NodeRecord};
use crate::layout::{GridItem, content_size, place_on_grid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub record: NodeRecord,
    /// Content-local rect, padding included.
    pub rect: Rect,
    pub output_port_visible: bool,
    outgoing: Vec<(ConnectionId, NodeId)>,
}

impl SceneNode {
    pub fn key(&self) -> &NodeKey {
        &self.record.key
    }

    pub fn kind(&self) -> NodeKind {
        self.record.key.kind
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    pub fn outgoing(&self) -> &[(ConnectionId, NodeId)] {
        &self.outgoing
    }
}

/// Scene nodes addressed by index, looked up by `(kind, id)`.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<SceneNode>,
    index: HashMap<NodeKey, NodeId>,
}

impl NodeArena {
    /// Adds a node. A later node with the same key shadows the earlier one in lookups.
    pub fn insert(&mut self, record: NodeRecord, rect: Rect, output_port_visible: bool) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.index.insert(record.key.clone(), id);
        self.nodes.push(SceneNode {
            record,
            rect,
            output_port_visible,
            outgoing: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn lookup(&self, key: &NodeKey) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    pub fn by_key(&self, key: &NodeKey) -> Option<&SceneNode> {
        self.lookup(key).and_then(|id| self.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(idx, node)| (NodeId(idx), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }

    pub(crate) fn add_outgoing(&mut self, from: NodeId, conn: ConnectionId, to: NodeId) {
        if let Some(node) = self.nodes.get_mut(from.0) {
            node.outgoing.push((conn, to));
        }
    }

    pub(crate) fn remove_outgoing_to(&mut self, from: NodeId, to: NodeId) {
        if let Some(node) = self.nodes.get_mut(from.0) {
            node.outgoing.retain(|&(_, target)| target != to);
        }
    }
}

/// Everything instantiated by one build.
#[derive(Debug, Default)]
pub struct Scene {
    pub nodes: NodeArena,
    pub connections: ConnectionModel,
    pub content_size: Vec2,
}

impl Scene {
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        self.content_size = Vec2::ZERO;
    }

    /// Instantiates and places every node of `snapshot`, then materializes its links.
    ///
    /// Nodes are complete before the first connection exists. Links with an unknown
    /// endpoint or pointing at themselves are skipped. Returns the first node created.
    pub fn build(
        &mut self,
        snapshot: &GraphSnapshot,
        host: &dyn GraphHost,
        config: &LayoutConfig,
        viewport: Vec2,
    ) -> Option<NodeId> {
        self.clear();

        let padding = Vec2::new(config.node_padding_x * 2.0, config.node_padding_y * 2.0);
        let records = snapshot.node_records();
        let items: Vec<GridItem> = records
            .iter()
            .map(|record| GridItem {
                layer: record.layer,
                row: record.row,
                size: host.node_size(record) + padding,
            })
            .collect();
        let placement = place_on_grid(&items);

        let mut first = None;
        for (record, rect) in records.into_iter().zip(placement.cells) {
            let output_port_visible = match record.key.kind {
                NodeKind::Objective => true,
                NodeKind::Outcome => host.can_have_outputs(&record.key.id),
            };
            let id = self.nodes.insert(record, rect, output_port_visible);
            first.get_or_insert(id);
        }

        let mut skipped = 0usize;
        for link in &snapshot.links {
            let from = self.nodes.lookup(&link.from_key());
            let to = self.nodes.lookup(&link.to_key());
            match (from, to) {
                (Some(from), Some(to)) if from != to => {
                    self.connections.connect(&mut self.nodes, from, to);
                }
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!("[Graph] skipped {skipped} link(s) with missing or identical endpoints");
        }

        self.content_size = content_size(placement.extent, viewport, config.content_slack);
        first
    }
}
