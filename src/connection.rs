//! Live, de-duplicated edges between scene nodes and the highlight state derived from
//! them.

use std::collections::BTreeSet;

use log::debug;
use serde::Serialize;

use crate::events::GraphObserver;
use crate::scene::{NodeArena, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConnectionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub from: NodeId,
    pub to: NodeId,
}

/// A node, its one-hop neighbours in either direction, and the edges between them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Neighborhood {
    pub nodes: BTreeSet<NodeId>,
    pub edges: BTreeSet<ConnectionId>,
}

impl Neighborhood {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// At most one connection per ordered `(from, to)` pair; endpoints always differ in kind.
#[derive(Debug, Default)]
pub struct ConnectionModel {
    connections: Vec<Connection>,
    next_id: u64,
    highlight: Neighborhood,
}

impl ConnectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `from -> to`. Self-loops, same-kind pairs, unknown nodes and
    /// duplicates are rejected with `None`.
    pub fn connect(
        &mut self,
        nodes: &mut NodeArena,
        from: NodeId,
        to: NodeId,
    ) -> Option<ConnectionId> {
        if from == to {
            return None;
        }
        let (Some(from_node), Some(to_node)) = (nodes.get(from), nodes.get(to)) else {
            return None;
        };
        if from_node.kind() == to_node.kind() {
            debug!(
                "[Graph] reject same-kind link {} > {}",
                from_node.key(),
                to_node.key()
            );
            return None;
        }
        if self.find(from, to).is_some() {
            return None;
        }

        let id = ConnectionId(self.next_id);
        self.next_id += 1;
        self.connections.push(Connection { id, from, to });
        nodes.add_outgoing(from, id, to);
        Some(id)
    }

    pub fn find(&self, from: NodeId, to: NodeId) -> Option<ConnectionId> {
        self.connections
            .iter()
            .find(|c| c.from == from && c.to == to)
            .map(|c| c.id)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Removes a connection and detaches it from its source node. With `notify`, the
    /// observer receives `on_unlink`. Highlights are cleared either way.
    pub fn disconnect(
        &mut self,
        nodes: &mut NodeArena,
        id: ConnectionId,
        notify: bool,
        observer: &mut dyn GraphObserver,
    ) -> Option<Connection> {
        let pos = self.connections.iter().position(|c| c.id == id)?;
        let conn = self.connections.remove(pos);
        nodes.remove_outgoing_to(conn.from, conn.to);
        if notify {
            if let (Some(from), Some(to)) = (nodes.get(conn.from), nodes.get(conn.to)) {
                observer.on_unlink(from.key(), to.key());
            }
        }
        self.clear_highlights();
        Some(conn)
    }

    pub fn disconnect_all_from(
        &mut self,
        nodes: &mut NodeArena,
        node: NodeId,
        notify: bool,
        observer: &mut dyn GraphObserver,
    ) -> usize {
        self.disconnect_matching(nodes, |c| c.from == node, notify, observer)
    }

    pub fn disconnect_all_to(
        &mut self,
        nodes: &mut NodeArena,
        node: NodeId,
        notify: bool,
        observer: &mut dyn GraphObserver,
    ) -> usize {
        self.disconnect_matching(nodes, |c| c.to == node, notify, observer)
    }

    fn disconnect_matching(
        &mut self,
        nodes: &mut NodeArena,
        matches: impl Fn(&Connection) -> bool,
        notify: bool,
        observer: &mut dyn GraphObserver,
    ) -> usize {
        let doomed: Vec<ConnectionId> = self
            .connections
            .iter()
            .filter(|c| matches(c))
            .map(|c| c.id)
            .collect();
        doomed
            .into_iter()
            .filter(|&id| self.disconnect(nodes, id, notify, observer).is_some())
            .count()
    }

    /// Drops every connection without notifying anyone (used before a rebuild).
    pub fn clear(&mut self) {
        self.connections.clear();
        self.highlight = Neighborhood::default();
    }

    pub fn neighborhood(&self, center: NodeId) -> Neighborhood {
        let mut hood = Neighborhood::default();
        hood.nodes.insert(center);
        for c in &self.connections {
            if c.from == center || c.to == center {
                hood.edges.insert(c.id);
                hood.nodes.insert(if c.from == center { c.to } else { c.from });
            }
        }
        hood
    }

    /// Replaces the active highlight with `center`'s neighbourhood.
    pub fn highlight_neighborhood(&mut self, center: NodeId) {
        self.highlight = self.neighborhood(center);
    }

    /// Replaces the active highlight with one edge and its two endpoints.
    pub fn highlight_connection(&mut self, id: ConnectionId) {
        self.clear_highlights();
        if let Some(c) = self.get(id).copied() {
            self.highlight.edges.insert(c.id);
            self.highlight.nodes.insert(c.from);
            self.highlight.nodes.insert(c.to);
        }
    }

    /// Adds one node to the active highlight without clearing it.
    pub fn highlight_node(&mut self, node: NodeId) {
        self.highlight.nodes.insert(node);
    }

    pub fn clear_highlights(&mut self) {
        self.highlight = Neighborhood::default();
    }

    pub fn highlighted(&self) -> &Neighborhood {
        &self.highlight
    }

    pub fn is_node_highlighted(&self, node: NodeId) -> bool {
        self.highlight.nodes.contains(&node)
    }

    pub fn is_edge_highlighted(&self, id: ConnectionId) -> bool {
        self.highlight.edges.contains(&id)
    }
}
