use std::collections::HashMap;

use crate::ir::{LinkRecord, NodeKey};

/// Directed multigraph over every node that appears in at least one link.
///
/// Nodes are indexed in first-seen order so that every pass over the graph is
/// deterministic for a given link list.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    pub keys: Vec<NodeKey>,
    pub index: HashMap<NodeKey, usize>,
    pub adj: Vec<Vec<usize>>,
    pub pred: Vec<Vec<usize>>,
}

impl LinkGraph {
    pub fn from_links(links: &[LinkRecord]) -> Self {
        let mut graph = Self::default();
        for link in links {
            let u = graph.ensure(link.from_key());
            let v = graph.ensure(link.to_key());
            graph.adj[u].push(v);
            graph.pred[v].push(u);
        }
        graph
    }

    fn ensure(&mut self, key: NodeKey) -> usize {
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.keys.len();
        self.index.insert(key.clone(), idx);
        self.keys.push(key);
        self.adj.push(Vec::new());
        self.pred.push(Vec::new());
        idx
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.index.contains_key(key)
    }

    /// Total out-edges, counting parallel links.
    pub fn degree(&self, node: usize) -> usize {
        self.adj[node].len()
    }

    pub fn id(&self, node: usize) -> &str {
        &self.keys[node].id
    }
}

/// Layer/row assigned to one linked node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub layer: usize,
    pub row: usize,
}
