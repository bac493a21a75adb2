use std::collections::VecDeque;

use super::types::LinkGraph;

/// Longest-path layering.
///
/// Sources seed layer 0 and Kahn's sweep relaxes every successor to
/// `max(current, layer + 1)`. Nodes the sweep never reaches (members of a cycle with
/// no relaxed predecessor) fall back to `max(pred layer) + 1`, or 0 without
/// predecessors, in first-seen order.
pub(super) fn compute_layers(graph: &LinkGraph) -> Vec<usize> {
    let n = graph.len();
    let mut indeg: Vec<usize> = graph.pred.iter().map(Vec::len).collect();
    let mut layer: Vec<Option<usize>> = vec![None; n];

    let mut ready: VecDeque<usize> = (0..n).filter(|&idx| indeg[idx] == 0).collect();
    for &idx in &ready {
        layer[idx] = Some(0);
    }

    while let Some(u) = ready.pop_front() {
        let Some(current) = layer[u] else {
            continue;
        };
        for &v in &graph.adj[u] {
            let next = current + 1;
            if layer[v].is_none_or(|existing| next > existing) {
                layer[v] = Some(next);
            }
            indeg[v] = indeg[v].saturating_sub(1);
            if indeg[v] == 0 {
                ready.push_back(v);
            }
        }
    }

    for idx in 0..n {
        if layer[idx].is_some() {
            continue;
        }
        let fallback = graph.pred[idx]
            .iter()
            .map(|&p| layer[p].map_or(0, |l| l + 1))
            .max()
            .unwrap_or(0);
        layer[idx] = Some(fallback);
    }

    layer.into_iter().map(|l| l.unwrap_or(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{LinkRecord, NodeKey};

    fn link(from: &NodeKey, to: &NodeKey) -> LinkRecord {
        LinkRecord::new(from, to)
    }

    fn layer_of(graph: &LinkGraph, layers: &[usize], key: &NodeKey) -> usize {
        layers[graph.index[key]]
    }

    #[test]
    fn diamond_takes_longest_path() {
        let a = NodeKey::objective("A");
        let x = NodeKey::outcome("X");
        let y = NodeKey::outcome("Y");
        let b = NodeKey::objective("B");
        let z = NodeKey::outcome("Z");
        // A -> X -> B -> Z and A -> Y -> B, plus a shortcut A -> Z.
        let links = vec![
            link(&a, &x),
            link(&a, &y),
            link(&x, &b),
            link(&y, &b),
            link(&b, &z),
            link(&a, &z),
        ];
        let graph = LinkGraph::from_links(&links);
        let layers = compute_layers(&graph);
        assert_eq!(layer_of(&graph, &layers, &a), 0);
        assert_eq!(layer_of(&graph, &layers, &x), 1);
        assert_eq!(layer_of(&graph, &layers, &y), 1);
        assert_eq!(layer_of(&graph, &layers, &b), 2);
        assert_eq!(layer_of(&graph, &layers, &z), 3);
    }

    #[test]
    fn isolated_cycle_uses_fallback() {
        let a = NodeKey::objective("A");
        let x = NodeKey::outcome("X");
        let links = vec![link(&a, &x), link(&x, &a)];
        let graph = LinkGraph::from_links(&links);
        let layers = compute_layers(&graph);
        // A is first seen: its only predecessor X has no layer yet, so A gets 0,
        // then X gets A + 1.
        assert_eq!(layer_of(&graph, &layers, &a), 0);
        assert_eq!(layer_of(&graph, &layers, &x), 1);
    }

    #[test]
    fn cycle_fed_by_source_is_relaxed_not_fallback() {
        let s = NodeKey::objective("S");
        let x = NodeKey::outcome("X");
        let b = NodeKey::objective("B");
        let links = vec![link(&s, &x), link(&x, &b), link(&b, &x)];
        let graph = LinkGraph::from_links(&links);
        let layers = compute_layers(&graph);
        assert_eq!(layer_of(&graph, &layers, &s), 0);
        // X is relaxed from S but never released (B -> X keeps its in-degree up).
        assert_eq!(layer_of(&graph, &layers, &x), 1);
        assert_eq!(layer_of(&graph, &layers, &b), 2);
    }
}
