use std::cmp::Ordering;

use super::types::LinkGraph;

/// Spanning forest used for row placement; non-tree edges are still drawn but do not
/// influence rows.
#[derive(Debug, Clone, Default)]
pub(super) struct Forest {
    pub children: Vec<Vec<usize>>,
    pub roots: Vec<usize>,
}

fn by_layer_then_id(graph: &LinkGraph, layers: &[usize], a: usize, b: usize) -> Ordering {
    layers[a]
        .cmp(&layers[b])
        .then_with(|| graph.id(a).cmp(graph.id(b)))
}

/// Claims one primary parent per node, first claim wins.
///
/// Nodes are visited in `(layer, id)` order and each visits its forward edges in
/// `(target layer, target id)` order. Sibling lists are then sorted by
/// `(layer asc, out-degree desc, id asc)`.
pub(super) fn extract_forest(graph: &LinkGraph, layers: &[usize]) -> Forest {
    let n = graph.len();
    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| by_layer_then_id(graph, layers, a, b));

    for &u in &order {
        let mut forward: Vec<usize> = graph.adj[u]
            .iter()
            .copied()
            .filter(|&v| layers[v] > layers[u])
            .collect();
        forward.sort_by(|&a, &b| by_layer_then_id(graph, layers, a, b));
        for v in forward {
            if parent[v].is_none() {
                parent[v] = Some(u);
                children[u].push(v);
            }
        }
    }

    for kids in &mut children {
        kids.sort_by(|&a, &b| {
            layers[a]
                .cmp(&layers[b])
                .then_with(|| graph.degree(b).cmp(&graph.degree(a)))
                .then_with(|| graph.id(a).cmp(graph.id(b)))
        });
    }

    let mut roots: Vec<usize> = (0..n).filter(|&idx| parent[idx].is_none()).collect();
    roots.sort_by(|&a, &b| by_layer_then_id(graph, layers, a, b));

    Forest {
        children,
        roots,
    }
}

/// Subtree-balanced vertical centres.
///
/// Each tree occupies `span(root)` rows starting where the previous tree ended; a
/// parent sits at the mean of its children's centres. Chains can be thousands of
/// levels deep, so every pass walks an explicit pre-order instead of recursing.
pub(super) fn assign_centers(forest: &Forest) -> Vec<f32> {
    let n = forest.children.len();
    let order = pre_order(forest);

    let mut span = vec![1usize; n];
    for &node in order.iter().rev() {
        let kids = &forest.children[node];
        if !kids.is_empty() {
            span[node] = kids.iter().map(|&child| span[child]).sum::<usize>().max(1);
        }
    }

    let mut start = vec![0.0f32; n];
    let mut cursor = 0.0f32;
    for &root in &forest.roots {
        start[root] = cursor;
        cursor += span[root] as f32;
    }
    for &node in &order {
        let mut child_start = start[node];
        for &child in &forest.children[node] {
            start[child] = child_start;
            child_start += span[child] as f32;
        }
    }

    let mut center = vec![0.0f32; n];
    for &node in order.iter().rev() {
        let kids = &forest.children[node];
        center[node] = if kids.is_empty() {
            start[node] + (span[node] as f32 - 1.0) * 0.5
        } else {
            let sum: f32 = kids.iter().map(|&child| center[child]).sum();
            sum / kids.len() as f32
        };
    }
    center
}

/// Every node after its parent, trees in root order.
fn pre_order(forest: &Forest) -> Vec<usize> {
    let mut order = Vec::with_capacity(forest.children.len());
    let mut stack: Vec<usize> = forest.roots.iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        order.push(node);
        stack.extend(forest.children[node].iter().rev().copied());
    }
    order
}
