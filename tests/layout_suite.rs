use std::collections::{HashMap, HashSet};
use std::path::Path;

use mission_graph::{GraphSnapshot, NodeKey, compute_layout};

fn load_fixture(path: &Path) -> GraphSnapshot {
    let input = std::fs::read_to_string(path).expect("fixture read failed");
    GraphSnapshot::from_json(&input).expect("fixture parse failed")
}

fn slots(snapshot: &GraphSnapshot) -> HashMap<NodeKey, (usize, usize)> {
    snapshot
        .node_records()
        .into_iter()
        .map(|node| (node.key, (node.layer, node.row)))
        .collect()
}

fn assert_rows_packed(snapshot: &GraphSnapshot, fixture: &str) {
    let slots = slots(snapshot);
    let mut taken = HashSet::new();
    for (key, slot) in &slots {
        assert!(taken.insert(*slot), "{fixture}: {key} shares slot {slot:?}");
    }

    let linked: HashSet<NodeKey> = snapshot
        .links
        .iter()
        .flat_map(|l| [l.from_key(), l.to_key()])
        .collect();
    let mut loose: Vec<&NodeKey> = slots.keys().filter(|k| !linked.contains(*k)).collect();
    loose.sort_by(|a, b| a.id.cmp(&b.id));
    for (row, key) in loose.iter().enumerate() {
        assert_eq!(slots[*key], (0, row), "{fixture}: unconnected {key}");
    }
    for key in slots.keys().filter(|k| linked.contains(*k)) {
        assert!(slots[key].1 >= loose.len(), "{fixture}: {key} overlaps unconnected block");
    }
}

fn assert_layers_increase(snapshot: &GraphSnapshot, fixture: &str) {
    let slots = slots(snapshot);
    for link in &snapshot.links {
        let (Some(from), Some(to)) = (slots.get(&link.from_key()), slots.get(&link.to_key())) else {
            continue;
        };
        assert!(
            to.0 > from.0,
            "{fixture}: {} -> {} goes from layer {} to {}",
            link.from_key(),
            link.to_key(),
            from.0,
            to.0
        );
    }
}

#[test]
fn lay_out_all_fixtures() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures");

    // Keep this list explicit so new fixtures must be added intentionally.
    // The flag marks fixtures without cycles.
    let candidates = [
        ("chain.json", true),
        ("diamond.json", true),
        ("fan_in.json", true),
        ("unconnected.json", true),
        ("campaign.json", true),
        ("cycle.json", false),
    ];

    for (rel, acyclic) in candidates {
        let path = root.join(rel);
        assert!(path.exists(), "fixture missing: {}", rel);
        let snapshot = load_fixture(&path);

        let laid_out = compute_layout(&snapshot);
        assert_eq!(laid_out, compute_layout(&snapshot), "{rel}: not deterministic");
        assert_eq!(laid_out, compute_layout(&laid_out), "{rel}: not idempotent");
        assert_eq!(laid_out.links, snapshot.links, "{rel}: links changed");

        assert_rows_packed(&laid_out, rel);
        if acyclic {
            assert_layers_increase(&laid_out, rel);
        }
    }
}

#[test]
fn diamond_slots() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/diamond.json");
    let laid_out = compute_layout(&load_fixture(&path));
    let slots = slots(&laid_out);
    assert_eq!(slots[&NodeKey::objective("A")], (0, 0));
    assert_eq!(slots[&NodeKey::outcome("X")], (1, 0));
    assert_eq!(slots[&NodeKey::outcome("Y")], (1, 1));
    assert_eq!(slots[&NodeKey::objective("B")], (2, 0));
    assert_eq!(slots[&NodeKey::outcome("Z")], (3, 0));
}

#[test]
fn campaign_counts() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/campaign.json");
    let laid_out = compute_layout(&load_fixture(&path));
    let scout = laid_out
        .objectives
        .iter()
        .find(|o| o.id == "scout_ridge")
        .unwrap();
    // The link to the missing GHOST outcome still counts.
    assert_eq!(scout.outcome_count, 2);
    let ridge = laid_out
        .outcomes
        .iter()
        .find(|o| o.id == "ridge_clear")
        .unwrap();
    assert_eq!(ridge.used_by_count, 2);
    let reserve = laid_out
        .objectives
        .iter()
        .find(|o| o.id == "reserve")
        .unwrap();
    assert_eq!((reserve.layer, reserve.row, reserve.outcome_count), (0, 0, 0));
}

#[test]
fn deep_chain_lays_out_without_recursion_limits() {
    const STEPS: usize = 5_000;
    let mut snapshot = GraphSnapshot::new();
    snapshot.ensure_objective("O0");
    for i in 0..STEPS {
        let objective = NodeKey::objective(format!("O{i}"));
        let outcome = NodeKey::outcome(format!("X{i}"));
        let next = NodeKey::objective(format!("O{}", i + 1));
        snapshot.ensure_outcome(&outcome.id);
        snapshot.ensure_objective(&next.id);
        snapshot.push_link(&objective, &outcome);
        snapshot.push_link(&outcome, &next);
    }

    let laid_out = compute_layout(&snapshot);
    let slots = slots(&laid_out);
    assert_eq!(slots.len(), 2 * STEPS + 1);
    for i in 0..STEPS {
        assert_eq!(slots[&NodeKey::objective(format!("O{i}"))], (2 * i, 0));
        assert_eq!(slots[&NodeKey::outcome(format!("X{i}"))], (2 * i + 1, 0));
    }
    assert_eq!(slots[&NodeKey::objective(format!("O{STEPS}"))], (2 * STEPS, 0));
    assert_layers_increase(&laid_out, "deep chain");
}
