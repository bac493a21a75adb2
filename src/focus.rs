//! Focus mode: show only the induced subgraph around chosen nodes.

use std::collections::BTreeSet;

use crate::ir::{GraphSnapshot, NodeKey, NodeKind};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusState {
    pub active: bool,
    /// Node the view stays anchored on for as long as focus lasts.
    pub anchor: Option<NodeKey>,
    pub kept_objectives: BTreeSet<String>,
    pub kept_outcomes: BTreeSet<String>,
}

/// What a focus toggle on a node does, given the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTransition {
    Enter,
    Exit,
    Expand,
}

impl FocusState {
    pub fn transition_for(&self, center: &NodeKey) -> FocusTransition {
        if !self.active {
            FocusTransition::Enter
        } else if self.anchor.as_ref() == Some(center) {
            FocusTransition::Exit
        } else {
            FocusTransition::Expand
        }
    }

    pub fn is_kept(&self, key: &NodeKey) -> bool {
        match key.kind {
            NodeKind::Objective => self.kept_objectives.contains(&key.id),
            NodeKind::Outcome => self.kept_outcomes.contains(&key.id),
        }
    }

    fn keep(&mut self, key: NodeKey) {
        match key.kind {
            NodeKind::Objective => self.kept_objectives.insert(key.id),
            NodeKind::Outcome => self.kept_outcomes.insert(key.id),
        };
    }

    /// Adds `center` and every endpoint of a `full` link touching it.
    pub fn add_neighborhood(&mut self, full: &GraphSnapshot, center: &NodeKey) {
        self.keep(center.clone());
        for link in full.links.iter().filter(|l| l.touches(center)) {
            self.keep(link.from_key());
            self.keep(link.to_key());
        }
    }

    /// Starts a fresh focus on `center`.
    pub fn enter(&mut self, full: &GraphSnapshot, center: &NodeKey) {
        self.kept_objectives.clear();
        self.kept_outcomes.clear();
        self.add_neighborhood(full, center);
        self.active = true;
        self.anchor = Some(center.clone());
    }

    /// Grows the kept sets; the anchor does not move.
    pub fn expand(&mut self, full: &GraphSnapshot, center: &NodeKey) {
        if !self.active {
            return;
        }
        self.add_neighborhood(full, center);
    }

    pub fn exit(&mut self) {
        *self = Self::default();
    }

    /// Kept nodes (in `full` order) and the links whose endpoints are both kept.
    pub fn induced_snapshot(&self, full: &GraphSnapshot) -> GraphSnapshot {
        GraphSnapshot {
            objectives: full
                .objectives
                .iter()
                .filter(|o| self.kept_objectives.contains(&o.id))
                .cloned()
                .collect(),
            outcomes: full
                .outcomes
                .iter()
                .filter(|o| self.kept_outcomes.contains(&o.id))
                .cloned()
                .collect(),
            links: full
                .links
                .iter()
                .filter(|l| self.is_kept(&l.from_key()) && self.is_kept(&l.to_key()))
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> GraphSnapshot {
        let mut snapshot = GraphSnapshot::new();
        for id in ["A", "B", "C"] {
            snapshot.ensure_objective(id);
        }
        for id in ["X", "Y"] {
            snapshot.ensure_outcome(id);
        }
        snapshot.push_link(&NodeKey::objective("A"), &NodeKey::outcome("X"));
        snapshot.push_link(&NodeKey::objective("B"), &NodeKey::outcome("X"));
        snapshot.push_link(&NodeKey::outcome("X"), &NodeKey::objective("C"));
        snapshot.push_link(&NodeKey::objective("C"), &NodeKey::outcome("Y"));
        snapshot
    }

    #[test]
    fn enter_keeps_one_hop_both_directions() {
        let full = full();
        let mut focus = FocusState::default();
        let x = NodeKey::outcome("X");
        assert_eq!(focus.transition_for(&x), FocusTransition::Enter);
        focus.enter(&full, &x);
        assert_eq!(
            focus.kept_objectives,
            BTreeSet::from(["A".to_string(), "B".to_string(), "C".to_string()])
        );
        assert_eq!(focus.kept_outcomes, BTreeSet::from(["X".to_string()]));

        let induced = focus.induced_snapshot(&full);
        assert_eq!(induced.links.len(), 3);
        assert!(induced.outcomes.iter().all(|o| o.id != "Y"));
        assert_eq!(focus.transition_for(&x), FocusTransition::Exit);
        assert_eq!(
            focus.transition_for(&NodeKey::objective("C")),
            FocusTransition::Expand
        );
    }

    #[test]
    fn same_id_other_kind_is_not_the_anchor() {
        let mut full = full();
        full.ensure_objective("X");
        let mut focus = FocusState::default();
        focus.enter(&full, &NodeKey::outcome("X"));
        assert_eq!(
            focus.transition_for(&NodeKey::objective("X")),
            FocusTransition::Expand
        );
        assert!(!focus.is_kept(&NodeKey::objective("X")));
    }

    #[test]
    fn expand_only_grows() {
        let full = full();
        let mut focus = FocusState::default();
        focus.enter(&full, &NodeKey::objective("A"));
        let before = focus.clone();
        focus.expand(&full, &NodeKey::objective("C"));
        assert!(focus.kept_objectives.is_superset(&before.kept_objectives));
        assert!(focus.kept_outcomes.contains("Y"));
        assert_eq!(focus.anchor, Some(NodeKey::objective("A")));

        focus.exit();
        assert_eq!(focus, FocusState::default());
    }
}
