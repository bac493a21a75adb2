//! Applies the editor's link/unlink output to the authoritative snapshot.

use log::{error, info, warn};

use crate::error::{GraphError, Result};
use crate::events::GraphObserver;
use crate::ir::{GraphSnapshot, LinkRecord, NodeKey};

/// Source of truth the editor's display is checked against.
#[derive(Debug, Clone, Default)]
pub struct ModelSync {
    snapshot: GraphSnapshot,
    changes: usize,
}

impl ModelSync {
    pub fn new(snapshot: GraphSnapshot) -> Self {
        Self {
            snapshot,
            changes: 0,
        }
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    /// Number of applied (non no-op) changes.
    pub fn changes(&self) -> usize {
        self.changes
    }

    fn resolve(&self, op: &'static str, from: &NodeKey, to: &NodeKey) -> Result<()> {
        if self.snapshot.contains(from) && self.snapshot.contains(to) {
            Ok(())
        } else {
            Err(GraphError::Desync {
                op,
                from: from.clone(),
                to: to.clone(),
            })
        }
    }

    /// Returns `Ok(false)` when the link already exists.
    pub fn apply_link(&mut self, from: &NodeKey, to: &NodeKey) -> Result<bool> {
        self.resolve("LINK", from, to)?;
        if self.snapshot.has_link(from, to) {
            return Ok(false);
        }
        self.snapshot.links.push(LinkRecord::new(from, to));
        self.changes += 1;
        Ok(true)
    }

    /// Returns `Ok(false)` when there was nothing to remove.
    pub fn apply_unlink(&mut self, from: &NodeKey, to: &NodeKey) -> Result<bool> {
        self.resolve("UNLINK", from, to)?;
        let before = self.snapshot.links.len();
        self.snapshot
            .links
            .retain(|l| !(l.starts_at(from) && l.ends_at(to)));
        let changed = self.snapshot.links.len() != before;
        if changed {
            self.changes += 1;
        }
        Ok(changed)
    }
}

impl GraphObserver for ModelSync {
    fn on_link(&mut self, from: &NodeKey, to: &NodeKey) {
        info!(
            "[MissionGraph] LINK request: {}({}) > {}({})",
            from.id,
            from.kind.tag(),
            to.id,
            to.kind.tag()
        );
        match self.apply_link(from, to) {
            Ok(true) => info!("[MissionGraph] Linked {from} > {to}"),
            Ok(false) => warn!("[MissionGraph] Link no-op: {from} > {to} already present"),
            Err(err) => error!("[MissionGraph] {err}"),
        }
    }

    fn on_unlink(&mut self, from: &NodeKey, to: &NodeKey) {
        info!(
            "[MissionGraph] UNLINK request: {}({}) > {}({})",
            from.id,
            from.kind.tag(),
            to.id,
            to.kind.tag()
        );
        match self.apply_unlink(from, to) {
            Ok(true) => info!("[MissionGraph] Unlinked {from} > {to}"),
            Ok(false) => warn!("[MissionGraph] Unlink no-op: relationship not found {from} > {to}"),
            Err(err) => error!("[MissionGraph] {err}"),
        }
    }
}
