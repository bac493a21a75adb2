//! The editor controller: rebuilds, focus mode, hover/delete/link gestures and the
//! viewport, wired to the host and its observers.

use log::debug;

use crate::anchors::GhostAnchors;
use crate::config::Config;
use crate::connection::ConnectionId;
use crate::events::{GraphObserver, Observers};
use crate::focus::{FocusState, FocusTransition};
use crate::geometry::{ContentTransform, Vec2, scroll_zoom_factor};
use crate::host::{DefaultHost, GraphHost};
use crate::ir::{GraphSnapshot, NodeKey, NodeKind};
use crate::layout::compute_layout;
use crate::scene::{NodeId, Scene, SceneNode};
use crate::viewport::{AnchorLock, GridFrame, GridPhase, UvRect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Input,
    Output,
}

/// Click-like gestures on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeGesture {
    Primary { click_count: u32 },
    Secondary,
}

#[derive(Debug, Clone, Copy, Default)]
struct Hover {
    node: Option<NodeId>,
    edge: Option<ConnectionId>,
    port: Option<(NodeId, PortKind)>,
}

#[derive(Debug, Clone, Copy)]
pub struct LinkDrag {
    pub from: NodeId,
    pub port: PortKind,
    /// Content-local end of the preview edge.
    pub ghost_end: Vec2,
}

pub struct GraphView {
    config: Config,
    host: Box<dyn GraphHost>,
    observers: Observers,
    scene: Scene,
    displayed: GraphSnapshot,
    full: Option<GraphSnapshot>,
    focus: FocusState,
    transform: ContentTransform,
    viewport: Vec2,
    grid_phase: GridPhase,
    grid_uv: Option<UvRect>,
    building: bool,
    focus_build: bool,
    hover: Hover,
    drag: Option<LinkDrag>,
    ghosts: GhostAnchors,
    last_frame: Option<(ContentTransform, Vec2)>,
}

impl GraphView {
    pub fn new(config: Config, host: Box<dyn GraphHost>) -> Self {
        let viewport = Vec2::new(config.viewport.width, config.viewport.height);
        Self {
            config,
            host,
            observers: Observers::default(),
            scene: Scene::default(),
            displayed: GraphSnapshot::default(),
            full: None,
            focus: FocusState::default(),
            transform: ContentTransform::default(),
            viewport,
            grid_phase: GridPhase::default(),
            grid_uv: None,
            building: false,
            focus_build: false,
            hover: Hover::default(),
            drag: None,
            ghosts: GhostAnchors::default(),
            last_frame: None,
        }
    }

    pub fn with_default_host(config: Config) -> Self {
        let host = DefaultHost::from_config(&config.layout);
        Self::new(config, Box::new(host))
    }

    pub fn subscribe(&mut self, observer: Box<dyn GraphObserver>) {
        self.observers.subscribe(observer);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn displayed_snapshot(&self) -> &GraphSnapshot {
        &self.displayed
    }

    pub fn full_snapshot(&self) -> Option<&GraphSnapshot> {
        self.full.as_ref()
    }

    pub fn focus(&self) -> &FocusState {
        &self.focus
    }

    pub fn transform(&self) -> &ContentTransform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: ContentTransform) {
        self.transform = transform;
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport
    }

    pub fn set_viewport_size(&mut self, size: Vec2) {
        self.viewport = size;
    }

    pub fn grid_phase(&self) -> GridPhase {
        self.grid_phase
    }

    pub fn grid_uv(&self) -> Option<UvRect> {
        self.grid_uv
    }

    pub fn ghost_anchors(&self) -> &GhostAnchors {
        &self.ghosts
    }

    pub fn link_drag(&self) -> Option<&LinkDrag> {
        self.drag.as_ref()
    }

    pub fn node(&self, key: &NodeKey) -> Option<&SceneNode> {
        self.scene.nodes.by_key(key)
    }

    /// Viewport pixel of a node's centre.
    pub fn screen_position(&self, key: &NodeKey) -> Option<Vec2> {
        self.node(key)
            .map(|node| self.transform.pixel_of_local(node.center()))
    }

    fn grid_frame(&self) -> GridFrame {
        GridFrame::new(self.viewport, self.config.viewport.grid_cell_px)
    }

    fn update_grid(&mut self) {
        self.grid_uv = self.grid_frame().uv_rect(&self.transform, self.grid_phase);
    }

    /// Replaces the displayed graph.
    ///
    /// With `compute_layout` the snapshot is laid out first; with `snapshot_as_full` the
    /// result becomes the retained full snapshot. Returns false when a rebuild is
    /// already running.
    pub fn rebuild(
        &mut self,
        snapshot: GraphSnapshot,
        compute_layout_first: bool,
        snapshot_as_full: bool,
    ) -> bool {
        if self.building {
            debug!("[Graph] nested rebuild skipped");
            return false;
        }
        self.building = true;
        debug!("[Graph] Rebuild start");

        let data = if compute_layout_first {
            compute_layout(&snapshot)
        } else {
            snapshot
        };
        if snapshot_as_full {
            self.full = Some(data.clone());
        }

        self.hover = Hover::default();
        self.drag = None;
        let first = self
            .scene
            .build(&data, self.host.as_ref(), &self.config.layout, self.viewport);
        debug!(
            "[Graph] Rebuild done: objectives={}, outcomes={}, links={}",
            data.objectives.len(),
            data.outcomes.len(),
            data.links.len()
        );
        self.displayed = data;

        if !self.focus_build {
            let first_center = first.and_then(|id| self.scene.nodes.get(id)).map(SceneNode::center);
            if let Some(center) = first_center {
                self.transform.center_on(center);
            }
        }
        self.update_grid();

        self.building = false;
        true
    }

    /// Rebuilds while keeping `anchor` at the same viewport pixel and the grid visually
    /// still. No-op when the anchor is not in the scene or the viewport is empty.
    fn pinned_rebuild(
        &mut self,
        anchor: &NodeKey,
        data: GraphSnapshot,
        compute_layout_first: bool,
    ) -> bool {
        let Some(before) = self.node(anchor).map(SceneNode::center) else {
            debug!("[Graph] pinned rebuild: anchor {anchor} not in scene");
            return false;
        };
        let frame = self.grid_frame();
        let Some(lock) = AnchorLock::capture(frame, &self.transform, self.grid_phase, before) else {
            debug!("[Graph] pinned rebuild: empty viewport");
            return false;
        };

        self.ghosts.clear();
        self.focus_build = true;
        let rebuilt = self.rebuild(data, compute_layout_first, false);
        self.focus_build = false;
        if !rebuilt {
            return false;
        }

        if let Some(after) = self.node(anchor).map(SceneNode::center) {
            self.grid_phase = lock.restore(&mut self.transform, after);
            self.update_grid();
        }
        true
    }

    /// Enters, leaves or expands focus depending on the current focus state.
    pub fn toggle_focus(&mut self, center: &NodeKey) {
        if self.node(center).is_none() {
            return;
        }
        match self.focus.transition_for(center) {
            FocusTransition::Enter => self.enter_focus(center),
            FocusTransition::Exit => self.restore_full_graph(center),
            FocusTransition::Expand => self.expand_focus(center),
        }
    }

    /// Shows only `center` and its one-hop neighbourhood from the full snapshot.
    pub fn enter_focus(&mut self, center: &NodeKey) {
        let Some(full) = self.full.as_ref() else {
            return;
        };
        let mut next = self.focus.clone();
        next.enter(full, center);
        let data = next.induced_snapshot(full);
        if self.pinned_rebuild(center, data, true) {
            self.focus = next;
        }
    }

    /// Adds `center`'s neighbourhood to the focus while staying anchored on the node
    /// focus was entered on.
    pub fn expand_focus(&mut self, center: &NodeKey) {
        if !self.focus.active {
            return;
        }
        let Some(full) = self.full.as_ref() else {
            return;
        };
        let mut next = self.focus.clone();
        next.expand(full, center);
        let data = next.induced_snapshot(full);
        let anchor = next
            .anchor
            .clone()
            .filter(|key| self.node(key).is_some())
            .unwrap_or_else(|| center.clone());
        if self.pinned_rebuild(&anchor, data, true) {
            self.focus = next;
        }
    }

    /// Leaves focus: the full snapshot is shown as stored and the grid phase resets.
    pub fn restore_full_graph(&mut self, center: &NodeKey) {
        let Some(full) = self.full.clone() else {
            return;
        };
        if !self.pinned_rebuild(center, full, false) {
            return;
        }
        self.focus.exit();
        self.grid_phase.reset();
        self.update_grid();
    }

    /// User-initiated link: materializes the connection and notifies observers.
    pub fn link(&mut self, from: &NodeKey, to: &NodeKey) -> Option<ConnectionId> {
        let from_id = self.scene.nodes.lookup(from)?;
        let to_id = self.scene.nodes.lookup(to)?;
        let conn = self.scene.connections.connect(&mut self.scene.nodes, from_id, to_id)?;
        self.observers.on_link(from, to);
        Some(conn)
    }

    pub fn unlink(&mut self, from: &NodeKey, to: &NodeKey) -> bool {
        let nodes = &self.scene.nodes;
        let (Some(from_id), Some(to_id)) = (nodes.lookup(from), nodes.lookup(to)) else {
            return false;
        };
        let Some(conn) = self.scene.connections.find(from_id, to_id) else {
            return false;
        };
        self.remove_connection(conn)
    }

    /// Deletes one edge, e.g. from a click on it.
    pub fn remove_connection(&mut self, conn: ConnectionId) -> bool {
        if self.hover.edge == Some(conn) {
            self.hover.edge = None;
        }
        self.scene
            .connections
            .disconnect(&mut self.scene.nodes, conn, true, &mut self.observers)
            .is_some()
    }

    pub fn hover_node(&mut self, key: &NodeKey, on: bool) {
        let Some(id) = self.scene.nodes.lookup(key) else {
            return;
        };
        if on {
            self.scene.connections.highlight_neighborhood(id);
            self.hover.node = Some(id);
        } else if self.hover.node == Some(id) {
            self.scene.connections.clear_highlights();
            self.hover.node = None;
        }
    }

    pub fn hover_edge(&mut self, conn: ConnectionId, on: bool) {
        if self.scene.connections.get(conn).is_none() {
            return;
        }
        if on {
            self.scene.connections.highlight_connection(conn);
            self.hover.edge = Some(conn);
        } else {
            self.scene.connections.clear_highlights();
            self.hover.edge = None;
        }
    }

    pub fn hover_port(&mut self, key: &NodeKey, kind: PortKind, on: bool) {
        let Some(id) = self.scene.nodes.lookup(key) else {
            return;
        };
        if on {
            self.hover.port = Some((id, kind));
            self.scene.connections.highlight_neighborhood(id);
            self.hover.node = Some(id);
        } else if self.hover.port.is_some_and(|(node, _)| node == id) {
            self.hover.port = None;
        }
    }

    /// Delete key: removes the hovered edge, else the hovered port's edges, else every
    /// edge of the hovered node. Returns the number of edges removed.
    pub fn delete_pressed(&mut self, pointer_in_viewport: bool) -> usize {
        if !pointer_in_viewport {
            return 0;
        }
        if let Some(edge) = self.hover.edge {
            return usize::from(self.remove_connection(edge));
        }

        let Scene {
            nodes, connections, ..
        } = &mut self.scene;
        let observers = &mut self.observers;
        let removed = if let Some((node, kind)) = self.hover.port {
            match kind {
                PortKind::Input => {
                    connections.disconnect_all_to(nodes, node, true, &mut *observers)
                }
                PortKind::Output => {
                    connections.disconnect_all_from(nodes, node, true, &mut *observers)
                }
            }
        } else if let Some(node) = self.hover.node {
            connections.disconnect_all_to(nodes, node, true, &mut *observers)
                + connections.disconnect_all_from(nodes, node, true, &mut *observers)
        } else {
            return 0;
        };
        connections.clear_highlights();
        removed
    }

    fn port_visible(&self, node: NodeId, kind: PortKind) -> bool {
        match kind {
            PortKind::Input => self.scene.nodes.get(node).is_some(),
            PortKind::Output => self
                .scene
                .nodes
                .get(node)
                .is_some_and(|n| n.output_port_visible),
        }
    }

    pub fn begin_link_drag(&mut self, key: &NodeKey, port: PortKind) {
        let Some(from) = self.scene.nodes.lookup(key) else {
            return;
        };
        if !self.port_visible(from, port) {
            return;
        }
        let ghost_end = self.node(key).map(SceneNode::center).unwrap_or_default();
        self.drag = Some(LinkDrag {
            from,
            port,
            ghost_end,
        });
        self.scene.connections.highlight_neighborhood(from);
    }

    /// Target a drop from the active drag would link to, if valid.
    fn drop_target(&self, drag: &LinkDrag, target: Option<(&NodeKey, PortKind)>) -> Option<NodeId> {
        let (key, port) = target?;
        let to = self.scene.nodes.lookup(key)?;
        if to == drag.from || port == drag.port || !self.port_visible(to, port) {
            return None;
        }
        let from_kind = self.scene.nodes.get(drag.from)?.kind();
        let to_kind = self.scene.nodes.get(to)?.kind();
        (from_kind != to_kind).then_some(to)
    }

    /// Moves the preview edge and highlights a valid target under the pointer.
    pub fn drag_link_to(&mut self, pixel: Vec2, target: Option<(&NodeKey, PortKind)>) {
        let Some(mut drag) = self.drag else {
            return;
        };
        drag.ghost_end = self.transform.local_of_pixel(pixel);
        self.drag = Some(drag);
        self.scene.connections.highlight_neighborhood(drag.from);
        if let Some(to) = self.drop_target(&drag, target) {
            self.scene.connections.highlight_node(to);
        }
    }

    /// Finishes a link drag. Output-to-input drops link `from -> target`,
    /// input-to-output drops link `target -> from`.
    pub fn end_link_drag(&mut self, target: Option<(&NodeKey, PortKind)>) -> Option<ConnectionId> {
        let drag = self.drag.take()?;
        self.scene.connections.clear_highlights();
        let to = self.drop_target(&drag, target)?;
        let from_key = self.scene.nodes.get(drag.from)?.key().clone();
        let to_key = self.scene.nodes.get(to)?.key().clone();
        match drag.port {
            PortKind::Output => self.link(&from_key, &to_key),
            PortKind::Input => self.link(&to_key, &from_key),
        }
    }

    pub fn node_gesture(&mut self, key: &NodeKey, gesture: NodeGesture) {
        if self.node(key).is_none() {
            return;
        }
        match gesture {
            NodeGesture::Secondary => self.toggle_focus(key),
            NodeGesture::Primary { click_count } if click_count > 1 => match key.kind {
                NodeKind::Objective => self.observers.on_edit_objective(&key.id),
                NodeKind::Outcome => self.observers.on_edit_outcome(&key.id),
            },
            NodeGesture::Primary { .. } => {
                self.ghosts.toggle(key, self.host.as_ref());
                self.refresh_ghosts();
            }
        }
    }

    pub fn scroll(&mut self, pixel: Vec2, delta: Vec2) {
        let vp = &self.config.viewport;
        if let Some(factor) = scroll_zoom_factor(delta, vp.zoom_speed) {
            self.transform
                .zoom_at(pixel, factor, vp.min_scale, vp.max_scale);
        }
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.transform
            .pan(delta, self.config.viewport.canvas_scale_factor);
    }

    fn refresh_ghosts(&mut self) {
        let center = self
            .ghosts
            .pinned()
            .and_then(|key| self.scene.nodes.by_key(key))
            .map(SceneNode::center);
        if let Some(center) = center {
            self.ghosts.refresh(&self.transform, self.viewport, center);
        }
    }

    /// Per-frame update: recompute the grid when the view changed, then follow the
    /// ghost anchors.
    pub fn frame(&mut self) {
        let current = (self.transform, self.viewport);
        if self.last_frame != Some(current) {
            self.last_frame = Some(current);
            self.update_grid();
        }
        self.refresh_ghosts();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventLog, GraphEvent};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sample() -> GraphSnapshot {
        let mut snapshot = GraphSnapshot::new();
        snapshot.ensure_objective("A");
        snapshot.ensure_objective("B");
        snapshot.ensure_outcome("X");
        snapshot.push_link(&NodeKey::objective("A"), &NodeKey::outcome("X"));
        snapshot.push_link(&NodeKey::objective("B"), &NodeKey::outcome("X"));
        snapshot
    }

    fn view_with_log() -> (GraphView, Rc<RefCell<EventLog>>) {
        let mut view = GraphView::with_default_host(Config::default());
        let log = Rc::new(RefCell::new(EventLog::default()));
        view.subscribe(Box::new(log.clone()));
        view.rebuild(sample(), true, true);
        (view, log)
    }

    #[test]
    fn rebuild_centers_first_node() {
        let (view, _) = view_with_log();
        let a = view.screen_position(&NodeKey::objective("A")).unwrap();
        assert!(a.distance(Vec2::ZERO) < 1e-3);
        assert!(view.grid_uv().is_some());
    }

    #[test]
    fn same_kind_link_is_rejected_silently() {
        let (mut view, log) = view_with_log();
        assert!(view.link(&NodeKey::objective("A"), &NodeKey::objective("B")).is_none());
        assert!(log.borrow().events.is_empty());
        assert!(view.link(&NodeKey::objective("A"), &NodeKey::outcome("X")).is_none());
        assert!(view.link(&NodeKey::outcome("X"), &NodeKey::objective("A")).is_some());
        assert_eq!(
            log.borrow().events,
            vec![GraphEvent::link(&NodeKey::outcome("X"), &NodeKey::objective("A"))]
        );
    }

    #[test]
    fn delete_prefers_edge_then_port_then_node() {
        let (mut view, log) = view_with_log();
        let x = NodeKey::outcome("X");
        let a = NodeKey::objective("A");
        let a_id = view.scene().nodes.lookup(&a).unwrap();
        let x_id = view.scene().nodes.lookup(&x).unwrap();
        let ax = view.scene().connections.find(a_id, x_id).unwrap();

        view.hover_node(&x, true);
        view.hover_edge(ax, true);
        assert_eq!(view.delete_pressed(false), 0);
        assert_eq!(view.delete_pressed(true), 1);
        assert_eq!(view.scene().connections.len(), 1);

        view.hover_node(&x, true);
        assert_eq!(view.delete_pressed(true), 1);
        assert!(view.scene().connections.is_empty());
        assert_eq!(log.borrow().events.len(), 2);
    }

    #[test]
    fn output_port_delete_only_touches_outgoing() {
        let (mut view, _) = view_with_log();
        let x = NodeKey::outcome("X");
        let c = NodeKey::objective("A");
        view.link(&x, &c);
        view.hover_port(&x, PortKind::Output, true);
        assert_eq!(view.delete_pressed(true), 1);
        assert_eq!(view.scene().connections.len(), 2);
    }

    #[test]
    fn drag_from_input_links_backwards() {
        let mut view = GraphView::with_default_host(Config::default());
        let log = Rc::new(RefCell::new(EventLog::default()));
        view.subscribe(Box::new(log.clone()));
        let mut snapshot = sample();
        snapshot.ensure_objective("C");
        view.rebuild(snapshot, true, true);

        let a = NodeKey::objective("A");
        let c = NodeKey::objective("C");
        let x = NodeKey::outcome("X");

        // Objective input port dropped on an objective output port: same kind, ignored.
        view.begin_link_drag(&c, PortKind::Input);
        assert!(view.end_link_drag(Some((&a, PortKind::Output))).is_none());

        // The default host gives outcomes no output port.
        view.begin_link_drag(&c, PortKind::Input);
        assert!(view.end_link_drag(Some((&x, PortKind::Output))).is_none());

        view.begin_link_drag(&c, PortKind::Output);
        view.drag_link_to(Vec2::new(10.0, 10.0), Some((&x, PortKind::Input)));
        let c_id = view.scene().nodes.lookup(&c).unwrap();
        let x_id = view.scene().nodes.lookup(&x).unwrap();
        assert!(view.scene().connections.is_node_highlighted(c_id));
        assert!(view.scene().connections.is_node_highlighted(x_id));
        assert!(view.end_link_drag(Some((&x, PortKind::Input))).is_some());
        assert!(view.scene().connections.highlighted().is_empty());
        assert_eq!(log.borrow().events, vec![GraphEvent::link(&c, &x)]);
    }

    #[test]
    fn double_click_routes_edit_events() {
        let (mut view, log) = view_with_log();
        view.node_gesture(&NodeKey::objective("A"), NodeGesture::Primary { click_count: 2 });
        view.node_gesture(&NodeKey::outcome("X"), NodeGesture::Primary { click_count: 2 });
        view.node_gesture(&NodeKey::outcome("MISSING"), NodeGesture::Primary { click_count: 2 });
        assert_eq!(
            log.borrow().events,
            vec![
                GraphEvent::EditObjective { id: "A".to_string() },
                GraphEvent::EditOutcome { id: "X".to_string() }
            ]
        );
    }

    #[test]
    fn leaving_a_stale_node_keeps_current_highlight() {
        let (mut view, _) = view_with_log();
        let a = NodeKey::objective("A");
        let b = NodeKey::objective("B");
        view.hover_node(&a, true);
        view.hover_node(&b, true);
        view.hover_node(&a, false);
        let b_id = view.scene().nodes.lookup(&b).unwrap();
        let x_id = view.scene().nodes.lookup(&NodeKey::outcome("X")).unwrap();
        assert!(view.scene().connections.is_node_highlighted(b_id));
        assert!(view.scene().connections.is_node_highlighted(x_id));

        assert_eq!(view.delete_pressed(true), 1);
        assert!(view.scene().connections.find(b_id, x_id).is_none());
        assert_eq!(view.scene().connections.len(), 1);
    }

    #[test]
    fn stored_slots_out_of_range_still_build() {
        let mut snapshot = sample();
        snapshot.ensure_objective("A").row = usize::MAX;
        snapshot.ensure_outcome("X").layer = 1 << 40;
        let mut view = GraphView::with_default_host(Config::default());
        assert!(view.rebuild(snapshot, false, true));
        assert_eq!(view.scene().nodes.len(), 3);
        assert_eq!(view.scene().connections.len(), 2);
        let a = view.node(&NodeKey::objective("A")).unwrap();
        let b = view.node(&NodeKey::objective("B")).unwrap();
        assert!(a.rect.min.y > b.rect.min.y);
        assert!(a.rect.min.y.is_finite());
    }

    #[test]
    fn frame_tracks_view_changes() {
        let (mut view, _) = view_with_log();
        view.frame();
        let before = view.grid_uv().unwrap();
        view.pan(Vec2::new(128.0, 0.0));
        view.frame();
        let after = view.grid_uv().unwrap();
        assert!((after.x - before.x + 0.5).abs() < 1e-4, "{before:?} -> {after:?}");
    }
}
