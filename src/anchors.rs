//! Ghost anchors: edges from one node to positions supplied by the host (for example,
//! where the node's units are in the world), pinned to the visible viewport.

use log::debug;

use crate::geometry::{ContentTransform, Vec2, clamp_to_rect_along_segment};
use crate::host::{ExternalAnchor, GraphHost};
use crate::ir::NodeKey;

pub struct GhostAnchor {
    source: ExternalAnchor,
    /// Content-local end point of the ghost edge.
    pub position: Vec2,
    pub visible: bool,
}

#[derive(Default)]
pub struct GhostAnchors {
    pinned: Option<NodeKey>,
    anchors: Vec<GhostAnchor>,
}

impl GhostAnchors {
    pub fn pinned(&self) -> Option<&NodeKey> {
        self.pinned.as_ref()
    }

    pub fn anchors(&self) -> &[GhostAnchor] {
        &self.anchors
    }

    /// Pins `center` and asks the host for its anchors, or unpins when `center` is
    /// already pinned.
    pub fn toggle(&mut self, center: &NodeKey, host: &dyn GraphHost) {
        if self.pinned.as_ref() == Some(center) {
            self.clear();
            return;
        }
        self.anchors = host
            .query_external_anchors(center)
            .into_iter()
            .map(|source| GhostAnchor {
                source,
                position: Vec2::ZERO,
                visible: true,
            })
            .collect();
        debug!("[Graph] pinned {} ghost anchor(s) on {center}", self.anchors.len());
        self.pinned = Some(center.clone());
    }

    pub fn clear(&mut self) {
        self.pinned = None;
        self.anchors.clear();
    }

    /// Re-evaluates every anchor against the current view. A failing source hides its
    /// own anchor and leaves the rest alone.
    pub fn refresh(&mut self, transform: &ContentTransform, viewport: Vec2, center_local: Vec2) {
        if self.anchors.is_empty() {
            return;
        }
        let visible_rect = transform.viewport_rect_in_content(viewport);
        for anchor in &mut self.anchors {
            match (anchor.source)() {
                Ok(pixel) => {
                    let local = transform.local_of_pixel(pixel);
                    anchor.position =
                        clamp_to_rect_along_segment(center_local, local, visible_rect);
                    anchor.visible = true;
                }
                Err(err) => {
                    debug!("[Graph] ghost anchor source failed: {err:#}");
                    anchor.visible = false;
                }
            }
        }
    }
}
