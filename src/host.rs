use crate::config::LayoutConfig;
use crate::geometry::Vec2;
use crate::ir::{NodeKey, NodeRecord};

/// Position source for a ghost anchor, in viewport pixels. It may fail at any time;
/// a failure only hides that anchor.
pub type ExternalAnchor = Box<dyn Fn() -> anyhow::Result<Vec2>>;

/// Queries the editor makes to its owning application.
pub trait GraphHost {
    /// Whether the outcome exposes an outgoing port. Must be side-effect free.
    fn can_have_outputs(&self, _outcome_id: &str) -> bool {
        false
    }

    /// Unpadded size of the node's visual.
    fn node_size(&self, node: &NodeRecord) -> Vec2;

    fn query_external_anchors(&self, _node: &NodeKey) -> Vec<ExternalAnchor> {
        Vec::new()
    }
}

/// Host used when nothing is attached: every node has the configured size.
#[derive(Debug, Clone)]
pub struct DefaultHost {
    pub node_size: Vec2,
}

impl DefaultHost {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            node_size: Vec2::new(config.node_width, config.node_height),
        }
    }
}

impl GraphHost for DefaultHost {
    fn node_size(&self, _node: &NodeRecord) -> Vec2 {
        self.node_size
    }
}
