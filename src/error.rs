use crate::ir::NodeKey;

/// Errors surfaced by the graph engine.
///
/// Structural rejections (self-loops, same-kind links, duplicate edges) and missing
/// references are not errors; those operations simply do nothing.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("snapshot json: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("invalid node key '{0}' (expected objective:<id> or outcome:<id>)")]
    InvalidNodeKey(String),

    #[error("{op} resolve failed, UI/model out of sync: {from} > {to}")]
    Desync {
        op: &'static str,
        from: NodeKey,
        to: NodeKey,
    },
}

pub type Result<T> = std::result::Result<T, GraphError>;
